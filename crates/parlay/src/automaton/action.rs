//! Table actions.
//!
//! Each parse state maps to an ordered set of actions. Ordering is by
//! priority first (higher precedence first), then action kind, then
//! payload, so iterating an action set is reproducible and the runtime
//! attempts higher-priority interpretations before lower ones.

use crate::automaton::State;
use crate::grammar::{Priority, Symbol, Terminal};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A table-driven instruction for advancing a parse stack.
#[derive(Debug, Clone)]
pub enum Action {
    Shift(Shift),
    Reduce(Reduce),
    Accept(Accept),
}

/// Consume one terminal from the input and move to `target`.
#[derive(Debug, Clone)]
pub struct Shift {
    pub target: State,
    pub terminal: Terminal,
    pub priority: Priority,
}

/// Replace the matched parts on top of the stack with the owning symbol's
/// tree node.
#[derive(Debug, Clone)]
pub struct Reduce {
    pub symbol: Symbol,
    pub parts: Arc<[Symbol]>,
    pub priority: Priority,
}

/// Finish the parse if the stack is at root depth and the input is fully
/// consumed.
#[derive(Debug, Clone)]
pub struct Accept {
    pub priority: Priority,
}

impl Accept {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority: Priority::default_priority(),
        }
    }
}

impl Default for Accept {
    fn default() -> Self {
        Self::new()
    }
}

impl Action {
    #[must_use]
    pub const fn priority(&self) -> &Priority {
        match self {
            Self::Shift(shift) => &shift.priority,
            Self::Reduce(reduce) => &reduce.priority,
            Self::Accept(accept) => &accept.priority,
        }
    }

    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Accept(_) => 0,
            Self::Reduce(_) => 1,
            Self::Shift(_) => 2,
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Action {}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Self) -> Ordering {
        let cmp = self
            .priority()
            .cmp(other.priority())
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()));
        if cmp != Ordering::Equal {
            return cmp;
        }
        match (self, other) {
            (Self::Shift(a), Self::Shift(b)) => a.target.cmp(&b.target),
            (Self::Reduce(a), Self::Reduce(b)) => a
                .symbol
                .cmp(&b.symbol)
                .then_with(|| a.parts.len().cmp(&b.parts.len()))
                .then_with(|| {
                    a.parts
                        .iter()
                        .zip(b.parts.iter())
                        .map(|(x, y)| x.cmp(y))
                        .find(|c| *c != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                }),
            (Self::Accept(_), Self::Accept(_)) => Ordering::Equal,
            // kind_rank already distinguished mixed kinds.
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(shift) => write!(f, "{{{} --> {}}}", shift.terminal.id(), shift.target),
            Self::Reduce(reduce) => {
                f.write_str("{")?;
                for (i, part) in reduce.parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(part.id().as_str())?;
                }
                write!(f, " => {}}}", reduce.symbol.id())
            }
            Self::Accept(_) => f.write_str("<end> -> {accept}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolId;

    fn shift(id: &str, priority: &Priority) -> Action {
        Action::Shift(Shift {
            target: State::new(None, SymbolId::from(id)),
            terminal: Terminal::keyword(id, id),
            priority: priority.clone(),
        })
    }

    #[test]
    fn test_higher_priority_sorts_first() {
        let low = Priority::new("low", []);
        let high = Priority::new("high", [low.clone()]);
        let a = shift("x", &high);
        let b = shift("x", &low);
        assert!(a < b);
    }

    #[test]
    fn test_kind_order_breaks_priority_ties() {
        let p = Priority::default_priority();
        let accept = Action::Accept(Accept::new());
        let reduce = Action::Reduce(Reduce {
            symbol: crate::grammar::dsl::sym("X"),
            parts: [crate::grammar::dsl::sym("a")].into(),
            priority: p.clone(),
        });
        let shift = shift("a", &p);
        assert!(accept < reduce);
        assert!(reduce < shift);
    }

    #[test]
    fn test_equal_shifts_dedupe_in_a_set() {
        let p = Priority::default_priority();
        let mut set = std::collections::BTreeSet::new();
        set.insert(shift("x", &p));
        set.insert(shift("x", &p));
        set.insert(shift("y", &p));
        assert_eq!(set.len(), 2);
    }
}
