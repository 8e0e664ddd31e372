//! Production rules.

use crate::grammar::{Priority, Symbol, Terminal};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An ordered sequence of symbol parts making up one alternative of a
/// non-terminal, together with the priority the reduction produces.
///
/// Identity is the parts alone: the priority affects where a rule may
/// apply, not which rule it is.
#[derive(Debug, Clone)]
pub struct Rule {
    parts: Arc<[Symbol]>,
    priority: Priority,
}

impl Rule {
    pub fn new(priority: Priority, parts: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
            priority,
        }
    }

    /// A rule with the default priority.
    pub fn of(parts: impl IntoIterator<Item = Symbol>) -> Self {
        Self::new(Priority::default_priority(), parts)
    }

    /// The empty production: a single zero-width nil marker. Rules must
    /// never have zero parts outright; this is the explicit way to say
    /// "match nothing".
    #[must_use]
    pub fn epsilon() -> Self {
        Self::of([Symbol::Terminal(Terminal::nil())])
    }

    #[must_use]
    pub fn parts(&self) -> &[Symbol] {
        &self.parts
    }

    #[must_use]
    pub(crate) fn parts_arc(&self) -> Arc<[Symbol]> {
        Arc::clone(&self.parts)
    }

    #[must_use]
    pub const fn priority(&self) -> &Priority {
        &self.priority
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", part.id())?;
        }
        Ok(())
    }
}
