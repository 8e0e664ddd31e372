//! Parse states.
//!
//! A state is the structural encoding of "the sequence of symbols matched
//! so far to reach this point": a persistent chain of symbol ids sharing
//! tails via `Arc`. Two states are equal iff their chains are symbol-wise
//! equal; the hash is computed once at construction so table lookups
//! never walk the chain.

use crate::grammar::{SymbolId, END_ID, START_ID};
use ahash::RandomState;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

static STATE_HASHER: RandomState = RandomState::with_seeds(
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

#[derive(Debug)]
struct StateNode {
    left: Option<State>,
    symbol: SymbolId,
    hash: u64,
}

/// One link of a matched-symbol chain. Cloning is cheap; chains share
/// their tails.
#[derive(Debug, Clone)]
pub struct State {
    node: Arc<StateNode>,
}

impl State {
    /// Chain a symbol onto an existing state (or start a new chain).
    #[must_use]
    pub fn new(left: Option<State>, symbol: SymbolId) -> Self {
        let hash = STATE_HASHER.hash_one((
            left.as_ref().map(|state| state.node.hash),
            symbol.as_str(),
        ));
        Self {
            node: Arc::new(StateNode { left, symbol, hash }),
        }
    }

    /// The sentinel state before anything has been matched.
    #[must_use]
    pub fn start_of_file() -> Self {
        static START: OnceLock<State> = OnceLock::new();
        START
            .get_or_init(|| Self::new(None, SymbolId::from(START_ID)))
            .clone()
    }

    /// The sentinel state of a completed parse.
    #[must_use]
    pub fn accept() -> Self {
        static ACCEPT: OnceLock<State> = OnceLock::new();
        ACCEPT
            .get_or_init(|| Self::new(None, SymbolId::from(END_ID)))
            .clone()
    }

    #[must_use]
    pub fn left(&self) -> Option<&State> {
        self.node.left.as_ref()
    }

    /// The most recently matched symbol of this chain.
    #[must_use]
    pub fn symbol(&self) -> &SymbolId {
        &self.node.symbol
    }

    /// Number of links in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut cur = self.node.left.as_ref();
        while let Some(state) = cur {
            depth += 1;
            cur = state.node.left.as_ref();
        }
        depth
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        if self.node.hash != other.node.hash {
            return false;
        }
        self.node.symbol == other.node.symbol && self.node.left == other.node.left
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.node.hash);
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    /// Chain-wise ordering: shorter prefixes (no left) sort after longer
    /// ones, then by the left chain, then by symbol id. Used only to keep
    /// table iteration deterministic.
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.node, &other.node) {
            return Ordering::Equal;
        }
        match (&self.node.left, &other.node.left) {
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(a), Some(b)) => {
                let cmp = a.cmp(b);
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            (None, None) => {}
        }
        self.node.symbol.cmp(&other.node.symbol)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn append(state: &State, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if let Some(left) = state.left() {
                append(left, f)?;
                f.write_str(" ")?;
            }
            f.write_str(state.symbol().as_str())
        }
        f.write_str("(State: ")?;
        append(self, f)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> State {
        let mut state: Option<State> = None;
        for id in ids {
            state = Some(State::new(state, SymbolId::from(*id)));
        }
        state.unwrap()
    }

    #[test]
    fn test_equality_is_structural() {
        let a = chain(&["NUM", "+", "NUM"]);
        let b = chain(&["NUM", "+", "NUM"]);
        assert_eq!(a, b);
        assert_ne!(a, chain(&["NUM", "+"]));
        assert_ne!(a, chain(&["NUM", "*", "NUM"]));
    }

    #[test]
    fn test_hash_matches_equality() {
        let hasher = RandomState::new();
        let a = chain(&["Expr", "+", "Expr"]);
        let b = chain(&["Expr", "+", "Expr"]);
        assert_eq!(hasher.hash_one(&a), hasher.hash_one(&b));
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(State::start_of_file(), State::accept());
        assert_eq!(State::accept(), State::accept());
    }

    #[test]
    fn test_chain_accessors() {
        let state = chain(&["a", "b"]);
        assert_eq!(state.symbol().as_str(), "b");
        assert_eq!(state.left().unwrap().symbol().as_str(), "a");
        assert_eq!(state.depth(), 2);
    }

    #[test]
    fn test_display_lists_chain() {
        assert_eq!(format!("{}", chain(&["NUM", "+"])), "(State: NUM +)");
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let a = chain(&["a"]);
        let b = chain(&["b"]);
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
        assert_eq!(a.cmp(&chain(&["a"])), Ordering::Equal);
    }
}
