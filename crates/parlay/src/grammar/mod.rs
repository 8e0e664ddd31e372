//! Grammar definition: priorities, symbols, rules, and the immutable
//! grammar bundle handed to the automaton builder.
//!
//! A [`Grammar`] is the full set of symbols reachable from a root symbol,
//! plus the terminals to skip between significant tokens (whitespace,
//! comments). Once constructed it is immutable; cyclic rule structures
//! are expressed with named forward references ([`SymbolRef`]) that the
//! automaton resolves against its symbol registry.

pub mod dsl;
mod priority;
mod rule;
mod sequence;
mod symbol;

pub use priority::{Priority, Requirement, RequirementOp};
pub use rule::Rule;
pub use sequence::{Sequence, SequenceMode};
pub use symbol::{
    Delimited, MarkerKind, Matcher, NonTerminal, ScopedSymbol, Symbol, SymbolId, SymbolRef,
    Terminal, END_ID, NIL_ID, START_ID,
};

use crate::automaton::Automaton;
use crate::error::Error;
use crate::parser::ParseTree;
use crate::reader::ParserReader;
use std::collections::BTreeMap;

/// An immutable grammar: the symbol set, the root symbol, and the
/// terminals to skip between significant tokens.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    root: Symbol,
    ignore: Vec<Terminal>,
}

impl Grammar {
    /// Build a grammar from a root symbol, collecting every symbol
    /// reachable through its rules plus the ignorable terminals. The
    /// symbol set is ordered by id for reproducible builds.
    pub fn new(root: Symbol, ignore: impl IntoIterator<Item = Terminal>) -> Self {
        let mut ignore: Vec<Terminal> = ignore.into_iter().collect();
        ignore.sort_by(|a, b| a.id().cmp(b.id()));
        ignore.dedup_by(|a, b| a.id() == b.id());

        let mut set = BTreeMap::new();
        for terminal in &ignore {
            Symbol::Terminal(terminal.clone()).collect_symbols(&mut set);
        }
        root.collect_symbols(&mut set);
        Self {
            symbols: set.into_values().collect(),
            root,
            ignore,
        }
    }

    /// Build a grammar from an explicit symbol list. The list is taken as
    /// given; duplicate ids are reported when the automaton is built.
    pub fn with_symbols(
        symbols: impl IntoIterator<Item = Symbol>,
        root: Symbol,
        ignore: impl IntoIterator<Item = Terminal>,
    ) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
            root,
            ignore: ignore.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub const fn root(&self) -> &Symbol {
        &self.root
    }

    #[must_use]
    pub fn ignore(&self) -> &[Terminal] {
        &self.ignore
    }

    /// Build the automaton and parse a string in one step.
    pub fn parse_str(&self, input: &str) -> Result<ParseTree, Error> {
        let automaton = Automaton::build(self)?;
        let mut reader = ParserReader::new(input);
        Ok(automaton.parse(&mut reader)?)
    }
}

impl Symbol {
    /// Parse a string using this symbol as the grammar root, with nothing
    /// ignorable. Useful for simple usages and tests.
    pub fn parse_str(&self, input: &str) -> Result<ParseTree, Error> {
        Grammar::new(self.clone(), []).parse_str(input)
    }

    /// Parse a string using this symbol as the grammar root, skipping the
    /// given terminals between tokens.
    pub fn parse_str_ignoring(
        &self,
        input: &str,
        ignore: impl IntoIterator<Item = Terminal>,
    ) -> Result<ParseTree, Error> {
        Grammar::new(self.clone(), ignore).parse_str(input)
    }
}
