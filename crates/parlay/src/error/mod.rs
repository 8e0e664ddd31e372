//! Error types for grammar construction, reading, and parsing.
//!
//! Three layers of failure exist, and they are deliberately kept apart:
//!
//! - [`GrammarError`]: the grammar definition itself is broken. These are
//!   programming errors, detected while building the automaton, and never
//!   recoverable at parse time.
//! - [`ReaderError`]: the input cursor was driven outside its contract
//!   (seeking before the mark, reading past end of input). Under correct
//!   operation these indicate a bug in a terminal matcher, not bad input.
//! - [`ParseError`]: the outcome of a parse that did not produce exactly
//!   one tree — a syntax error or a documented ambiguity.
//!
//! An individual dead parse stack is *not* an error: stacks dying is how
//! GLR exploration normally discards non-viable derivations. Only the
//! aggregate outcome (zero, one, or many completed trees) is reported.

use crate::grammar::SymbolId;
use crate::parser::ParseTree;
use crate::source::{FilePos, FileRange};
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A defect in the grammar definition, detected while building the
/// automaton. Construction aborts on the first one found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("symbol not registered: {id}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::unresolved_ref)))]
    UnresolvedRef { id: SymbolId },

    #[error("symbol registered twice with different definitions: {id}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::duplicate_symbol)))]
    DuplicateSymbol { id: SymbolId },

    #[error("rule of {symbol} has no parts; use an explicit nil marker for an empty production")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::empty_rule)))]
    EmptyRule { symbol: SymbolId },

    #[error("priority requirement applied to {id}, which already carries one")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::conflicting_requirement)))]
    ConflictingRequirement { id: SymbolId },
}

/// The input cursor was driven outside its contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ReaderError {
    #[error("cannot seek to offset {target}: before the mark at offset {mark}")]
    SeekBeforeMark { target: usize, mark: usize },

    #[error("cannot seek to offset {target}: past end of input ({len} bytes)")]
    SeekPastEnd { target: usize, len: usize },

    #[error("offset {offset} is not a character boundary")]
    InvalidPosition { offset: usize },

    #[error("read past end of input at {pos}")]
    Overrun { pos: FilePos },
}

/// The outcome of a parse that did not produce exactly one tree, or an
/// internal invariant violation encountered along the way.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// No parse stack reached the accept state.
    #[error("syntax error at {range}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::syntax)))]
    Syntax {
        #[cfg_attr(feature = "diagnostics", label("parsing failed here"))]
        range: FileRange,
    },

    /// More than one parse stack reached the accept state. The input is
    /// valid under the grammar in several distinct ways; no alternative is
    /// preferred by the engine.
    #[error("input can be parsed in {} different ways", alternatives.len())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::ambiguous)))]
    Ambiguous {
        alternatives: Vec<ParseTree>,
        #[cfg_attr(feature = "diagnostics", label("ambiguity detected here"))]
        range: FileRange,
    },

    /// A matcher drove the reader past the declared end of input. The
    /// accept action's end-of-input check makes this unreachable under
    /// correct operation, so it signals a bug rather than bad input.
    #[error("reader contract violated during parse")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::reader)))]
    Reader(#[from] ReaderError),

    /// An explicitly configured resource cap was hit.
    #[error("{what} limit exceeded at {pos}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parlay::limit)))]
    LimitExceeded { what: &'static str, pos: FilePos },
}

impl ParseError {
    /// The position the error is anchored at, when it has one.
    #[must_use]
    pub fn position(&self) -> Option<FilePos> {
        match self {
            Self::Syntax { range } | Self::Ambiguous { range, .. } => Some(range.start),
            Self::Reader(ReaderError::Overrun { pos }) => Some(*pos),
            Self::Reader(_) => None,
            Self::LimitExceeded { pos, .. } => Some(*pos),
        }
    }
}

/// Convenience error for entry points that build the automaton and run
/// the parse in one call.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FilePos, FileRange};

    #[test]
    fn test_syntax_error_position() {
        let err = ParseError::Syntax {
            range: FileRange::at(FilePos::new(7, 2, 3)),
        };
        assert_eq!(err.position().map(|p| p.offset), Some(7));
        assert!(format!("{err}").contains("syntax error"));
    }

    #[test]
    fn test_reader_error_messages() {
        let err = ReaderError::SeekBeforeMark { target: 1, mark: 4 };
        assert!(format!("{err}").contains("before the mark"));
        let err = ReaderError::SeekPastEnd { target: 9, len: 5 };
        assert!(format!("{err}").contains("past end"));
    }

    #[test]
    fn test_overrun_is_carried_through_parse_error() {
        let err: ParseError = ReaderError::Overrun { pos: FilePos::START }.into();
        assert_eq!(err.position(), Some(FilePos::START));
    }
}
