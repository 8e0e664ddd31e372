//! # Parlay
//!
//! A Generalized-LR (GLR) parsing engine with priority-based
//! disambiguation.
//!
//! ## Overview
//!
//! Given a grammar of terminals, non-terminals, rules, and priorities,
//! parlay compiles a parse table (the [`Automaton`]) and then runs an
//! input through it, exploring every viable derivation in parallel. The
//! outcome is a unique parse tree, a reported ambiguity carrying every
//! alternative tree, or a syntax error with the furthest position
//! reached.
//!
//! - **Priorities** form an explicit, non-transitive partial order;
//!   attaching requirements like `expr.gt(&plus_priority)` to rule parts
//!   expresses operator precedence and associativity without classic
//!   shift/reduce conflicts.
//! - **Trees are lossless**: every token records its exact source range
//!   and the whitespace/comments skipped before it, so a [`ParseTree`]
//!   reproduces its input byte-for-byte.
//! - **Exploration is honest**: ambiguity is surfaced, never silently
//!   resolved, and a dead derivation is discarded without noise.
//!
//! ## Quick start
//!
//! ```
//! use parlay::grammar::dsl::{kw, nt_rule, re};
//!
//! let num = re("NUM", "[0-9]+");
//! let sum = nt_rule("Sum", [num.clone(), kw("+"), num]);
//!
//! let tree = sum.parse_str("12+34").unwrap();
//! let root = tree.root().as_element().unwrap();
//! assert_eq!(root.len(), 3);
//! assert_eq!(tree.text(), "12+34");
//! ```
//!
//! Operator precedence with priorities:
//!
//! ```
//! use parlay::grammar::dsl::{kw, nt, re, rule_p, sym};
//! use parlay::grammar::Priority;
//!
//! let ps = Priority::new("ps", []);                       // sums
//! let pp = Priority::new("pp", [ps.clone()]);             // products bind tighter
//! let pi = Priority::new("pi", [pp.clone(), ps.clone()]); // literals bind tightest
//!
//! let num = re("NUM", "[0-9]+");
//! let e = sym("Expr");
//! let expr = nt(
//!     "Expr",
//!     [
//!         rule_p(&ps, [e.gt(&ps), kw("+"), e.ge(&ps)]),
//!         rule_p(&pp, [e.gt(&pp), kw("*"), e.ge(&pp)]),
//!         rule_p(&pi, [num]),
//!     ],
//! );
//!
//! // Parses as (12*34)+(56*78): exactly one tree, no ambiguity.
//! let tree = expr.parse_str("12*34+56*78").unwrap();
//! assert_eq!(tree.text(), "12*34+56*78");
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] — priorities, symbols, rules, the grammar bundle, and a
//!   small definition DSL
//! - [`automaton`] — parse states, actions, and the table builder
//! - [`parser`] — the GLR runtime, stack heads, and parse results
//! - [`tree`] — parse-tree nodes with exact source ranges
//! - [`reader`] — the seekable position-tracking input cursor
//! - [`source`] — positions and ranges
//! - [`error`] — grammar, reader, and parse errors

pub mod automaton;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod reader;
pub mod source;
pub mod tree;

pub use automaton::{Action, Automaton, State};
pub use error::{Error, GrammarError, ParseError, ReaderError};
pub use grammar::{
    Grammar, NonTerminal, Priority, Requirement, Rule, Sequence, Symbol, SymbolId, Terminal,
};
pub use parser::{parse, parse_with, ParseConfig, ParseTree, StackHead};
pub use reader::ParserReader;
pub use source::{FilePos, FileRange};
pub use tree::{Element, Node, Token};
