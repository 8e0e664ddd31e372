//! Helpers for defining grammars readably in code.
//!
//! ```
//! use parlay::grammar::dsl::{kw, nt_rule, re};
//!
//! let num = re("NUM", "[0-9]+");
//! let sum = nt_rule("Sum", [num.clone(), kw("+"), num]);
//! let tree = sum.parse_str("12+34").unwrap();
//! assert_eq!(tree.root().source_text(), "12+34");
//! ```

use crate::grammar::sequence::Sequence;
use crate::grammar::symbol::{NonTerminal, SymbolRef, Terminal};
use crate::grammar::{Priority, Rule, Symbol, SymbolId};
use regex::Regex;

/// A keyword terminal whose id is its text.
#[must_use]
pub fn kw(text: &str) -> Symbol {
    Symbol::Terminal(Terminal::keyword(text, text))
}

/// A regular-expression terminal.
///
/// # Panics
///
/// Panics if `pattern` is not a valid regular expression; grammar
/// definitions are static, so this is a programming error caught at
/// construction. Use [`Terminal::pattern`] with a pre-built [`Regex`] to
/// handle the failure instead.
#[must_use]
pub fn re(id: &str, pattern: &str) -> Symbol {
    let compiled = Regex::new(pattern)
        .unwrap_or_else(|err| panic!("invalid pattern for terminal {id}: {err}"));
    Symbol::Terminal(Terminal::pattern(id, compiled))
}

/// A rule with the default priority.
#[must_use]
pub fn rule(parts: impl IntoIterator<Item = Symbol>) -> Rule {
    Rule::of(parts)
}

/// A rule with an explicit priority.
#[must_use]
pub fn rule_p(priority: &Priority, parts: impl IntoIterator<Item = Symbol>) -> Rule {
    Rule::new(priority.clone(), parts)
}

/// A non-terminal with multiple production rules.
#[must_use]
pub fn nt(id: &str, rules: impl IntoIterator<Item = Rule>) -> Symbol {
    Symbol::NonTerminal(NonTerminal::new(id, rules))
}

/// A non-terminal with a single production rule.
#[must_use]
pub fn nt_rule(id: &str, parts: impl IntoIterator<Item = Symbol>) -> Symbol {
    nt(id, [rule(parts)])
}

/// An anonymous grouping of rules, named after its contents.
#[must_use]
pub fn nested(rules: impl IntoIterator<Item = Rule>) -> Symbol {
    Symbol::NonTerminal(NonTerminal::nested(rules.into_iter().collect()))
}

/// A forward reference to a symbol defined elsewhere.
#[must_use]
pub fn sym(id: &str) -> Symbol {
    Symbol::Ref(SymbolRef::new(id))
}

/// Group `parts` into a single symbol, without nesting when there is just
/// one.
fn maybe_nest(parts: Vec<Symbol>) -> Symbol {
    if parts.len() == 1 {
        parts.into_iter().next().unwrap_or_else(|| unreachable!())
    } else {
        nested([rule(parts)])
    }
}

/// Zero or one occurrence of the given parts.
#[must_use]
pub fn opt(parts: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Sequence(Sequence::optional(maybe_nest(parts.into_iter().collect())))
}

/// Zero or more occurrences of the given parts, flattened into one
/// element.
#[must_use]
pub fn zero_or_more(parts: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Sequence(Sequence::zero_or_more(
        maybe_nest(parts.into_iter().collect()),
        None,
    ))
}

/// One or more occurrences of the given parts, flattened into one
/// element.
#[must_use]
pub fn one_or_more(parts: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Sequence(Sequence::one_or_more(
        maybe_nest(parts.into_iter().collect()),
        None,
    ))
}

/// A list of elements separated by `separator`, allowing the empty list.
#[must_use]
pub fn zero_or_more_separated_by(element: Symbol, separator: Symbol) -> Symbol {
    Symbol::Sequence(Sequence::zero_or_more(element, Some(separator)))
}

/// A non-empty list of elements separated by `separator`.
#[must_use]
pub fn one_or_more_separated_by(element: Symbol, separator: Symbol) -> Symbol {
    Symbol::Sequence(Sequence::one_or_more(element, Some(separator)))
}

/// Convenience: the id of a symbol as a [`SymbolId`].
#[must_use]
pub fn id_of(symbol: &Symbol) -> SymbolId {
    symbol.id().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kw_uses_text_as_id() {
        let plus = kw("+");
        assert_eq!(plus.id().as_str(), "+");
    }

    #[test]
    fn test_maybe_nest_keeps_single_symbols() {
        let single = opt([sym("X")]);
        assert_eq!(single.id().as_str(), "X?");
        let grouped = opt([sym("X"), sym("Y")]);
        assert_eq!(grouped.id().as_str(), "(X Y)?");
    }

    #[test]
    #[should_panic(expected = "invalid pattern")]
    fn test_re_rejects_bad_patterns() {
        let _ = re("BAD", "[");
    }
}
