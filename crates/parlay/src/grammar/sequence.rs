//! Generated repetition symbols: `?`, `*` and `+`.
//!
//! A [`Sequence`] is a non-terminal whose rules are generated from a
//! single delegate symbol (and an optional separator) using guarded
//! right recursion:
//!
//! ```text
//! X?  :=  ε | X
//! X+  :=  X (sep X+)?
//! X*  :=  ε | (X (sep X*)?)
//! ```
//!
//! The recursive encoding keeps the grammar unambiguous, but it would
//! produce right-leaning chains of elements. A sequence therefore
//! remembers the ids of its generated helper symbols and, when its tree
//! node is built, splices the children of any helper element into one
//! flat ordered list. Nil marker tokens are dropped; a zero-occurrence
//! match becomes an empty element anchored at the marker's zero-width
//! range.

use crate::grammar::symbol::{NonTerminal, SymbolRef, NIL_ID};
use crate::grammar::{Rule, Symbol, SymbolId};
use crate::source::{FilePos, FileRange};
use crate::tree::{Element, Node};
use std::sync::Arc;

/// How many occurrences of the delegate a sequence accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl SequenceMode {
    const fn mode_char(self) -> char {
        match self {
            Self::ZeroOrOne => '?',
            Self::ZeroOrMore => '*',
            Self::OneOrMore => '+',
        }
    }
}

/// A generated non-terminal implementing `?`, `*` or `+`, optionally with
/// a separator between occurrences.
#[derive(Debug, Clone)]
pub struct Sequence {
    id: SymbolId,
    mode: SequenceMode,
    rules: Arc<[Rule]>,
    /// Ids of the generated helper symbols whose elements are spliced
    /// when this sequence builds its tree node.
    flatten_ids: Arc<[SymbolId]>,
}

fn gen_id(delegate: &Symbol, separator: Option<&Symbol>, mode: SequenceMode) -> SymbolId {
    let sep = separator.map_or_else(String::new, |s| format!("[{}]", s.id()));
    SymbolId::from(format!("{}{}{}", delegate.id(), sep, mode.mode_char()))
}

impl Sequence {
    /// Zero or one occurrence of `delegate`.
    #[must_use]
    pub fn optional(delegate: Symbol) -> Self {
        let id = gen_id(&delegate, None, SequenceMode::ZeroOrOne);
        let rules: Arc<[Rule]> = [Rule::epsilon(), Rule::of([delegate])].into();
        Self {
            flatten_ids: [id.clone()].into(),
            id,
            mode: SequenceMode::ZeroOrOne,
            rules,
        }
    }

    /// One or more occurrences of `delegate`, optionally separated.
    #[must_use]
    pub fn one_or_more(delegate: Symbol, separator: Option<Symbol>) -> Self {
        let id = gen_id(&delegate, separator.as_ref(), SequenceMode::OneOrMore);
        let (tail, mut flatten_ids) = Self::recursion_tail(&id, separator);
        let rules: Arc<[Rule]> = [Rule::of([delegate, Symbol::Sequence(tail)])].into();
        flatten_ids.push(id.clone());
        Self {
            id,
            mode: SequenceMode::OneOrMore,
            rules,
            flatten_ids: flatten_ids.into(),
        }
    }

    /// Zero or more occurrences of `delegate`, optionally separated.
    #[must_use]
    pub fn zero_or_more(delegate: Symbol, separator: Option<Symbol>) -> Self {
        let id = gen_id(&delegate, separator.as_ref(), SequenceMode::ZeroOrMore);
        let (tail, mut flatten_ids) = Self::recursion_tail(&id, separator);
        let body = NonTerminal::nested(vec![Rule::of([delegate, Symbol::Sequence(tail)])]);
        flatten_ids.push(body.id().clone());
        flatten_ids.push(id.clone());
        let rules: Arc<[Rule]> =
            [Rule::epsilon(), Rule::of([Symbol::NonTerminal(body)])].into();
        Self {
            id,
            mode: SequenceMode::ZeroOrMore,
            rules,
            flatten_ids: flatten_ids.into(),
        }
    }

    /// The optional recursive tail `(sep self)?`, plus the helper ids it
    /// introduces.
    fn recursion_tail(id: &SymbolId, separator: Option<Symbol>) -> (Self, Vec<SymbolId>) {
        let self_ref = Symbol::Ref(SymbolRef::new(id.clone()));
        let mut flatten_ids = Vec::new();
        let tail_delegate = match separator {
            None => self_ref,
            Some(sep) => {
                let nested = NonTerminal::nested(vec![Rule::of([sep, self_ref])]);
                flatten_ids.push(nested.id().clone());
                Symbol::NonTerminal(nested)
            }
        };
        let tail = Self::optional(tail_delegate);
        flatten_ids.push(tail.id.clone());
        (tail, flatten_ids)
    }

    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }

    #[must_use]
    pub const fn mode(&self) -> SequenceMode {
        self.mode
    }

    #[must_use]
    pub const fn rules(&self) -> &Arc<[Rule]> {
        &self.rules
    }

    /// Build the tree node for a reduction of this sequence, flattening
    /// helper elements into a single ordered child list.
    #[must_use]
    pub fn build_element(&self, parts: &[Arc<Node>]) -> Element {
        let mut out = Vec::new();
        for part in parts {
            self.flatten_into(part, &mut out);
        }
        if out.is_empty() {
            let anchor = parts
                .first()
                .map_or(FileRange::at(FilePos::START), |first| {
                    FileRange::at(first.range().start)
                });
            Element::empty_at(self.id.clone(), anchor)
        } else {
            Element::new(self.id.clone(), out)
        }
    }

    fn flatten_into(&self, node: &Arc<Node>, out: &mut Vec<Arc<Node>>) {
        match &**node {
            Node::Element(el) if self.flatten_ids.contains(el.symbol()) => {
                for child in el.children() {
                    self.flatten_into(child, out);
                }
            }
            Node::Token(token) if token.symbol().as_str() == NIL_ID => {}
            _ => out.push(Arc::clone(node)),
        }
    }
}

impl From<Sequence> for Symbol {
    fn from(seq: Sequence) -> Self {
        Self::Sequence(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::dsl::{kw, sym};
    use crate::source::FilePos;
    use crate::tree::Token;

    fn tok(id: &str, start: usize, text: &str) -> Arc<Node> {
        let range = FileRange::new(
            FilePos::new(start, 1, start as u32 + 1),
            FilePos::new(start + text.len(), 1, (start + text.len()) as u32 + 1),
        );
        Arc::new(Node::Token(Token::new(SymbolId::from(id), range, text)))
    }

    #[test]
    fn test_generated_ids() {
        assert_eq!(Sequence::optional(sym("X")).id().as_str(), "X?");
        assert_eq!(Sequence::zero_or_more(sym("X"), None).id().as_str(), "X*");
        assert_eq!(
            Sequence::one_or_more(sym("X"), Some(kw(","))).id().as_str(),
            "X[,]+"
        );
    }

    #[test]
    fn test_one_or_more_recursion_shape() {
        let seq = Sequence::one_or_more(sym("X"), None);
        assert_eq!(seq.rules().len(), 1);
        let rule = &seq.rules()[0];
        assert_eq!(rule.len(), 2);
        assert_eq!(rule.parts()[0].id().as_str(), "X");
        assert_eq!(rule.parts()[1].id().as_str(), "X+?");
    }

    #[test]
    fn test_flatten_splices_nested_matches() {
        let seq = Sequence::one_or_more(sym("X"), None);
        // Simulate the shape the runtime produces for "1 2": the tail
        // wraps a recursive match of the sequence itself.
        let inner = Arc::new(Node::Element(Element::new(
            seq.id().clone(),
            vec![tok("X", 2, "2")],
        )));
        let tail = Arc::new(Node::Element(Element::new(
            SymbolId::from("X+?"),
            vec![inner],
        )));
        let element = seq.build_element(&[tok("X", 0, "1"), tail]);
        assert_eq!(element.len(), 2);
        assert_eq!(element.children()[0].range().start.offset, 0);
        assert_eq!(element.children()[1].range().start.offset, 2);
    }

    #[test]
    fn test_zero_match_yields_anchored_empty_element() {
        let seq = Sequence::zero_or_more(sym("X"), None);
        let nil = Arc::new(Node::Token(Token::new(
            SymbolId::from(NIL_ID),
            FileRange::at(FilePos::new(4, 1, 5)),
            "",
        )));
        let element = seq.build_element(&[nil]);
        assert!(element.is_empty());
        assert_eq!(element.range().start.offset, 4);
    }
}
