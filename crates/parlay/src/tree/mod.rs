//! Parse-tree nodes.
//!
//! A successful parse produces a tree of [`Node`]s: [`Token`] leaves for
//! matched terminals and [`Element`] composites for reduced rules. Every
//! node carries the exact source range it covers, and every token keeps
//! the verbatim ignorable text (whitespace, comments) that immediately
//! preceded it, so the original input can be reconstructed from the tree.

use crate::grammar::SymbolId;
use crate::source::FileRange;
use compact_str::CompactString;
use std::fmt;
use std::sync::Arc;

/// A unit of the parse tree: either a matched terminal or a reduced rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Token(Token),
    Element(Element),
}

impl Node {
    /// The grammar symbol this node was parsed as.
    #[must_use]
    pub fn symbol(&self) -> &SymbolId {
        match self {
            Self::Token(token) => token.symbol(),
            Self::Element(element) => element.symbol(),
        }
    }

    /// The span of input this node covers.
    #[must_use]
    pub fn range(&self) -> FileRange {
        match self {
            Self::Token(token) => token.range(),
            Self::Element(element) => element.range(),
        }
    }

    /// The leaf tokens under this node, in source order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            Self::Token(token) => out.push(token),
            Self::Element(element) => {
                for child in element.children() {
                    child.collect_tokens(out);
                }
            }
        }
    }

    /// Reconstruct the source text covered by this node, including each
    /// token's ignored prefix.
    #[must_use]
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        for token in self.tokens() {
            out.push_str(token.ignored_prefix());
            out.push_str(token.text());
        }
        out
    }

    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Token(token) => Some(token),
            Self::Element(_) => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Token(_) => None,
            Self::Element(element) => Some(element),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => token.fmt(f),
            Self::Element(element) => element.fmt(f),
        }
    }
}

impl From<Token> for Node {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// A leaf of the parse tree: one matched terminal.
///
/// The token's text is exactly the input slice its range covers; the
/// ignored prefix is whatever ignorable text came immediately before it.
/// Equality ignores the prefix — two tokens are the same match whether or
/// not a comment preceded them.
#[derive(Debug, Clone)]
pub struct Token {
    symbol: SymbolId,
    range: FileRange,
    text: CompactString,
    ignored_prefix: CompactString,
}

impl Token {
    pub fn new(symbol: SymbolId, range: FileRange, text: impl Into<CompactString>) -> Self {
        Self::with_prefix(symbol, range, text, "")
    }

    pub fn with_prefix(
        symbol: SymbolId,
        range: FileRange,
        text: impl Into<CompactString>,
        ignored_prefix: impl Into<CompactString>,
    ) -> Self {
        let text = text.into();
        debug_assert_eq!(text.len(), range.len(), "token text must fill its range");
        Self {
            symbol,
            range,
            text,
            ignored_prefix: ignored_prefix.into(),
        }
    }

    /// Replace the ignored prefix, consuming the token.
    #[must_use]
    pub fn prefixed_with(mut self, ignored_prefix: impl Into<CompactString>) -> Self {
        self.ignored_prefix = ignored_prefix.into();
        self
    }

    #[must_use]
    pub const fn symbol(&self) -> &SymbolId {
        &self.symbol
    }

    #[must_use]
    pub const fn range(&self) -> FileRange {
        self.range
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ignorable text (whitespace, comments) consumed immediately before
    /// this token but not used as part of parsing.
    #[must_use]
    pub fn ignored_prefix(&self) -> &str {
        &self.ignored_prefix
    }

    #[must_use]
    pub fn is_zero_width(&self) -> bool {
        self.text.is_empty()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.range == other.range && self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() || self.text.as_str() == self.symbol.as_str() {
            write!(f, "{}", self.symbol)
        } else {
            write!(
                f,
                "{}({})",
                self.symbol,
                self.text.replace('\n', "\\n").replace('\r', "\\r")
            )
        }
    }
}

/// A composite node: the reduction of one grammar rule, with the matched
/// parts as ordered children.
#[derive(Debug, Clone)]
pub struct Element {
    symbol: SymbolId,
    children: Vec<Arc<Node>>,
    range: FileRange,
}

impl Element {
    /// Build an element over one or more matched children. The range spans
    /// from the first child to the last.
    #[must_use]
    pub fn new(symbol: SymbolId, children: Vec<Arc<Node>>) -> Self {
        debug_assert!(!children.is_empty(), "use empty_at for zero-width elements");
        let range = FileRange::span(
            children[0].range(),
            children[children.len() - 1].range(),
        );
        Self {
            symbol,
            children,
            range,
        }
    }

    /// Build an element with no children, anchored at an explicit
    /// zero-width position (a sequence that matched zero occurrences).
    #[must_use]
    pub const fn empty_at(symbol: SymbolId, range: FileRange) -> Self {
        Self {
            symbol,
            children: Vec::new(),
            range,
        }
    }

    #[must_use]
    pub const fn symbol(&self) -> &SymbolId {
        &self.symbol
    }

    #[must_use]
    pub const fn range(&self) -> FileRange {
        self.range
    }

    #[must_use]
    pub fn children(&self) -> &[Arc<Node>] {
        &self.children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The texts of the direct children, handy in tests and diagnostics.
    #[must_use]
    pub fn child_texts(&self) -> Vec<String> {
        self.children
            .iter()
            .map(|child| child.source_text())
            .collect()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a == b)
    }
}

impl Eq for Element {}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            child.fmt(f)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FilePos;

    fn tok(id: &str, start: usize, text: &str) -> Token {
        let range = FileRange::new(
            FilePos::new(start, 1, start as u32 + 1),
            FilePos::new(start + text.len(), 1, (start + text.len()) as u32 + 1),
        );
        Token::new(SymbolId::from(id), range, text)
    }

    #[test]
    fn test_token_equality_ignores_prefix() {
        let plain = tok("NUM", 3, "42");
        let prefixed = plain.clone().prefixed_with("  ");
        assert_eq!(plain, prefixed);
        assert_eq!(prefixed.ignored_prefix(), "  ");
    }

    #[test]
    fn test_element_range_spans_children() {
        let element = Element::new(
            SymbolId::from("Sum"),
            vec![
                Arc::new(tok("NUM", 0, "12").into()),
                Arc::new(tok("+", 2, "+").into()),
                Arc::new(tok("NUM", 3, "34").into()),
            ],
        );
        assert_eq!(element.range().start.offset, 0);
        assert_eq!(element.range().end.offset, 5);
        assert_eq!(element.len(), 3);
    }

    #[test]
    fn test_source_text_concatenates_prefixes() {
        let node: Node = Element::new(
            SymbolId::from("Sum"),
            vec![
                Arc::new(tok("NUM", 1, "12").prefixed_with(" ").into()),
                Arc::new(tok("+", 4, "+").prefixed_with(" ").into()),
                Arc::new(tok("NUM", 6, "34").prefixed_with(" ").into()),
            ],
        )
        .into();
        assert_eq!(node.source_text(), " 12 + 34");
    }

    #[test]
    fn test_empty_element_keeps_anchor() {
        let anchor = FileRange::at(FilePos::new(5, 1, 6));
        let element = Element::empty_at(SymbolId::from("X?"), anchor);
        assert_eq!(element.range(), anchor);
        assert!(element.is_empty());
    }

    #[test]
    fn test_display() {
        let node: Node = Element::new(
            SymbolId::from("Sum"),
            vec![
                Arc::new(tok("NUM", 0, "12").into()),
                Arc::new(tok("+", 2, "+").into()),
            ],
        )
        .into();
        assert_eq!(format!("{node}"), "Sum(NUM(12), +)");
    }
}
