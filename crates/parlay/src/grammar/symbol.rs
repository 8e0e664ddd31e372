//! Grammar symbols.
//!
//! The vocabulary of a grammar is a closed set of symbol kinds: terminals
//! that match raw input, non-terminals with alternative rules, named
//! forward references (how cyclic grammars are expressed), priority-scoped
//! wrappers, and generated repetition sequences. Symbol identity is the id
//! string alone; two symbols with the same id are the same symbol wherever
//! they appear.

use crate::error::ReaderError;
use crate::grammar::sequence::Sequence;
use crate::grammar::{Priority, Requirement, Rule};
use crate::reader::ParserReader;
use crate::source::{FilePos, FileRange};
use crate::tree::Token;
use compact_str::CompactString;
use regex::Regex;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Id of the zero-width start-of-input marker.
pub const START_ID: &str = "<start>";
/// Id of the zero-width end-of-input marker.
pub const END_ID: &str = "<end>";
/// Id of the zero-width always-matching marker used for empty productions.
pub const NIL_ID: &str = "<nil>";

/// The unique name of a grammar symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(CompactString);

impl SymbolId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SymbolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SymbolId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grammar symbol. See the module docs for the roles of the variants.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// Matches a piece of raw input.
    Terminal(Terminal),
    /// One or more alternative rules.
    NonTerminal(NonTerminal),
    /// A named forward reference, resolved against the automaton's symbol
    /// registry. This is how cyclic rule structures are expressed without
    /// cyclic ownership.
    Ref(SymbolRef),
    /// A symbol decorated with a priority requirement for one derivation
    /// slot.
    Scoped(ScopedSymbol),
    /// A generated non-terminal implementing `?`, `*` or `+`, flattening
    /// its matches into a single element.
    Sequence(Sequence),
}

impl Symbol {
    /// The symbol's unique id.
    #[must_use]
    pub fn id(&self) -> &SymbolId {
        match self {
            Self::Terminal(t) => &t.id,
            Self::NonTerminal(nt) => &nt.id,
            Self::Ref(r) => &r.id,
            Self::Scoped(s) => &s.id,
            Self::Sequence(seq) => seq.id(),
        }
    }

    /// The id with any priority scoping stripped: the id that appears in
    /// parse states and tree nodes.
    #[must_use]
    pub fn base_id(&self) -> &SymbolId {
        match self {
            Self::Scoped(s) => s.inner.base_id(),
            _ => self.id(),
        }
    }

    #[must_use]
    pub fn is_non_terminal(&self) -> bool {
        match self {
            Self::Terminal(_) => false,
            Self::NonTerminal(_) | Self::Sequence(_) => true,
            Self::Ref(_) => false, // unresolved; the registry entry decides
            Self::Scoped(s) => s.inner.is_non_terminal(),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// The alternative rules of a non-terminal or sequence.
    #[must_use]
    pub fn rules(&self) -> Option<&Arc<[Rule]>> {
        match self {
            Self::NonTerminal(nt) => Some(&nt.rules),
            Self::Sequence(seq) => Some(seq.rules()),
            _ => None,
        }
    }

    /// Whether a stack node parsed as `candidate` with the given producing
    /// priority satisfies this rule part. Plain symbols only require the
    /// same id; scoped symbols additionally check their requirement
    /// against the priority that produced the node.
    #[must_use]
    pub fn compatible_with(&self, candidate: &SymbolId, priority: &Priority) -> bool {
        match self {
            Self::Scoped(s) => s.inner.base_id() == candidate && s.req.check(priority),
            _ => self.id() == candidate,
        }
    }

    /// Add this symbol and every symbol reachable through its rules to the
    /// set, keyed by id. A definition always wins over a forward reference
    /// with the same id.
    pub fn collect_symbols(&self, set: &mut BTreeMap<SymbolId, Symbol>) {
        let id = self.id().clone();
        match set.get(&id) {
            // A real definition is already there; nothing to add.
            Some(existing) if !matches!(existing, Self::Ref(_)) => return,
            // Only a forward reference so far; a ref adds nothing new.
            Some(_) if matches!(self, Self::Ref(_)) => return,
            _ => {}
        }
        set.insert(id, self.clone());
        match self {
            Self::Terminal(_) | Self::Ref(_) => {}
            Self::NonTerminal(nt) => collect_rule_symbols(&nt.rules, set),
            Self::Sequence(seq) => collect_rule_symbols(seq.rules(), set),
            Self::Scoped(s) => s.inner.collect_symbols(set),
        }
    }

    /// Wrap this symbol with a `> priority` requirement.
    #[must_use]
    pub fn gt(&self, priority: &Priority) -> Self {
        self.with_requirement(priority.require_greater_than())
    }

    /// Wrap this symbol with a `>= priority` requirement.
    #[must_use]
    pub fn ge(&self, priority: &Priority) -> Self {
        self.with_requirement(priority.require_greater_than_or_equal_to())
    }

    /// Wrap this symbol with a `< priority` requirement.
    #[must_use]
    pub fn lt(&self, priority: &Priority) -> Self {
        self.with_requirement(priority.require_less_than())
    }

    /// Wrap this symbol with a `<= priority` requirement.
    #[must_use]
    pub fn le(&self, priority: &Priority) -> Self {
        self.with_requirement(priority.require_less_than_or_equal_to())
    }

    /// Wrap this symbol with an `= priority` requirement.
    #[must_use]
    pub fn eq_to(&self, priority: &Priority) -> Self {
        self.with_requirement(priority.require_equal_to())
    }

    #[must_use]
    pub fn with_requirement(&self, req: Requirement) -> Self {
        Self::Scoped(ScopedSymbol::new(self.clone(), req))
    }
}

fn collect_rule_symbols(rules: &Arc<[Rule]>, set: &mut BTreeMap<SymbolId, Symbol>) {
    for rule in rules.iter() {
        for part in rule.parts() {
            part.collect_symbols(set);
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(other.id())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id().as_str())
    }
}

/// How a [`Terminal`] recognizes input.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// An exact piece of text.
    Keyword(CompactString),
    /// An anchored regular expression; never matches the empty string.
    Pattern(Arc<Regex>),
    /// A region between two delimiters, with optional escaping and
    /// nesting.
    Delimited(Arc<Delimited>),
    /// A zero-width positional marker.
    Marker(MarkerKind),
}

/// Configuration for a delimited-region matcher.
#[derive(Debug, Clone)]
pub struct Delimited {
    /// Prefix that opens the region.
    pub start: CompactString,
    /// Text that closes the region.
    pub end: CompactString,
    /// If this character precedes the end delimiter, the end is not
    /// matched. `None` disables escaping.
    pub escape: Option<char>,
    /// If true, inner start/end delimiter pairs nest and are skipped.
    pub nesting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Matches zero characters, only at the start of the input.
    Start,
    /// Matches zero characters, only at the end of the input.
    End,
    /// Always matches zero characters.
    Nil,
}

/// A terminal: a symbol matched directly against the input text.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub(crate) id: SymbolId,
    pub(crate) priority: Priority,
    pub(crate) matcher: Matcher,
}

impl Terminal {
    #[must_use]
    pub fn new(id: impl Into<SymbolId>, matcher: Matcher, priority: Priority) -> Self {
        Self {
            id: id.into(),
            priority,
            matcher,
        }
    }

    /// A terminal matching an exact piece of text.
    #[must_use]
    pub fn keyword(id: impl Into<SymbolId>, text: impl Into<CompactString>) -> Self {
        Self::new(id, Matcher::Keyword(text.into()), Priority::default_priority())
    }

    /// A terminal matching an anchored regular expression.
    #[must_use]
    pub fn pattern(id: impl Into<SymbolId>, re: Regex) -> Self {
        Self::new(id, Matcher::Pattern(Arc::new(re)), Priority::default_priority())
    }

    /// A terminal matching a delimited region.
    #[must_use]
    pub fn delimited(id: impl Into<SymbolId>, spec: Delimited) -> Self {
        Self::new(id, Matcher::Delimited(Arc::new(spec)), Priority::default_priority())
    }

    /// The zero-width start-of-input marker.
    #[must_use]
    pub fn start_of_file() -> Self {
        Self::new(START_ID, Matcher::Marker(MarkerKind::Start), Priority::default_priority())
    }

    /// The zero-width end-of-input marker.
    #[must_use]
    pub fn end_of_file() -> Self {
        Self::new(END_ID, Matcher::Marker(MarkerKind::End), Priority::default_priority())
    }

    /// The zero-width always-matching marker.
    #[must_use]
    pub fn nil() -> Self {
        Self::new(NIL_ID, Matcher::Marker(MarkerKind::Nil), Priority::default_priority())
    }

    /// Replace the terminal's priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }

    #[must_use]
    pub const fn priority(&self) -> &Priority {
        &self.priority
    }

    #[must_use]
    pub const fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self.matcher, Matcher::Marker(_))
    }

    /// Attempt to match this terminal at the reader's current position.
    ///
    /// On success the reader is left after the matched text and the token
    /// carries `ignored` as its prefix; on failure the reader is restored
    /// to where it was. Zero-width markers anchor at `pre_ignored`, the
    /// position before any skipped ignorable text, and never claim that
    /// text (the end-of-input marker is the exception: it sits after the
    /// final trivia and keeps it).
    pub fn match_at(
        &self,
        reader: &mut ParserReader,
        ignored: &str,
        pre_ignored: FilePos,
    ) -> Result<Option<Token>, ReaderError> {
        match &self.matcher {
            Matcher::Keyword(text) => self.match_keyword(reader, ignored, text),
            Matcher::Pattern(re) => self.match_pattern(reader, ignored, re),
            Matcher::Delimited(spec) => self.match_delimited(reader, ignored, spec),
            Matcher::Marker(kind) => Ok(self.match_marker(reader, ignored, pre_ignored, *kind)),
        }
    }

    fn match_keyword(
        &self,
        reader: &mut ParserReader,
        ignored: &str,
        text: &str,
    ) -> Result<Option<Token>, ReaderError> {
        if !reader.tail().starts_with(text) {
            return Ok(None);
        }
        let start = reader.pos();
        reader.seek_to(start.offset + text.len())?;
        Ok(Some(Token::with_prefix(
            self.id.clone(),
            reader.range_from(start),
            text,
            ignored,
        )))
    }

    fn match_pattern(
        &self,
        reader: &mut ParserReader,
        ignored: &str,
        re: &Regex,
    ) -> Result<Option<Token>, ReaderError> {
        let (text, end) = match re.find(reader.tail()) {
            // Anchored semantics, and an empty match is no match even if
            // the pattern would allow it.
            Some(found) if found.start() == 0 && !found.is_empty() => {
                (CompactString::from(found.as_str()), found.end())
            }
            _ => return Ok(None),
        };
        let start = reader.pos();
        reader.seek_to(start.offset + end)?;
        Ok(Some(Token::with_prefix(
            self.id.clone(),
            reader.range_from(start),
            text,
            ignored,
        )))
    }

    fn match_delimited(
        &self,
        reader: &mut ParserReader,
        ignored: &str,
        spec: &Delimited,
    ) -> Result<Option<Token>, ReaderError> {
        if spec.start.is_empty() || spec.end.is_empty() {
            return Ok(None);
        }
        if reader.remaining() < spec.start.len() + spec.end.len() {
            return Ok(None);
        }
        let from = reader.pos();
        for expected in spec.start.chars() {
            if reader.read() != Some(expected) {
                reader.seek(from)?;
                return Ok(None);
            }
        }
        let mut text = String::from(spec.start.as_str());
        let end_chars: SmallVec<[char; 8]> = spec.end.chars().collect();
        let start_chars: SmallVec<[char; 8]> = spec.start.chars().collect();
        let mut end_matched = 0;
        let mut start_matched = 0;
        let mut escaped = false;
        let mut depth = 0usize;
        loop {
            let Some(ch) = reader.read() else {
                // Unterminated region: a failed match, not an error.
                reader.seek(from)?;
                return Ok(None);
            };
            text.push(ch);
            if escaped {
                escaped = false;
            } else if spec.escape == Some(ch) {
                escaped = true;
                end_matched = 0;
                start_matched = 0;
            } else if ch == end_chars[end_matched] {
                start_matched = 0;
                end_matched += 1;
                if end_matched == end_chars.len() {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    end_matched = 0;
                }
            } else if spec.nesting && ch == start_chars[start_matched] {
                end_matched = 0;
                start_matched += 1;
                if start_matched == start_chars.len() {
                    depth += 1;
                    start_matched = 0;
                }
            } else {
                end_matched = 0;
                start_matched = 0;
            }
        }
        Ok(Some(Token::with_prefix(
            self.id.clone(),
            reader.range_from(from),
            text,
            ignored,
        )))
    }

    fn match_marker(
        &self,
        reader: &ParserReader,
        ignored: &str,
        pre_ignored: FilePos,
        kind: MarkerKind,
    ) -> Option<Token> {
        match kind {
            MarkerKind::Start if pre_ignored.offset == 0 => {
                Some(Token::new(self.id.clone(), FileRange::at(pre_ignored), ""))
            }
            MarkerKind::Nil => Some(Token::new(self.id.clone(), FileRange::at(pre_ignored), "")),
            MarkerKind::End if reader.at_end() => Some(Token::with_prefix(
                self.id.clone(),
                FileRange::at(reader.pos()),
                "",
                ignored,
            )),
            _ => None,
        }
    }
}

impl From<Terminal> for Symbol {
    fn from(terminal: Terminal) -> Self {
        Self::Terminal(terminal)
    }
}

/// A non-terminal: a symbol produced by reducing one of its rules.
#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub(crate) id: SymbolId,
    pub(crate) rules: Arc<[Rule]>,
}

impl NonTerminal {
    pub fn new(id: impl Into<SymbolId>, rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            id: id.into(),
            rules: rules.into_iter().collect(),
        }
    }

    /// An anonymous non-terminal named after its rules, for grouping parts
    /// inside a larger rule.
    #[must_use]
    pub fn nested(rules: Vec<Rule>) -> Self {
        let mut id = String::from("(");
        for (i, rule) in rules.iter().enumerate() {
            if i > 0 {
                id.push_str(" | ");
            }
            id.push_str(&rule.to_string());
        }
        id.push(')');
        Self::new(id, rules)
    }

    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl From<NonTerminal> for Symbol {
    fn from(nt: NonTerminal) -> Self {
        Self::NonTerminal(nt)
    }
}

/// A forward reference to a symbol defined elsewhere, by id.
#[derive(Debug, Clone)]
pub struct SymbolRef {
    pub(crate) id: SymbolId,
}

impl SymbolRef {
    pub fn new(id: impl Into<SymbolId>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }
}

impl From<SymbolRef> for Symbol {
    fn from(r: SymbolRef) -> Self {
        Self::Ref(r)
    }
}

/// A symbol bound to a priority requirement for one derivation slot.
#[derive(Debug, Clone)]
pub struct ScopedSymbol {
    pub(crate) id: SymbolId,
    pub(crate) inner: Arc<Symbol>,
    pub(crate) req: Requirement,
}

impl ScopedSymbol {
    #[must_use]
    pub fn new(inner: Symbol, req: Requirement) -> Self {
        let id = SymbolId::from(format!("{}[{}]", inner.id(), req));
        Self {
            id,
            inner: Arc::new(inner),
            req,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &SymbolId {
        &self.id
    }

    #[must_use]
    pub fn inner(&self) -> &Symbol {
        &self.inner
    }

    #[must_use]
    pub const fn requirement(&self) -> &Requirement {
        &self.req
    }
}

impl From<ScopedSymbol> for Symbol {
    fn from(s: ScopedSymbol) -> Self {
        Self::Scoped(s)
    }
}
