//! The GLR runtime.
//!
//! The runtime advances a FIFO frontier of [`StackHead`]s through the
//! automaton's table. Every head that an action applies to successfully
//! forks a new head; heads whose state has no applicable action die
//! silently — that is normal exploration, not an error. The parse ends
//! when the frontier drains: zero completed trees is a syntax error, one
//! is the result, several are a reported ambiguity.
//!
//! Heads are immutable and share their parents by reference, so forking
//! costs one allocation. There is no sharing of derivation prefixes
//! *between* heads (no graph-structured stack): exploration of an
//! ambiguous grammar can be exponential, which is a deliberate
//! simplicity trade-off. Callers can bound it with [`ParseConfig`].

use crate::automaton::{Action, Automaton, Reduce, Shift, State};
use crate::error::{ParseError, ReaderError};
use crate::grammar::{Priority, Symbol, Terminal, END_ID, START_ID};
use crate::reader::ParserReader;
use crate::source::{FilePos, FileRange};
use crate::tree::{Element, Node, Token};
use log::{debug, trace};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// One node of one candidate parse stack: the unit of parallel
/// exploration. Never mutated after creation; parents are shared by
/// reference between the forks that grew from them.
#[derive(Debug, Clone)]
pub struct StackHead {
    left: Option<Arc<StackHead>>,
    state: Option<State>,
    node: Arc<Node>,
    priority: Priority,
}

impl StackHead {
    /// The parent this head grew from; `None` for the initial head.
    #[must_use]
    pub fn left(&self) -> Option<&Arc<StackHead>> {
        self.left.as_ref()
    }

    /// The parse state reached by the transition into this head; `None`
    /// for the initial head.
    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// The tree node produced by the transition into this head.
    #[must_use]
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// The priority of the rule or terminal that produced the node.
    #[must_use]
    pub const fn priority(&self) -> &Priority {
        &self.priority
    }

    /// Where this head's last matched token ends: the position the reader
    /// is repositioned to before acting on this head.
    #[must_use]
    pub fn parse_position(&self) -> FilePos {
        self.node.range().end
    }

    fn at_root_depth(&self) -> bool {
        match &self.left {
            None => true,
            Some(below) => below.left.is_none(),
        }
    }
}

impl fmt::Display for StackHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{state} => {}", self.node)?,
            None => f.write_str("ROOT")?,
        }
        if let Some(left) = &self.left {
            write!(f, "\n{left}")?;
        }
        Ok(())
    }
}

/// Resource caps for one parse. Both default to unlimited: bounding an
/// exponentially ambiguous exploration is the caller's decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseConfig {
    /// Abort when the frontier grows beyond this many heads.
    pub max_stacks: Option<usize>,
    /// Abort after this many heads have been processed.
    pub max_steps: Option<u64>,
}

/// A completed parse: the root node plus the zero-width end-of-input
/// token carrying any trailing ignorable text, so the original input can
/// be reconstructed byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    root: Node,
    end: Token,
}

impl ParseTree {
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// The zero-width end-of-input token; its ignored prefix is the
    /// trailing whitespace/comment text after the last significant token.
    #[must_use]
    pub const fn end_token(&self) -> &Token {
        &self.end
    }

    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Reconstruct the parsed input exactly.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = self.root.source_text();
        out.push_str(self.end.ignored_prefix());
        out
    }
}

/// Parse the reader's input against the automaton's table.
pub fn parse(automaton: &Automaton, reader: &mut ParserReader) -> Result<ParseTree, ParseError> {
    parse_with(automaton, reader, &ParseConfig::default())
}

/// Parse with explicit resource caps.
pub fn parse_with(
    automaton: &Automaton,
    reader: &mut ParserReader,
    config: &ParseConfig,
) -> Result<ParseTree, ParseError> {
    reader.reset();
    let start_token = Token::new(START_ID.into(), FileRange::at(reader.pos()), "");
    let initial = StackHead {
        left: None,
        state: None,
        node: Arc::new(Node::Token(start_token)),
        priority: Priority::default_priority(),
    };

    let accept_state = State::accept();
    let mut frontier: VecDeque<Arc<StackHead>> = VecDeque::new();
    frontier.push_back(Arc::new(initial));
    let mut completed: Vec<ParseTree> = Vec::new();
    let mut furthest = reader.pos();
    let mut steps: u64 = 0;

    while let Some(head) = frontier.pop_front() {
        steps += 1;
        if config.max_steps.is_some_and(|max| steps > max) {
            return Err(ParseError::LimitExceeded {
                what: "step",
                pos: furthest,
            });
        }

        if head.state.as_ref() == Some(&accept_state) {
            // Completed. Re-consume from the root's end so the trailing
            // ignorable text survives in the end token.
            reader.seek(head.parse_position())?;
            let trailing = consume_ignored(reader, automaton.ignore())?;
            let tree = ParseTree {
                root: (*head.node).clone(),
                end: Token::with_prefix(
                    END_ID.into(),
                    FileRange::at(reader.pos()),
                    "",
                    trailing,
                ),
            };
            // Distinct exploration paths can complete with the same tree;
            // only genuinely different derivations count as ambiguity.
            if !completed.contains(&tree) {
                completed.push(tree);
            }
            continue;
        }

        let actions = automaton.applicable_actions(&head.state);
        if actions.is_empty() {
            // Ran out of steam on this alternative; normal exploration.
            trace!("dead head, no actions for {:?}", head.state);
            continue;
        }

        // Reposition to the end of the head's last token and skip
        // whitespace/comments once for all of this head's attempts.
        let base = head.parse_position();
        reader.seek(base)?;
        let ignored = consume_ignored(reader, automaton.ignore())?;
        let cursor = reader.pos();
        if cursor.offset > furthest.offset {
            furthest = cursor;
        }

        let mut matched = false;
        for action in &actions {
            // Each attempt starts from the same cursor; a sibling match
            // must not leak its position into the next attempt.
            reader.seek(cursor)?;
            match action {
                Action::Shift(shift) => {
                    if let Some(new_head) = apply_shift(shift, &head, reader, &ignored, base)? {
                        matched = true;
                        frontier.push_back(new_head);
                    }
                }
                Action::Reduce(reduce) => {
                    if let Some(new_head) = apply_reduce(reduce, &head) {
                        matched = true;
                        frontier.push_back(new_head);
                    }
                }
                Action::Accept(_) => {
                    if head.at_root_depth() && reader.at_end() {
                        matched = true;
                        frontier.push_back(Arc::new(StackHead {
                            left: Some(Arc::clone(&head)),
                            state: Some(accept_state.clone()),
                            node: Arc::clone(&head.node),
                            priority: head.priority.clone(),
                        }));
                    }
                }
            }
        }
        if !matched {
            debug!(
                "nothing matched at {} in state {:?} among {} actions",
                cursor,
                head.state,
                actions.len()
            );
        }

        if config.max_stacks.is_some_and(|max| frontier.len() > max) {
            return Err(ParseError::LimitExceeded {
                what: "stack",
                pos: furthest,
            });
        }
    }

    match completed.len() {
        0 => Err(ParseError::Syntax {
            range: FileRange::at(furthest),
        }),
        1 => Ok(completed
            .pop()
            .unwrap_or_else(|| unreachable!("completed has exactly one tree"))),
        _ => {
            let range = FileRange::at(completed[0].root().range().end);
            Err(ParseError::Ambiguous {
                alternatives: completed,
                range,
            })
        }
    }
}

fn apply_shift(
    shift: &Shift,
    head: &Arc<StackHead>,
    reader: &mut ParserReader,
    ignored: &str,
    pre_ignored: FilePos,
) -> Result<Option<Arc<StackHead>>, ReaderError> {
    let Some(token) = shift.terminal.match_at(reader, ignored, pre_ignored)? else {
        return Ok(None);
    };
    trace!("shift {} -> {}", token, shift.target);
    Ok(Some(Arc::new(StackHead {
        left: Some(Arc::clone(head)),
        state: Some(shift.target.clone()),
        node: Arc::new(Node::Token(token)),
        priority: shift.priority.clone(),
    })))
}

/// Walk backward through the head chain matching each rule part against
/// the node at each link (including its priority requirement). On a full
/// match, build the composite node and chain a new state from the fork
/// point.
fn apply_reduce(reduce: &Reduce, head: &Arc<StackHead>) -> Option<Arc<StackHead>> {
    let mut matched: SmallVec<[Arc<Node>; 4]> = SmallVec::with_capacity(reduce.parts.len());
    let mut cur: &Arc<StackHead> = head;
    for part in reduce.parts.iter().rev() {
        if !part.compatible_with(cur.node.symbol(), &cur.priority) {
            return None;
        }
        matched.push(Arc::clone(&cur.node));
        cur = cur.left.as_ref()?;
    }
    matched.reverse();

    let node = build_node(&reduce.symbol, matched.into_vec());
    let state = State::new(cur.state.clone(), reduce.symbol.base_id().clone());
    trace!("reduce to {} -> {}", reduce.symbol.id(), state);
    Some(Arc::new(StackHead {
        left: Some(Arc::clone(cur)),
        state: Some(state),
        node: Arc::new(node),
        priority: reduce.priority.clone(),
    }))
}

/// The owning symbol's tree-construction hook: sequences flatten their
/// matches, everything else wraps the parts in an element as-is.
fn build_node(symbol: &Symbol, children: Vec<Arc<Node>>) -> Node {
    match symbol {
        Symbol::Sequence(seq) => Node::Element(seq.build_element(&children)),
        _ => Node::Element(Element::new(symbol.base_id().clone(), children)),
    }
}

/// Repeatedly apply every ignorable terminal until no forward progress is
/// made, then return the skipped text verbatim. The reader ends up after
/// the skipped text.
fn consume_ignored(
    reader: &mut ParserReader,
    ignore: &[Terminal],
) -> Result<String, ReaderError> {
    if ignore.is_empty() {
        return Ok(String::new());
    }
    let start = reader.pos();
    let mut last = start;
    loop {
        for terminal in ignore {
            let _ = terminal.match_at(reader, "", last)?;
        }
        let now = reader.pos();
        if now.offset == last.offset {
            break;
        }
        last = now;
    }
    if last.offset == start.offset {
        return Ok(String::new());
    }
    reader.seek(start)?;
    reader.read_string(last.offset - start.offset)
}
