//! The automaton: a grammar compiled into a parse table.
//!
//! The table maps each parse [`State`] to the set of [`Action`]s legal in
//! that state. Building it walks the grammar once with a worklist of
//! (symbol, previous-state, state-prefix, requirement) items, deduplicated
//! so recursive and cyclic grammars terminate. Zero actions for a state at
//! runtime means the derivation it represents is dead; more than one means
//! the exploration forks.

mod action;
mod state;

pub use action::{Accept, Action, Reduce, Shift};
pub use state::State;

use crate::error::{GrammarError, ParseError};
use crate::grammar::{Grammar, Requirement, Rule, Symbol, SymbolId, Terminal};
use crate::parser::{self, ParseConfig, ParseTree};
use crate::reader::ParserReader;
use hashbrown::{HashMap, HashSet};
use log::trace;
use std::collections::BTreeSet;
use std::fmt;

/// One pending expansion while the table is being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BuildItem {
    symbol: Symbol,
    prev: Option<State>,
    left: Option<State>,
    req: Option<Requirement>,
}

/// A grammar compiled to a table of shift/reduce/accept actions, plus the
/// symbol registry used to resolve named references.
#[derive(Debug)]
pub struct Automaton {
    symbols: HashMap<SymbolId, Symbol>,
    table: HashMap<Option<State>, BTreeSet<Action>>,
    ignore: Vec<Terminal>,
}

impl Automaton {
    /// Compile a grammar. Fails on grammar-definition defects: duplicate
    /// registrations, unresolved references, rules with no parts.
    pub fn build(grammar: &Grammar) -> Result<Self, GrammarError> {
        let mut automaton = Self {
            symbols: HashMap::new(),
            table: HashMap::new(),
            ignore: grammar.ignore().to_vec(),
        };
        for symbol in grammar.symbols() {
            automaton.register(symbol.clone())?;
        }
        automaton.validate()?;

        let root = grammar.root().clone();
        automaton.add_action(
            Some(State::new(None, root.base_id().clone())),
            Action::Accept(Accept::new()),
        );

        let mut queue = vec![BuildItem {
            symbol: root,
            prev: None,
            left: None,
            req: None,
        }];
        let mut executed: HashSet<BuildItem> = HashSet::new();
        while let Some(item) = queue.pop() {
            if executed.insert(item.clone()) {
                automaton.compute_actions(
                    &item.symbol,
                    &item.prev,
                    &item.left,
                    item.req.as_ref(),
                    &mut queue,
                )?;
            }
        }
        Ok(automaton)
    }

    /// Run an input through the table. See [`parser::parse_with`] for the
    /// configurable version.
    pub fn parse(&self, reader: &mut ParserReader) -> Result<ParseTree, ParseError> {
        parser::parse(self, reader)
    }

    /// Run an input through the table with explicit resource caps.
    pub fn parse_with(
        &self,
        reader: &mut ParserReader,
        config: &ParseConfig,
    ) -> Result<ParseTree, ParseError> {
        parser::parse_with(self, reader, config)
    }

    /// The registered symbol for an id, if any.
    #[must_use]
    pub fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// The action set registered for a state key, if any.
    #[must_use]
    pub fn actions(&self, state: &Option<State>) -> Option<&BTreeSet<Action>> {
        self.table.get(state)
    }

    /// Every action applicable to a runtime state: the actions registered
    /// for the chain itself or for any suffix of it, in priority-then-kind
    /// order.
    ///
    /// Rule expansion registers continuations against canonical chains
    /// rooted at the rule's first part, while a reduction mid-derivation
    /// leaves a stack on a context-extended version of such a chain. Every
    /// key a head can legitimately need is a suffix of its chain, and
    /// reductions re-verify the actual stack nodes before applying, so
    /// resolving by suffix is both complete and safe.
    #[must_use]
    pub fn applicable_actions(&self, state: &Option<State>) -> Vec<Action> {
        let Some(chain) = state else {
            return self
                .table
                .get(&None)
                .map(|actions| actions.iter().cloned().collect())
                .unwrap_or_default();
        };

        let mut ids = Vec::new();
        let mut cur = Some(chain);
        while let Some(state) = cur {
            ids.push(state.symbol().clone());
            cur = state.left();
        }
        ids.reverse();

        let mut set = BTreeSet::new();
        for start in 0..ids.len() {
            let mut suffix: Option<State> = None;
            for id in &ids[start..] {
                suffix = Some(State::new(suffix, id.clone()));
            }
            if let Some(actions) = self.table.get(&suffix) {
                set.extend(actions.iter().cloned());
            }
        }
        set.into_iter().collect()
    }

    /// Terminals skipped between significant tokens.
    #[must_use]
    pub fn ignore(&self) -> &[Terminal] {
        &self.ignore
    }

    /// The rules a symbol can produce: a non-terminal's alternatives, a
    /// terminal's trivial self-rule, a reference's target rules, and a
    /// scoped symbol's rules filtered by its requirement.
    pub fn calculate_rules(&self, symbol: &Symbol) -> Result<Vec<Rule>, GrammarError> {
        match symbol {
            Symbol::Terminal(terminal) => Ok(vec![Rule::new(
                terminal.priority().clone(),
                [symbol.clone()],
            )]),
            Symbol::NonTerminal(nt) => Ok(nt.rules().to_vec()),
            Symbol::Sequence(seq) => Ok(seq.rules().to_vec()),
            Symbol::Ref(r) => {
                let target = self.lookup(r.id())?;
                self.calculate_rules(target)
            }
            Symbol::Scoped(scoped) => Ok(self
                .calculate_rules(scoped.inner())?
                .into_iter()
                .filter(|rule| scoped.requirement().check(rule.priority()))
                .collect()),
        }
    }

    fn register(&mut self, symbol: Symbol) -> Result<(), GrammarError> {
        let id = symbol.id().clone();
        match self.symbols.get(&id) {
            None => {
                self.symbols.insert(id, symbol);
                Ok(())
            }
            // A reference adds nothing once anything with the id exists.
            Some(_) if matches!(symbol, Symbol::Ref(_)) => Ok(()),
            // A definition replaces a previously seen reference.
            Some(Symbol::Ref(_)) => {
                self.symbols.insert(id, symbol);
                Ok(())
            }
            Some(_) => Err(GrammarError::DuplicateSymbol { id }),
        }
    }

    /// Check every reference resolves and every rule has parts. Runs over
    /// ids in sorted order so the first error reported is stable.
    fn validate(&self) -> Result<(), GrammarError> {
        let mut ids: Vec<&SymbolId> = self.symbols.keys().collect();
        ids.sort();
        for id in ids {
            let symbol = &self.symbols[id];
            if let Symbol::Ref(r) = symbol {
                return Err(GrammarError::UnresolvedRef { id: r.id().clone() });
            }
            if let Symbol::Scoped(scoped) = symbol {
                self.check_part(scoped.inner())?;
            }
            if let Some(rules) = symbol.rules() {
                for rule in rules.iter() {
                    if rule.is_empty() {
                        return Err(GrammarError::EmptyRule {
                            symbol: symbol.id().clone(),
                        });
                    }
                    for part in rule.parts() {
                        self.check_part(part)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_part(&self, part: &Symbol) -> Result<(), GrammarError> {
        match part {
            Symbol::Ref(r) => self.lookup(r.id()).map(|_| ()),
            Symbol::Scoped(scoped) => self.check_part(scoped.inner()),
            _ => Ok(()),
        }
    }

    fn lookup(&self, id: &SymbolId) -> Result<&Symbol, GrammarError> {
        match self.symbols.get(id) {
            Some(Symbol::Ref(_)) | None => Err(GrammarError::UnresolvedRef { id: id.clone() }),
            Some(symbol) => Ok(symbol),
        }
    }

    /// Expand one worklist item into table actions and further items.
    fn compute_actions(
        &mut self,
        symbol: &Symbol,
        prev: &Option<State>,
        left: &Option<State>,
        req: Option<&Requirement>,
        queue: &mut Vec<BuildItem>,
    ) -> Result<(), GrammarError> {
        match symbol {
            Symbol::Terminal(terminal) => {
                if req.is_none_or(|r| r.check(terminal.priority())) {
                    self.add_action(
                        prev.clone(),
                        Action::Shift(Shift {
                            target: State::new(left.clone(), terminal.id().clone()),
                            terminal: terminal.clone(),
                            priority: terminal.priority().clone(),
                        }),
                    );
                }
                Ok(())
            }
            Symbol::NonTerminal(_) | Symbol::Sequence(_) => {
                let rules = symbol.rules().cloned().unwrap_or_default();
                for rule in rules.iter() {
                    if req.is_none_or(|r| r.check(rule.priority())) {
                        self.rule_actions(symbol, rule, prev, left, queue);
                    }
                }
                Ok(())
            }
            // A reference forwards to its target with the requirement
            // cleared; the reference itself carries none.
            Symbol::Ref(r) => {
                let target = self.lookup(r.id())?.clone();
                self.compute_actions(&target, prev, left, None, queue)
            }
            Symbol::Scoped(scoped) => {
                if req.is_some() {
                    return Err(GrammarError::ConflictingRequirement {
                        id: scoped.id().clone(),
                    });
                }
                let inner = scoped.inner().clone();
                let own_req = scoped.requirement().clone();
                self.compute_actions(&inner, prev, left, Some(&own_req), queue)
            }
        }
    }

    /// Queue every part of a rule for expansion and register its reduce
    /// action. Only the first part is relative to the incoming states;
    /// from the second part on the chains restart from a chain rooted at
    /// the first part, generic for any use of the same rule. That reset
    /// is what lets recursive grammars converge to a finite table, and it
    /// is why action lookups go through [`Automaton::applicable_actions`]:
    /// the runtime reaches context-extended versions of these canonical
    /// chains, which resolve by suffix.
    fn rule_actions(
        &mut self,
        owner: &Symbol,
        rule: &Rule,
        prev: &Option<State>,
        left: &Option<State>,
        queue: &mut Vec<BuildItem>,
    ) {
        let mut part_prefix = left.clone();
        let mut part_prev = prev.clone();
        let mut final_state = left.clone();
        for (i, part) in rule.parts().iter().enumerate() {
            queue.push(BuildItem {
                symbol: part.clone(),
                prev: part_prev.clone(),
                left: part_prefix.clone(),
                req: None,
            });
            final_state = Some(State::new(part_prefix.clone(), part.base_id().clone()));
            if i == 0 {
                let restart = Some(State::new(None, part.base_id().clone()));
                part_prefix = restart.clone();
                part_prev = restart;
            } else {
                part_prefix = Some(State::new(part_prefix, part.base_id().clone()));
                part_prev = Some(State::new(part_prev, part.base_id().clone()));
            }
        }
        self.add_action(
            final_state,
            Action::Reduce(Reduce {
                symbol: owner.clone(),
                parts: rule.parts_arc(),
                priority: rule.priority().clone(),
            }),
        );
    }

    fn add_action(&mut self, state: Option<State>, action: Action) -> bool {
        let line = if log::log_enabled!(log::Level::Trace) {
            match &state {
                Some(state) => Some(format!("add action {state} {action}")),
                None => Some(format!("add action (State:) {action}")),
            }
        } else {
            None
        };
        let added = self.table.entry(state).or_default().insert(action);
        if added {
            if let Some(line) = line {
                trace!("{line}");
            }
        }
        added
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("match input with")?;
        let mut states: Vec<&Option<State>> = self.table.keys().collect();
        states.sort();
        for state in states {
            for action in &self.table[state] {
                match state {
                    Some(state) => write!(f, "\n| {state} {action}")?,
                    None => write!(f, "\n| (State:) {action}")?,
                }
            }
        }
        Ok(())
    }
}
