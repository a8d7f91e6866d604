//! SLR(1) table construction.
//!
//! [`TableBuilder`] computes FIRST/FOLLOW sets, then explores the canonical
//! collection of LR(0) item sets breadth-first from the start state. Each
//! item set becomes exactly one [`AnalyzerState`] (states are memoized by
//! item-set identity), and each state's shift, reduce and goto entries are
//! filled in once, when the state is taken off the worklist.
//!
//! Shift/reduce conflicts are settled by operator precedence. Every state
//! carries the precedence context it was entered with: a shift target takes
//! the precedence and associativity of the shifted terminal, a goto target
//! inherits the context of its source state, and the start state begins at
//! precedence 0, left-associative. On a conflict the shift wins if the
//! terminal binds tighter than the context, or equally tight and
//! right-associative; otherwise the reduce wins.
//!
//! Reduce/reduce conflicts are fatal.

use crate::item::{advance, closure, start_items};
use crate::sets::{SymbolSet, SymbolSets};
use crate::{Assoc, Grammar, GrammarError, Item, ItemSet, NonTerminalKey, Symbol, SyntaxNode, Terminal};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// Index of a state in its [`Table`]. State 0 is the start state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateId(pub usize);

impl Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> usize {
        id.0
    }
}

/// Entry of a state's action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Consume the token and enter the state.
    Shift(StateId),
    /// Reduce by the rule with this index.
    Reduce(usize),
}

/// Precedence and associativity a state was entered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PrecedenceContext {
    pub precedence: i32,
    pub assoc: Assoc,
}

impl PrecedenceContext {
    fn of<T>(terminal: &Terminal<T>) -> Self {
        Self {
            precedence: terminal.precedence(),
            assoc: terminal.assoc(),
        }
    }

    /// Whether a shift on `terminal` beats a reduce under this context.
    pub fn prefers_shift<T>(&self, terminal: &Terminal<T>) -> bool {
        terminal.precedence() > self.precedence
            || (terminal.precedence() == self.precedence && terminal.assoc() == Assoc::Right)
    }
}

impl Display for PrecedenceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.precedence, self.assoc)
    }
}

/// A memoized state reached again with a different precedence context. The
/// first context stays in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMismatch {
    pub state: StateId,
    pub first: PrecedenceContext,
    pub second: PrecedenceContext,
}

/// One state of the automaton.
pub struct AnalyzerState<K, T> {
    id: StateId,
    items: ItemSet,
    context: PrecedenceContext,
    actions: BTreeMap<Terminal<T>, Action>,
    gotos: BTreeMap<K, StateId>,
    reducible: Vec<usize>,
    resolved_conflicts: usize,
}

impl<K, T> AnalyzerState<K, T>
where
    K: NonTerminalKey,
{
    fn new(id: StateId, items: ItemSet, context: PrecedenceContext) -> Self {
        Self {
            id,
            items,
            context,
            actions: BTreeMap::new(),
            gotos: BTreeMap::new(),
            reducible: Vec::new(),
            resolved_conflicts: 0,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    /// The closed item set defining this state.
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn context(&self) -> PrecedenceContext {
        self.context
    }

    /// Action entries ordered by terminal creation order.
    pub fn actions(&self) -> impl Iterator<Item = (&Terminal<T>, &Action)> {
        self.actions.iter()
    }

    pub fn action(&self, terminal: &Terminal<T>) -> Option<Action> {
        self.actions.get(terminal).copied()
    }

    /// First action whose terminal matches `token`.
    pub fn action_for(&self, token: &T) -> Option<(&Terminal<T>, Action)> {
        self.actions
            .iter()
            .find(|(terminal, _)| terminal.matches(token))
            .map(|(terminal, action)| (terminal, *action))
    }

    pub fn gotos(&self) -> impl Iterator<Item = (&K, StateId)> {
        self.gotos.iter().map(|(k, s)| (k, *s))
    }

    pub fn goto(&self, key: &K) -> Option<StateId> {
        self.gotos.get(key).copied()
    }

    /// Rules of the reducible items of this state, in item order.
    pub fn reducible(&self) -> &[usize] {
        &self.reducible
    }

    /// Names of the terminals this state has an action for.
    pub fn expected(&self) -> Vec<&str> {
        self.actions.keys().map(Terminal::name).collect()
    }

    /// Number of shift/reduce conflicts settled by precedence here.
    pub fn resolved_conflicts(&self) -> usize {
        self.resolved_conflicts
    }
}

/// Factory for the placeholder node substituted during error recovery.
pub type Placeholder<T, N> = Arc<dyn Fn() -> SyntaxNode<T, N> + Send + Sync>;

/// Configures and runs table construction.
pub struct TableBuilder<K, T, N> {
    grammar: Grammar<K, T, N>,
    recovery: IndexMap<K, Placeholder<T, N>>,
}

impl<K, T, N> TableBuilder<K, T, N>
where
    K: NonTerminalKey,
{
    pub fn new(grammar: Grammar<K, T, N>) -> Self {
        Self {
            grammar,
            recovery: IndexMap::new(),
        }
    }

    /// Registers `key` as a recovery point. During panic-mode recovery the
    /// driver substitutes the node built by `placeholder` for the missing
    /// `key`.
    pub fn recover_with<F>(mut self, key: K, placeholder: F) -> Self
    where
        F: Fn() -> SyntaxNode<T, N> + Send + Sync + 'static,
    {
        self.recovery.insert(key, Arc::new(placeholder));
        self
    }

    /// Builds the table whose start state is the closure of the rules keyed
    /// by `start`.
    pub fn build(self, start: K) -> Result<Table<K, T, N>, GrammarError> {
        let Self { grammar, recovery } = self;
        if !grammar.contains_key(&start) {
            return Err(GrammarError::UnknownStart {
                key: start.to_string().into(),
            });
        }
        if let Some(key) = recovery.keys().find(|k| !grammar.contains_key(k)) {
            return Err(GrammarError::UnknownRecoveryKey {
                key: key.to_string().into(),
            });
        }

        let sets = SymbolSets::compute(&grammar);
        let mut builder = StateBuilder {
            grammar: &grammar,
            sets: &sets,
            states: Vec::new(),
            index: BTreeMap::new(),
            queue: VecDeque::new(),
            mismatches: Vec::new(),
        };
        let seed = closure(&grammar, &start_items(&grammar, &start));
        builder.intern(seed, PrecedenceContext::default());
        while let Some(id) = builder.queue.pop_front() {
            builder.fill(id)?;
        }
        let StateBuilder {
            states,
            index,
            mismatches,
            ..
        } = builder;

        for m in &mismatches {
            if states[m.state.0].resolved_conflicts > 0 {
                log::warn!(
                    "state {} reached with precedence {} after {}; conflicts were resolved under {}",
                    m.state,
                    m.second,
                    m.first,
                    m.first
                );
            } else {
                log::debug!(
                    "state {} reached with precedence {} after {}",
                    m.state,
                    m.second,
                    m.first
                );
            }
        }
        log::debug!(
            "table for {}: {} states, {} recovery keys",
            start,
            states.len(),
            recovery.len()
        );

        Ok(Table {
            grammar,
            sets,
            states,
            index,
            start,
            recovery,
            mismatches,
        })
    }
}

struct StateBuilder<'g, K, T, N> {
    grammar: &'g Grammar<K, T, N>,
    sets: &'g SymbolSets<K, T>,
    states: Vec<AnalyzerState<K, T>>,
    index: BTreeMap<ItemSet, StateId>,
    queue: VecDeque<StateId>,
    mismatches: Vec<ContextMismatch>,
}

impl<K, T, N> StateBuilder<'_, K, T, N>
where
    K: NonTerminalKey,
{
    /// Returns the state for `items`, creating and queueing it if new.
    fn intern(&mut self, items: ItemSet, context: PrecedenceContext) -> StateId {
        if let Some(&id) = self.index.get(&items) {
            let first = self.states[id.0].context;
            if first != context
                && !self
                    .mismatches
                    .iter()
                    .any(|m| m.state == id && m.second == context)
            {
                self.mismatches.push(ContextMismatch {
                    state: id,
                    first,
                    second: context,
                });
            }
            return id;
        }
        let id = StateId(self.states.len());
        self.index.insert(items.clone(), id);
        self.states.push(AnalyzerState::new(id, items, context));
        self.queue.push_back(id);
        id
    }

    /// Fills in the actions and gotos of state `id`.
    fn fill(&mut self, id: StateId) -> Result<(), GrammarError> {
        let items = self.states[id.0].items.clone();
        let context = self.states[id.0].context;

        let mut shift_on: BTreeSet<Terminal<T>> = BTreeSet::new();
        let mut goto_on: BTreeSet<K> = BTreeSet::new();
        let mut reducible: Vec<Item> = Vec::new();
        for item in &items {
            match item.next_symbol(self.grammar) {
                None => reducible.push(*item),
                Some(Symbol::Terminal(t)) => {
                    shift_on.insert(t.clone());
                }
                Some(Symbol::NonTerminal(k)) => {
                    goto_on.insert(k.clone());
                }
                Some(Symbol::Epsilon) => {
                    return Err(GrammarError::UnexpectedSymbol {
                        rule: self.grammar.rule(item.rule).to_string().into(),
                        position: item.cursor,
                    });
                }
            }
        }

        let mut reductions: BTreeMap<Terminal<T>, usize> = BTreeMap::new();
        for item in &reducible {
            let rule = self.grammar.rule(item.rule);
            let empty = SymbolSet::new();
            let follow = self.sets.follow(rule.key()).unwrap_or(&empty);
            for terminal in follow.iter().filter_map(Symbol::as_terminal) {
                match reductions.get(terminal) {
                    Some(&other) if other != item.rule => {
                        return Err(GrammarError::ReduceReduce {
                            state: id.0,
                            terminal: terminal.name().into(),
                            first: self.grammar.rule(other).to_string().into(),
                            second: rule.to_string().into(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        reductions.insert(terminal.clone(), item.rule);
                    }
                }
            }
        }

        // Shift targets are only interned once the shift survives resolution.
        let mut actions: BTreeMap<Terminal<T>, Action> = BTreeMap::new();
        let mut resolved = 0;
        for terminal in shift_on {
            if let Some(&rule) = reductions.get(&terminal) {
                resolved += 1;
                if !context.prefers_shift(&terminal) {
                    log::debug!(
                        "state {}: shift/reduce on {} resolved as reduce `{}` (context {})",
                        id,
                        terminal,
                        self.grammar.rule(rule),
                        context
                    );
                    continue;
                }
                reductions.remove(&terminal);
                log::debug!(
                    "state {}: shift/reduce on {} resolved as shift (context {})",
                    id,
                    terminal,
                    context
                );
            }
            let target = advance(self.grammar, &items, &Symbol::Terminal(terminal.clone()));
            let to = self.intern(target, PrecedenceContext::of(&terminal));
            actions.insert(terminal, Action::Shift(to));
        }
        for (terminal, rule) in reductions {
            actions.insert(terminal, Action::Reduce(rule));
        }

        let mut gotos: BTreeMap<K, StateId> = BTreeMap::new();
        for key in goto_on {
            let target = advance(self.grammar, &items, &Symbol::NonTerminal(key.clone()));
            let to = self.intern(target, context);
            gotos.insert(key, to);
        }

        log::trace!(
            "state {}: {} items, {} actions, {} gotos, context {}",
            id,
            items.len(),
            actions.len(),
            gotos.len(),
            context
        );

        let state = &mut self.states[id.0];
        state.actions = actions;
        state.gotos = gotos;
        state.reducible = reducible.iter().map(|item| item.rule).collect();
        state.resolved_conflicts = resolved;
        Ok(())
    }
}

/// An immutable SLR(1) parse table.
///
/// A `Table` is never modified after [`TableBuilder::build`] returns, so
/// one table can serve any number of concurrent parses.
pub struct Table<K, T, N> {
    grammar: Grammar<K, T, N>,
    sets: SymbolSets<K, T>,
    states: Vec<AnalyzerState<K, T>>,
    index: BTreeMap<ItemSet, StateId>,
    start: K,
    recovery: IndexMap<K, Placeholder<T, N>>,
    mismatches: Vec<ContextMismatch>,
}

impl<K, T, N> Table<K, T, N>
where
    K: NonTerminalKey,
{
    pub fn grammar(&self) -> &Grammar<K, T, N> {
        &self.grammar
    }

    pub fn sets(&self) -> &SymbolSets<K, T> {
        &self.sets
    }

    pub fn states(&self) -> &[AnalyzerState<K, T>] {
        &self.states
    }

    /// State by id. Panics if `id` does not belong to this table.
    pub fn state(&self, id: StateId) -> &AnalyzerState<K, T> {
        &self.states[id.0]
    }

    pub fn start_state(&self) -> StateId {
        StateId(0)
    }

    pub fn start_key(&self) -> &K {
        &self.start
    }

    /// State defined by exactly `items`, if any.
    pub fn state_for(&self, items: &ItemSet) -> Option<StateId> {
        self.index.get(items).copied()
    }

    pub fn follow(&self, key: &K) -> Option<&SymbolSet<K, T>> {
        self.sets.follow(key)
    }

    /// Recovery keys in registration order.
    pub fn recovery_keys(&self) -> impl Iterator<Item = &K> {
        self.recovery.keys()
    }

    pub fn is_recoverable(&self, key: &K) -> bool {
        self.recovery.contains_key(key)
    }

    /// Builds a fresh placeholder node for `key`.
    pub fn placeholder(&self, key: &K) -> Option<SyntaxNode<T, N>> {
        self.recovery.get(key).map(|factory| factory())
    }

    /// Memoized states that were reached with more than one precedence
    /// context.
    pub fn context_mismatches(&self) -> &[ContextMismatch] {
        &self.mismatches
    }

    /// Key of the first rule producing nodes of `kind`.
    pub fn kind_key(&self, kind: &N) -> Option<&K>
    where
        N: PartialEq,
    {
        self.grammar
            .rules()
            .iter()
            .find(|rule| rule.left_type() == kind)
            .map(|rule| rule.key())
    }
}

impl<K: NonTerminalKey, T, N> Debug for Table<K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("start", &self.start)
            .field("rules", &self.grammar.rules().len())
            .field("states", &self.states.len())
            .finish()
    }
}
