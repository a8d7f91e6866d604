//! Grammar model: terminals, symbols, production rules and the rule
//! dictionary.
//!
//! Everything in this module is immutable once built. Rules are identified
//! by their index in the [`Grammar`]; terminals by a process-unique id
//! assigned at construction, so two terminals with identical predicates are
//! still distinct grammar symbols.

use crate::{GrammarError, SyntaxNode};
use indexmap::IndexMap;
use smartstring::alias::String;
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Bounds required of a nonterminal key.
///
/// Keys are compared by value; an enum or an interned string is typical.
pub trait NonTerminalKey: Clone + Eq + Ord + Hash + Debug + Display {}

impl<K> NonTerminalKey for K where K: Clone + Eq + Ord + Hash + Debug + Display {}

/// Operator associativity used to break precedence ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Assoc {
    #[default]
    Left,
    Right,
}

static NEXT_TERMINAL_ID: AtomicUsize = AtomicUsize::new(0);

type Matcher<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A terminal symbol: a named predicate over tokens.
pub struct Terminal<T> {
    id: usize,
    name: String,
    precedence: i32,
    assoc: Assoc,
    matcher: Matcher<T>,
}

impl<T> Terminal<T> {
    /// Creates a terminal with precedence 0 and left associativity.
    pub fn new<F>(name: &str, matcher: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            id: NEXT_TERMINAL_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into(),
            precedence: 0,
            assoc: Assoc::Left,
            matcher: Arc::new(matcher),
        }
    }

    /// Sets the precedence a shift on this terminal competes with.
    pub fn with_precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    /// Sets the associativity used when precedences tie.
    pub fn with_assoc(mut self, assoc: Assoc) -> Self {
        self.assoc = assoc;
        self
    }

    /// Process-unique id; orders terminals by creation.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name used in diagnostics and table dumps.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn assoc(&self) -> Assoc {
        self.assoc
    }

    /// Runs the terminal's predicate against `token`.
    #[inline]
    pub fn matches(&self, token: &T) -> bool {
        (self.matcher)(token)
    }
}

impl<T> Clone for Terminal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            precedence: self.precedence,
            assoc: self.assoc,
            matcher: Arc::clone(&self.matcher),
        }
    }
}

impl<T> PartialEq for Terminal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Terminal<T> {}

impl<T> PartialOrd for Terminal<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Terminal<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Hash for Terminal<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Debug for Terminal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .field("assoc", &self.assoc)
            .finish()
    }
}

impl<T> Display for Terminal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One symbol of a rule body.
pub enum Symbol<K, T> {
    Terminal(Terminal<T>),
    NonTerminal(K),
    /// The empty production. Only meaningful as the sole symbol of a rule;
    /// anywhere else the table builder rejects it once an item's cursor
    /// reaches it.
    Epsilon,
}

impl<K, T> Symbol<K, T> {
    fn rank(&self) -> u8 {
        match self {
            Symbol::Terminal(_) => 0,
            Symbol::NonTerminal(_) => 1,
            Symbol::Epsilon => 2,
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal<T>> {
        match self {
            Symbol::Terminal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_nonterminal(&self) -> Option<&K> {
        match self {
            Symbol::NonTerminal(k) => Some(k),
            _ => None,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl<K: Clone, T> Clone for Symbol<K, T> {
    fn clone(&self) -> Self {
        match self {
            Symbol::Terminal(t) => Symbol::Terminal(t.clone()),
            Symbol::NonTerminal(k) => Symbol::NonTerminal(k.clone()),
            Symbol::Epsilon => Symbol::Epsilon,
        }
    }
}

impl<K: PartialEq, T> PartialEq for Symbol<K, T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Symbol::Terminal(a), Symbol::Terminal(b)) => a == b,
            (Symbol::NonTerminal(a), Symbol::NonTerminal(b)) => a == b,
            (Symbol::Epsilon, Symbol::Epsilon) => true,
            _ => false,
        }
    }
}

impl<K: Eq, T> Eq for Symbol<K, T> {}

impl<K: Ord, T> PartialOrd for Symbol<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, T> Ord for Symbol<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Symbol::Terminal(a), Symbol::Terminal(b)) => a.cmp(b),
            (Symbol::NonTerminal(a), Symbol::NonTerminal(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl<K: Hash, T> Hash for Symbol<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Symbol::Terminal(t) => t.hash(state),
            Symbol::NonTerminal(k) => k.hash(state),
            Symbol::Epsilon => {}
        }
    }
}

impl<K: Debug, T> Debug for Symbol<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "Terminal({})", t.name),
            Symbol::NonTerminal(k) => write!(f, "NonTerminal({:?})", k),
            Symbol::Epsilon => f.write_str("Epsilon"),
        }
    }
}

impl<K: Display, T> Display for Symbol<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => f.write_str(&t.name),
            Symbol::NonTerminal(k) => write!(f, "{}", k),
            Symbol::Epsilon => f.write_str("ε"),
        }
    }
}

impl<K, T> From<Terminal<T>> for Symbol<K, T> {
    fn from(t: Terminal<T>) -> Self {
        Symbol::Terminal(t)
    }
}

impl<K, T> From<&Terminal<T>> for Symbol<K, T> {
    fn from(t: &Terminal<T>) -> Self {
        Symbol::Terminal(t.clone())
    }
}

/// Builds the node for a completed rule from its children, in order.
pub type Produce<T, N> = Arc<dyn Fn(Vec<SyntaxNode<T, N>>) -> SyntaxNode<T, N> + Send + Sync>;

/// A production rule `key → symbols`.
pub struct ProductionRule<K, T, N> {
    key: K,
    left_type: N,
    symbols: Vec<Symbol<K, T>>,
    len: usize,
    produce: Produce<T, N>,
}

impl<K, T, N> ProductionRule<K, T, N>
where
    T: 'static,
    N: Clone + Send + Sync + 'static,
{
    /// Creates a rule whose node is a branch of kind `left_type` holding the
    /// matched children. An empty `symbols` list, or `[Symbol::Epsilon]`,
    /// makes the rule nullable.
    pub fn new(key: K, left_type: N, symbols: Vec<Symbol<K, T>>) -> Self {
        let len = symbols.iter().filter(|s| !s.is_epsilon()).count();
        let kind = left_type.clone();
        Self {
            key,
            left_type,
            symbols,
            len,
            produce: Arc::new(move |children| SyntaxNode::branch(kind.clone(), children)),
        }
    }

    /// Shorthand for `key → ε`.
    pub fn epsilon(key: K, left_type: N) -> Self {
        Self::new(key, left_type, vec![Symbol::Epsilon])
    }
}

impl<K, T, N> ProductionRule<K, T, N> {
    /// Replaces the node factory.
    pub fn with_produce<F>(mut self, produce: F) -> Self
    where
        F: Fn(Vec<SyntaxNode<T, N>>) -> SyntaxNode<T, N> + Send + Sync + 'static,
    {
        self.produce = Arc::new(produce);
        self
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn left_type(&self) -> &N {
        &self.left_type
    }

    pub fn symbols(&self) -> &[Symbol<K, T>] {
        &self.symbols
    }

    /// Number of non-epsilon symbols; the number of nodes a reduction pops.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Symbol under a cursor, or `None` once the rule is fully matched.
    pub fn symbol_at(&self, cursor: usize) -> Option<&Symbol<K, T>> {
        if cursor < self.len {
            self.symbols.get(cursor)
        } else {
            None
        }
    }

    pub fn produce(&self, children: Vec<SyntaxNode<T, N>>) -> SyntaxNode<T, N> {
        (self.produce)(children)
    }
}

impl<K: Clone, T, N: Clone> Clone for ProductionRule<K, T, N> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            left_type: self.left_type.clone(),
            symbols: self.symbols.clone(),
            len: self.len,
            produce: Arc::clone(&self.produce),
        }
    }
}

impl<K: Display, T, N> Display for ProductionRule<K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.key)?;
        if self.len == 0 {
            return f.write_str(" ε");
        }
        for symbol in &self.symbols {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

impl<K: Debug, T, N: Debug> Debug for ProductionRule<K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductionRule")
            .field("key", &self.key)
            .field("left_type", &self.left_type)
            .field("symbols", &self.symbols)
            .finish()
    }
}

/// An augmented grammar: the ordered rule list and its dictionary by key.
///
/// Rule 0 is conventionally the start production.
pub struct Grammar<K, T, N> {
    rules: Vec<ProductionRule<K, T, N>>,
    by_key: IndexMap<K, Vec<usize>>,
}

impl<K, T, N> Grammar<K, T, N>
where
    K: NonTerminalKey,
{
    /// Validates `rules` and indexes them by key.
    pub fn new(rules: Vec<ProductionRule<K, T, N>>) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        let mut by_key: IndexMap<K, Vec<usize>> = IndexMap::new();
        for (i, rule) in rules.iter().enumerate() {
            by_key.entry(rule.key.clone()).or_default().push(i);
        }
        for rule in &rules {
            for symbol in &rule.symbols {
                if let Symbol::NonTerminal(k) = symbol {
                    if !by_key.contains_key(k) {
                        return Err(GrammarError::UndefinedNonTerminal {
                            key: k.to_string().into(),
                            rule: rule.to_string().into(),
                        });
                    }
                }
            }
        }
        log::debug!(
            "grammar: {} rules over {} nonterminals",
            rules.len(),
            by_key.len()
        );
        Ok(Self { rules, by_key })
    }

    pub fn rules(&self) -> &[ProductionRule<K, T, N>] {
        &self.rules
    }

    /// Rule by index. Panics if `index` is out of range.
    pub fn rule(&self, index: usize) -> &ProductionRule<K, T, N> {
        &self.rules[index]
    }

    /// Indices of the rules defining `key`, in declaration order.
    pub fn rules_for(&self, key: &K) -> &[usize] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nonterminal keys in order of first definition.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_key.keys()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }
}

impl<K: Debug, T, N: Debug> Debug for Grammar<K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar").field("rules", &self.rules).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestRule, TestToken, nt, term};

    #[test]
    fn terminals_compare_by_identity() {
        let a = term("a");
        let a2 = term("a");
        assert_ne!(a, a2);
        assert_eq!(a, a.clone());
        assert!(a.matches(&TestToken::new("a", 0, 0)));
        assert!(!a.matches(&TestToken::new("b", 0, 0)));
    }

    #[test]
    fn terminal_builder_sets_precedence() {
        let caret = term("^").with_precedence(2).with_assoc(Assoc::Right);
        assert_eq!(caret.precedence(), 2);
        assert_eq!(caret.assoc(), Assoc::Right);
        assert_eq!(term("+").assoc(), Assoc::Left);
    }

    #[test]
    fn epsilon_rule_has_zero_length() {
        let rule: TestRule = ProductionRule::epsilon("B", "B");
        assert_eq!(rule.len(), 0);
        assert!(rule.is_empty());
        assert!(rule.symbol_at(0).is_none());
        assert_eq!(rule.to_string(), "B → ε");
    }

    #[test]
    fn default_produce_builds_branch() {
        let a = term("a");
        let rule: TestRule = ProductionRule::new("A", "A", vec![a.into()]);
        let node = rule.produce(vec![SyntaxNode::leaf(TestToken::new("a", 0, 0))]);
        assert_eq!(node.kind(), Some(&"A"));
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn undefined_nonterminal_is_rejected() {
        let rules: Vec<TestRule> = vec![ProductionRule::new("S", "S", vec![nt("X")])];
        let err = Grammar::new(rules).unwrap_err();
        assert!(matches!(err, GrammarError::UndefinedNonTerminal { .. }));
    }

    #[test]
    fn empty_grammar_is_rejected() {
        let rules: Vec<TestRule> = Vec::new();
        assert_eq!(Grammar::new(rules).unwrap_err(), GrammarError::Empty);
    }

    #[test]
    fn rules_are_indexed_by_key() {
        let a = term("a");
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("A")]),
            ProductionRule::new("A", "A", vec![a.clone().into()]),
            ProductionRule::new("A", "A", vec![a.into(), nt("A")]),
        ];
        let g = Grammar::new(rules).unwrap();
        assert_eq!(g.rules_for(&"A"), &[1, 2]);
        assert_eq!(g.rules_for(&"Z"), &[] as &[usize]);
        assert_eq!(g.keys().copied().collect::<Vec<_>>(), vec!["S", "A"]);
        assert_eq!(g.rule(2).to_string(), "A → a A");
    }
}
