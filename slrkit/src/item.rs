//! LR(0) items and item-set closure.

use crate::{Grammar, NonTerminalKey, Symbol};
use std::collections::BTreeSet;
use std::fmt::{self, Display};

/// An LR(0) item: a production rule with a cursor marking how much of its
/// body has been matched.
///
/// The rule is identified by its index in the [`Grammar`], so two items are
/// equal exactly when they refer to the same rule at the same cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    /// Index of the production rule in the grammar.
    pub rule: usize,
    /// Number of body symbols already matched, in `0..=len`.
    pub cursor: usize,
}

/// A set of LR(0) items. Ordered, so two sets with the same members compare
/// and iterate identically regardless of how they were built.
pub type ItemSet = BTreeSet<Item>;

impl Item {
    pub const fn new(rule: usize, cursor: usize) -> Self {
        Self { rule, cursor }
    }

    /// `true` once the cursor has passed every body symbol.
    pub fn is_reducible<K, T, N>(&self, grammar: &Grammar<K, T, N>) -> bool
    where
        K: NonTerminalKey,
    {
        self.cursor >= grammar.rule(self.rule).len()
    }

    /// Symbol under the cursor, `None` for a reducible item.
    pub fn next_symbol<'g, K, T, N>(&self, grammar: &'g Grammar<K, T, N>) -> Option<&'g Symbol<K, T>>
    where
        K: NonTerminalKey,
    {
        grammar.rule(self.rule).symbol_at(self.cursor)
    }

    /// Same item with the cursor moved one symbol to the right.
    pub fn advanced(&self) -> Self {
        Self {
            rule: self.rule,
            cursor: self.cursor + 1,
        }
    }

    /// Renders the item as `Key → a · b` against `grammar`.
    pub fn display<'g, K, T, N>(&self, grammar: &'g Grammar<K, T, N>) -> ItemDisplay<'g, K, T, N> {
        ItemDisplay {
            item: *self,
            grammar,
        }
    }
}

/// Adaptor returned by [`Item::display`].
pub struct ItemDisplay<'g, K, T, N> {
    item: Item,
    grammar: &'g Grammar<K, T, N>,
}

impl<K, T, N> Display for ItemDisplay<'_, K, T, N>
where
    K: NonTerminalKey,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.grammar.rule(self.item.rule);
        write!(f, "{} →", rule.key())?;
        let body = &rule.symbols()[..rule.len().min(rule.symbols().len())];
        for (i, symbol) in body.iter().enumerate() {
            if i == self.item.cursor {
                f.write_str(" ·")?;
            }
            write!(f, " {}", symbol)?;
        }
        if self.item.cursor >= body.len() {
            f.write_str(" ·")?;
        }
        Ok(())
    }
}

/// Zero-cursor items of every rule keyed by `key`.
pub fn start_items<K, T, N>(grammar: &Grammar<K, T, N>, key: &K) -> ItemSet
where
    K: NonTerminalKey,
{
    grammar
        .rules_for(key)
        .iter()
        .map(|&rule| Item::new(rule, 0))
        .collect()
}

/// Computes the closure of `items`.
///
/// For every item whose cursor sits before a nonterminal `n`, a zero-cursor
/// item is added for each rule keyed by `n`, until nothing new is added.
/// Each item is expanded at most once.
pub fn closure<K, T, N>(grammar: &Grammar<K, T, N>, items: &ItemSet) -> ItemSet
where
    K: NonTerminalKey,
{
    let mut closed = items.clone();
    let mut pending: Vec<Item> = items.iter().copied().collect();
    while let Some(item) = pending.pop() {
        let Some(Symbol::NonTerminal(key)) = item.next_symbol(grammar) else {
            continue;
        };
        for &rule in grammar.rules_for(key) {
            let fresh = Item::new(rule, 0);
            if closed.insert(fresh) {
                pending.push(fresh);
            }
        }
    }
    closed
}

/// Advances every item of `items` whose cursor sits before `symbol`, then
/// closes the result. Empty when no item expects `symbol`.
pub fn advance<K, T, N>(grammar: &Grammar<K, T, N>, items: &ItemSet, symbol: &Symbol<K, T>) -> ItemSet
where
    K: NonTerminalKey,
{
    let kernel: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Item::advanced)
        .collect();
    if kernel.is_empty() {
        return kernel;
    }
    closure(grammar, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProductionRule;
    use crate::test_support::{TestGrammar, TestRule, nt, term};

    fn loop_grammar() -> TestGrammar {
        let a = term("a");
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("A"), nt("B")]),
            ProductionRule::new("A", "A", vec![nt("S")]),
            ProductionRule::new("A", "A", vec![nt("C")]),
            ProductionRule::new("B", "B", vec![nt("A")]),
            ProductionRule::new("C", "C", vec![nt("S")]),
            ProductionRule::new("C", "C", vec![a.into()]),
        ];
        Grammar::new(rules).unwrap()
    }

    #[test]
    fn closure_adds_every_reachable_rule() {
        let g = loop_grammar();
        let seed = ItemSet::from([Item::new(0, 1)]);
        let closed = closure(&g, &seed);
        assert_eq!(closed.len(), 7);
        assert!(closed.contains(&Item::new(0, 1)));
        assert!(closed.contains(&Item::new(0, 0)));
        for rule in 1..6 {
            assert!(closed.contains(&Item::new(rule, 0)), "missing rule {}", rule);
        }
    }

    #[test]
    fn closure_is_idempotent() {
        let g = loop_grammar();
        let once = closure(&g, &ItemSet::from([Item::new(0, 1)]));
        let twice = closure(&g, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn advance_moves_cursor_and_closes() {
        let g = loop_grammar();
        let start = closure(&g, &start_items(&g, &"S"));
        let after_a = advance(&g, &start, &nt("A"));
        assert!(after_a.contains(&Item::new(0, 1)));
        assert!(after_a.contains(&Item::new(3, 0)));
        assert!(advance(&g, &start, &nt("B")).is_empty());
    }

    #[test]
    fn display_places_cursor() {
        let g = loop_grammar();
        let item = Item::new(0, 0);
        assert_eq!(item.display(&g).to_string(), "S → · A B");
        let mut end = item;
        for _ in 0..g.rule(0).len() {
            end = end.advanced();
        }
        assert!(end.is_reducible(&g));
        assert_eq!(end.display(&g).to_string(), "S → A B ·");
    }

    #[test]
    fn epsilon_item_is_reducible_at_zero() {
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("E")]),
            ProductionRule::epsilon("E", "E"),
        ];
        let g = Grammar::new(rules).unwrap();
        let item = Item::new(1, 0);
        assert!(item.is_reducible(&g));
        assert_eq!(item.display(&g).to_string(), "E → ·");
    }
}
