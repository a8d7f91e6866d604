//! FIRST and FOLLOW set computation.
//!
//! Both sets are computed by fixed-point iteration: a full pass over all
//! rules is repeated until no set grows. Sets are bounded by the finite
//! terminal alphabet and only ever grow, so the iteration terminates.
//!
//! No end-of-input marker is added to any FOLLOW set; the driver treats
//! end of input as a special case.

use crate::{Grammar, NonTerminalKey, Symbol};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// A set of terminals, possibly containing [`Symbol::Epsilon`].
pub type SymbolSet<K, T> = BTreeSet<Symbol<K, T>>;

/// FIRST and FOLLOW sets of every nonterminal of a grammar.
pub struct SymbolSets<K, T> {
    first: IndexMap<K, SymbolSet<K, T>>,
    follow: IndexMap<K, SymbolSet<K, T>>,
}

impl<K, T> SymbolSets<K, T>
where
    K: NonTerminalKey,
{
    pub fn compute<N>(grammar: &Grammar<K, T, N>) -> Self {
        let first = first_sets(grammar);
        let follow = follow_sets(grammar, &first);
        Self { first, follow }
    }

    /// FIRST set of `key`; `None` for an unknown key.
    pub fn first(&self, key: &K) -> Option<&SymbolSet<K, T>> {
        self.first.get(key)
    }

    /// FOLLOW set of `key`; never contains epsilon.
    pub fn follow(&self, key: &K) -> Option<&SymbolSet<K, T>> {
        self.follow.get(key)
    }

    pub fn is_nullable(&self, key: &K) -> bool {
        self.first
            .get(key)
            .is_some_and(|set| set.contains(&Symbol::Epsilon))
    }

    pub fn first_sets(&self) -> &IndexMap<K, SymbolSet<K, T>> {
        &self.first
    }

    pub fn follow_sets(&self) -> &IndexMap<K, SymbolSet<K, T>> {
        &self.follow
    }
}

/// Inserts every non-epsilon member of `src` into `dst`.
///
/// Returns `true` if `dst` grew.
fn absorb<K: NonTerminalKey, T>(dst: &mut SymbolSet<K, T>, src: &SymbolSet<K, T>) -> bool {
    let mut changed = false;
    for sym in src {
        if !sym.is_epsilon() && !dst.contains(sym) {
            dst.insert(sym.clone());
            changed = true;
        }
    }
    changed
}

/// Computes FIRST sets for all nonterminals.
///
/// For each rule `A → X1 .. Xn` the body is scanned left to right: a
/// terminal contributes itself and stops the scan; a nonterminal
/// contributes its FIRST set without epsilon and lets the scan continue
/// only if it is nullable. A rule whose scan runs off the end (including an
/// empty or epsilon-only rule) makes `A` nullable.
pub fn first_sets<K, T, N>(grammar: &Grammar<K, T, N>) -> IndexMap<K, SymbolSet<K, T>>
where
    K: NonTerminalKey,
{
    let mut first: IndexMap<K, SymbolSet<K, T>> = grammar
        .keys()
        .map(|k| (k.clone(), BTreeSet::new()))
        .collect();
    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        for rule in grammar.rules() {
            let mut acc = SymbolSet::new();
            let mut nullable = true;
            for sym in rule.symbols() {
                match sym {
                    Symbol::Terminal(_) => {
                        acc.insert(sym.clone());
                        nullable = false;
                        break;
                    }
                    Symbol::NonTerminal(k) => {
                        let Some(set) = first.get(k) else {
                            nullable = false;
                            break;
                        };
                        absorb(&mut acc, set);
                        if !set.contains(&Symbol::Epsilon) {
                            nullable = false;
                            break;
                        }
                    }
                    Symbol::Epsilon => {}
                }
            }
            if nullable {
                acc.insert(Symbol::Epsilon);
            }
            if let Some(target) = first.get_mut(rule.key()) {
                for sym in acc {
                    changed |= target.insert(sym);
                }
            }
        }
    }
    log::debug!("FIRST sets converged after {} passes", passes);
    first
}

/// Computes FOLLOW sets for all nonterminals from precomputed FIRST sets.
///
/// For every occurrence of a nonterminal `B` in `A → α B β`, FIRST(β)
/// without epsilon is added to FOLLOW(B); if β is nullable (or empty),
/// FOLLOW(A) is added as well.
pub fn follow_sets<K, T, N>(
    grammar: &Grammar<K, T, N>,
    first: &IndexMap<K, SymbolSet<K, T>>,
) -> IndexMap<K, SymbolSet<K, T>>
where
    K: NonTerminalKey,
{
    let mut follow: IndexMap<K, SymbolSet<K, T>> = first
        .keys()
        .map(|k| (k.clone(), BTreeSet::new()))
        .collect();
    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;
        for rule in grammar.rules() {
            let body = rule.symbols();
            for (i, sym) in body.iter().enumerate() {
                let Symbol::NonTerminal(b) = sym else {
                    continue;
                };
                let mut acc = SymbolSet::new();
                let mut beta_nullable = true;
                for next in &body[i + 1..] {
                    match next {
                        Symbol::Terminal(_) => {
                            acc.insert(next.clone());
                            beta_nullable = false;
                            break;
                        }
                        Symbol::NonTerminal(k) => {
                            let Some(set) = first.get(k) else {
                                beta_nullable = false;
                                break;
                            };
                            absorb(&mut acc, set);
                            if !set.contains(&Symbol::Epsilon) {
                                beta_nullable = false;
                                break;
                            }
                        }
                        Symbol::Epsilon => {}
                    }
                }
                if beta_nullable {
                    if let Some(lhs) = follow.get(rule.key()) {
                        let lhs = lhs.clone();
                        absorb(&mut acc, &lhs);
                    }
                }
                if let Some(target) = follow.get_mut(b) {
                    changed |= absorb(target, &acc);
                }
            }
        }
    }
    log::debug!("FOLLOW sets converged after {} passes", passes);
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestGrammar, TestRule, TestToken, init_logger, nt, term};
    use crate::{ProductionRule, Terminal};

    fn set(items: &[&Terminal<TestToken>], epsilon: bool) -> SymbolSet<&'static str, TestToken> {
        let mut s: SymbolSet<&'static str, TestToken> =
            items.iter().map(|t| Symbol::Terminal((*t).clone())).collect();
        if epsilon {
            s.insert(Symbol::Epsilon);
        }
        s
    }

    #[test]
    fn first_and_follow_reach_fixed_point() {
        init_logger();
        let a = term("a");
        let b = term("b");
        let d = term("d");
        let g = term("g");
        let h = term("h");
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("A"), nt("C"), nt("B")]),
            ProductionRule::new("S", "S", vec![nt("C"), (&b).into(), (&b).into()]),
            ProductionRule::new("S", "S", vec![nt("B"), (&a).into()]),
            ProductionRule::new("A", "A", vec![(&d).into(), (&a).into()]),
            ProductionRule::new("A", "A", vec![nt("B"), nt("C")]),
            ProductionRule::new("B", "B", vec![(&g).into()]),
            ProductionRule::epsilon("B", "B"),
            ProductionRule::new("C", "C", vec![(&h).into()]),
            ProductionRule::epsilon("C", "C"),
        ];
        let grammar: TestGrammar = Grammar::new(rules).unwrap();
        let sets = SymbolSets::compute(&grammar);

        assert_eq!(sets.first_sets().len(), 4);
        assert_eq!(sets.first(&"S"), Some(&set(&[&a, &b, &d, &g, &h], true)));
        assert_eq!(sets.first(&"A"), Some(&set(&[&d, &g, &h], true)));
        assert_eq!(sets.first(&"B"), Some(&set(&[&g], true)));
        assert_eq!(sets.first(&"C"), Some(&set(&[&h], true)));

        assert_eq!(sets.follow_sets().len(), 4);
        assert_eq!(sets.follow(&"S"), Some(&set(&[], false)));
        assert_eq!(sets.follow(&"A"), Some(&set(&[&h, &g], false)));
        assert_eq!(sets.follow(&"B"), Some(&set(&[&a, &h, &g], false)));
        assert_eq!(sets.follow(&"C"), Some(&set(&[&b, &h, &g], false)));

        assert!(sets.is_nullable(&"A"));
        assert!(!sets.is_nullable(&"Z"));
    }

    #[test]
    fn empty_body_is_nullable() {
        let x = term("x");
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("E"), (&x).into()]),
            ProductionRule::new("E", "E", vec![]),
        ];
        let grammar: TestGrammar = Grammar::new(rules).unwrap();
        let sets = SymbolSets::compute(&grammar);
        assert!(sets.is_nullable(&"E"));
        assert_eq!(sets.first(&"S"), Some(&set(&[&x], false)));
        assert_eq!(sets.follow(&"E"), Some(&set(&[&x], false)));
    }

    #[test]
    fn follow_propagates_through_recursion() {
        let plus = term("+");
        let id = term("id");
        let rules: Vec<TestRule> = vec![
            ProductionRule::new("S", "S", vec![nt("E")]),
            ProductionRule::new("E", "E", vec![nt("E"), (&plus).into(), nt("T")]),
            ProductionRule::new("E", "E", vec![nt("T")]),
            ProductionRule::new("T", "T", vec![(&id).into()]),
        ];
        let grammar: TestGrammar = Grammar::new(rules).unwrap();
        let sets = SymbolSets::compute(&grammar);
        assert_eq!(sets.follow(&"E"), Some(&set(&[&plus], false)));
        assert_eq!(sets.follow(&"T"), Some(&set(&[&plus], false)));
    }
}
