//! CYK chart parsing.
//!
//! The chart is a request-local dynamic-programming table filled bottom-up
//! by span length; every read from a smaller span happens after that cell
//! has reached its final contents. Rule weights are carried through
//! binarisation and storage but not consulted here — the parser returns
//! every derivation instead of selecting a best one.

use std::collections::BTreeSet;
use std::hash::Hash;
use std::rc::Rc;

use fnv::{FnvHashMap, FnvHashSet};
use integeriser::{HashIntegeriser, Integeriser};
use num_traits::One;

use crate::pcfg::{Grammar, Symbol};
use crate::tree::Tree;

/// An immutable, structurally hashed parse subtree. Cells share common
/// sub-forests through `Rc`; a subtree is never mutated after insertion,
/// later spans only wrap it into new parents.
#[derive(Debug, PartialEq, Eq, Hash)]
struct ChartTree<N, T> {
    root: Symbol<N, T>,
    children: Vec<Rc<ChartTree<N, T>>>,
}

impl<N: Clone, T: Clone> ChartTree<N, T> {
    fn to_tree(&self) -> Tree<Symbol<N, T>> {
        Tree::new(
            self.root.clone(),
            self.children.iter().map(|child| child.to_tree()).collect(),
        )
    }
}

type Cell<N, T> = FnvHashSet<Rc<ChartTree<N, T>>>;

/// The chart of one parser invocation, keyed by 1-based span start, span
/// length and the integerised head symbol.
pub struct Chart<N, T> {
    cells: FnvHashMap<(usize, usize, usize), Cell<N, T>>,
    symbols: HashIntegeriser<Symbol<N, T>>,
    len: usize,
}

impl<N, T> Chart<N, T>
where
    N: Clone + Eq + Hash + Ord,
    T: Clone + Eq + Hash + Ord,
{
    /// Builds the chart for `input` under `grammar`, which must only
    /// contain rules of arity ≤ 2.
    pub fn fill<W>(grammar: &Grammar<N, T, W>, input: &[(T, T)]) -> Self
    where
        W: Clone + Ord,
    {
        assert!(
            grammar.is_binarised(),
            "chart parsing requires a binarised grammar"
        );

        let mut symbols = HashIntegeriser::new();
        for rule in grammar.rules() {
            symbols.integerise(rule.head.clone());
        }
        let mut chart = Chart {
            cells: FnvHashMap::default(),
            symbols,
            len: input.len(),
        };

        for (i, &(_, ref tag)) in input.iter().enumerate() {
            let start = i + 1;
            let marker = Symbol::Terminal(tag.clone());
            for rule in grammar.unary_rules() {
                if rule.composition[0] == marker {
                    let leaf = Rc::new(ChartTree {
                        root: marker.clone(),
                        children: Vec::new(),
                    });
                    chart.insert(
                        start,
                        1,
                        Rc::new(ChartTree {
                            root: rule.head.clone(),
                            children: vec![leaf],
                        }),
                    );
                }
            }
            chart.close_unary(grammar, start, 1);
        }

        for length in 2..=input.len() {
            for start in 1..=input.len() - length + 1 {
                for partition in 1..length {
                    chart.compose(grammar, start, length, partition);
                }
                chart.close_unary(grammar, start, length);
            }
        }

        chart
    }

    /// Applies every binary rule to the pair of subspans meeting at
    /// `start + partition`.
    fn compose<W>(&mut self, grammar: &Grammar<N, T, W>, start: usize, length: usize, partition: usize)
    where
        W: Clone + Ord,
    {
        for rule in grammar.binary_rules() {
            let left_key = match self.symbols.find_key(&rule.composition[0]) {
                Some(key) => key,
                None => continue,
            };
            let right_key = match self.symbols.find_key(&rule.composition[1]) {
                Some(key) => key,
                None => continue,
            };

            let compositions: Vec<_> = match (
                self.cells.get(&(start, partition, left_key)),
                self.cells.get(&(start + partition, length - partition, right_key)),
            ) {
                (Some(left_cell), Some(right_cell)) => left_cell
                    .iter()
                    .flat_map(|left| {
                        right_cell.iter().map(move |right| {
                            Rc::new(ChartTree {
                                root: rule.head.clone(),
                                children: vec![Rc::clone(left), Rc::clone(right)],
                            })
                        })
                    })
                    .collect(),
                _ => continue,
            };

            for tree in compositions {
                self.insert(start, length, tree);
            }
        }
    }

    /// Applies the unary rules to the cells of span `(start, length)` until
    /// no new tree turns up. Iterating to the fixed point makes chains like
    /// `A → B`, `B → C` derivable; termination relies on the unary rules
    /// being cycle-free, a documented precondition of the engine.
    fn close_unary<W>(&mut self, grammar: &Grammar<N, T, W>, start: usize, length: usize)
    where
        W: Clone + Ord,
    {
        loop {
            let mut additions = Vec::new();
            for rule in grammar.unary_rules() {
                if let Some(key) = self.symbols.find_key(&rule.composition[0]) {
                    if let Some(cell) = self.cells.get(&(start, length, key)) {
                        for subtree in cell {
                            additions.push(Rc::new(ChartTree {
                                root: rule.head.clone(),
                                children: vec![Rc::clone(subtree)],
                            }));
                        }
                    }
                }
            }

            let mut changed = false;
            for tree in additions {
                changed |= self.insert(start, length, tree);
            }
            if !changed {
                return;
            }
        }
    }

    fn insert(&mut self, start: usize, length: usize, tree: Rc<ChartTree<N, T>>) -> bool {
        let key = self.symbols.integerise(tree.root.clone());
        self.cells
            .entry((start, length, key))
            .or_insert_with(FnvHashSet::default)
            .insert(tree)
    }

    /// The full-span derivations rooted at `symbol`, deep-copied out of the
    /// shared forest.
    pub fn derivations(&self, symbol: &Symbol<N, T>) -> BTreeSet<Tree<Symbol<N, T>>> {
        let mut parses = BTreeSet::new();
        if let Some(key) = self.symbols.find_key(symbol) {
            if let Some(cell) = self.cells.get(&(1, self.len, key)) {
                for tree in cell {
                    parses.insert(tree.to_tree());
                }
            }
        }
        parses
    }
}

/// Parses a sequence of `(word, tag)` pairs and returns every derivation
/// rooted at the grammar's initial symbol, still carrying terminal-marker
/// leaves and binarisation split symbols. The empty set means the input is
/// not in the language — an expected outcome, not an error. Grammars with
/// rules of arity > 2 are binarised on the fly.
pub fn parse<N, T, W>(
    grammar: &Grammar<N, T, W>,
    input: &[(T, T)],
) -> BTreeSet<Tree<Symbol<N, T>>>
where
    N: Clone + Eq + Hash + Ord,
    T: Clone + Eq + Hash + Ord,
    W: Clone + Ord + One,
{
    if input.is_empty() {
        return BTreeSet::new();
    }

    let binarised;
    let grammar = if grammar.is_binarised() {
        grammar
    } else {
        binarised = grammar.binarise();
        &binarised
    };

    Chart::fill(grammar, input)
        .derivations(&Symbol::Nonterminal(grammar.initial.clone()))
}
