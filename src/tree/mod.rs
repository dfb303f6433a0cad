//! An ownership tree of labelled nodes.
//!
//! The same type serves as the mutable tree that is being built or pruned
//! and as the canonical, structurally hashed value that chart cells and
//! tests compare; the chart shares finished subtrees behind `Rc` and only
//! ever wraps them, never edits them in place.

use std::collections::VecDeque;
use std::fmt;
use std::slice;

use crate::pcfg::Symbol;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Tree<A> {
    pub root: A,
    pub children: Vec<Tree<A>>,
}

impl<A> Tree<A> {
    pub fn new(root: A, children: Vec<Tree<A>>) -> Self {
        Tree { root, children }
    }

    pub fn leaf(root: A) -> Self {
        Tree {
            root,
            children: Vec::new(),
        }
    }

    /// A lazy preorder traversal over all subtrees, the node itself included.
    pub fn subtrees(&self) -> Subtrees<A> {
        let mut agenda = VecDeque::new();
        agenda.push_back(self);
        Subtrees { agenda }
    }
}

pub struct Subtrees<'a, A> {
    agenda: VecDeque<&'a Tree<A>>,
}

impl<'a, A> Iterator for Subtrees<'a, A> {
    type Item = &'a Tree<A>;

    fn next(&mut self) -> Option<&'a Tree<A>> {
        let current = self.agenda.pop_back()?;
        self.agenda.extend(current.children.iter().rev());
        Some(current)
    }
}

impl<N, T> Tree<Symbol<N, T>> {
    /// A node is terminal iff its label is a terminal marker or a
    /// materialised word and it has no children.
    pub fn is_terminal(&self) -> bool {
        match self.root {
            Symbol::Terminal(_) | Symbol::Word(_) => self.children.is_empty(),
            _ => false,
        }
    }

    /// A preterminal has exactly one child, which is itself childless.
    pub fn is_preterminal(&self) -> bool {
        self.children.len() == 1 && self.children[0].children.is_empty()
    }

    /// Recursively removes children that have no children of their own and
    /// are not terminal nodes. Treebank trees mark elided constituents with
    /// placeholder nodes that would otherwise end up in the extracted
    /// grammar.
    pub fn prune_empty(&mut self) {
        for child in &mut self.children {
            child.prune_empty();
        }
        self.children
            .retain(|child| !child.children.is_empty() || child.is_terminal());
    }

    /// Undoes binarisation: every node labelled with a split symbol is
    /// replaced by its children, in order, under the nearest ancestor that
    /// is not itself a split node. Inverts `Rule::binarise` on the shape of
    /// a parse tree built from a binarised grammar.
    ///
    /// A tree rooted at a split symbol was not extracted at a proper grammar
    /// symbol; this is reported but still flattened best-effort.
    pub fn debinarise(self) -> Self {
        if self.root.is_split() {
            warn!("debinarising a tree rooted at a split symbol");
        }
        let Tree { root, children } = self;
        Tree {
            root,
            children: children.into_iter().flat_map(Tree::splice).collect(),
        }
    }

    fn splice(self) -> Vec<Self> {
        let Tree { root, children } = self;
        let children: Vec<_> = children.into_iter().flat_map(Tree::splice).collect();
        match root {
            Symbol::Split(_) => children,
            root => vec![Tree { root, children }],
        }
    }

    /// Replaces the terminal-marker leaf of every preterminal by the word at
    /// the corresponding input position, in one left-to-right pass.
    ///
    /// Panics when a leaf's tag does not match the tag of the next input
    /// token or the token count does not match the number of preterminals;
    /// both indicate an inconsistency between parser and grammar, not a
    /// user-facing condition.
    pub fn materialise(mut self, tokens: &[(T, T)]) -> Self
    where
        T: Clone + PartialEq + fmt::Debug,
    {
        let mut tokens = tokens.iter();
        self.materialise_leaves(&mut tokens);
        assert!(
            tokens.next().is_none(),
            "more input tokens than preterminal leaves"
        );
        self
    }

    fn materialise_leaves(&mut self, tokens: &mut slice::Iter<(T, T)>)
    where
        T: Clone + PartialEq + fmt::Debug,
    {
        if self.is_preterminal() {
            let &(ref word, ref tag) = tokens
                .next()
                .expect("fewer input tokens than preterminal leaves");
            let leaf = &mut self.children[0];
            match leaf.root {
                Symbol::Terminal(ref leaf_tag) => assert!(
                    leaf_tag == tag,
                    "preterminal tag {:?} does not match input tag {:?}",
                    leaf_tag,
                    tag
                ),
                _ => panic!("preterminal leaf is not a terminal marker"),
            }
            leaf.root = Symbol::Word(word.clone());
        } else {
            for child in &mut self.children {
                child.materialise_leaves(tokens);
            }
        }
    }
}

/// Single-line bracketed form, e.g. `(S (NP she) (VP (V eats)))`.
impl<A: fmt::Display> fmt::Display for Tree<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.children.is_empty() {
            write!(f, "{}", self.root)
        } else {
            write!(f, "({}", self.root)?;
            for child in &self.children {
                write!(f, " {}", child)?;
            }
            write!(f, ")")
        }
    }
}
