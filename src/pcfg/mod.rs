//! Probabilistic context-free grammars and their binarisation.

mod from_str;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use fnv::FnvHashSet;
use num_traits::One;

/// A symbol of the grammar alphabet, used both in rules and as tree label.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
pub enum Symbol<N, T> {
    /// An ordinary grammar symbol.
    Nonterminal(N),
    /// A part-of-speech terminal marker. A tree node carrying this label
    /// ends a derivation chain and must not have children.
    Terminal(T),
    /// A literal input token, introduced by leaf materialisation.
    Word(T),
    /// A synthetic symbol created during binarisation. It wraps the
    /// unconsumed suffix (length ≥ 2) of the right-hand side of the rule
    /// being split and is equal only to split symbols wrapping the same
    /// suffix, never to an original grammar symbol.
    Split(Vec<Symbol<N, T>>),
}

impl<N, T> Symbol<N, T> {
    pub fn is_split(&self) -> bool {
        match *self {
            Symbol::Split(_) => true,
            _ => false,
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for Symbol<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Symbol::Nonterminal(ref n) => write!(f, "{}", n),
            Symbol::Terminal(ref t) => write!(f, "{}", t),
            Symbol::Word(ref w) => write!(f, "{}", w),
            Symbol::Split(ref suffix) => {
                write!(f, "<")?;
                for (i, symbol) in suffix.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", symbol)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// A rule of a weighted CFG.
///
/// The derived equality includes the weight; for grammar membership only
/// `(head, composition)` count, which is why `Hash` ignores the weight and
/// [`Grammar::new`](struct.Grammar.html#method.new) collapses duplicates.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize, Deserialize)]
pub struct Rule<N, T, W> {
    pub head: Symbol<N, T>,
    pub composition: Vec<Symbol<N, T>>,
    pub weight: W,
}

impl<N: Hash, T: Hash, W> Hash for Rule<N, T, W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.head.hash(state);
        self.composition.hash(state);
    }
}

impl<N, T, W> Rule<N, T, W>
where
    N: Clone,
    T: Clone,
    W: Clone + One,
{
    /// Splits a rule of arity `n > 2` into an equivalent right-branching
    /// chain of `n - 1` rules of arity 2; rules of arity ≤ 2 pass through
    /// unchanged. Only the first emitted rule carries the original weight,
    /// every rule recursing into a split suffix has weight 1 — split symbols
    /// are not independently reachable, so any other weight would count the
    /// rule twice.
    ///
    /// ```
    /// use cykparse::pcfg::{Rule, Symbol};
    ///
    /// let rule: Rule<char, char, f64> = Rule {
    ///     head: Symbol::Nonterminal('S'),
    ///     composition: vec![
    ///         Symbol::Nonterminal('A'),
    ///         Symbol::Nonterminal('B'),
    ///         Symbol::Terminal('c'),
    ///     ],
    ///     weight: 0.5,
    /// };
    ///
    /// assert_eq!(2, rule.binarise().len());
    /// ```
    pub fn binarise(&self) -> Vec<Rule<N, T, W>> {
        if self.composition.len() <= 2 {
            return vec![self.clone()];
        }

        let suffix = self.composition[1..].to_vec();
        let split = Symbol::Split(suffix.clone());
        let mut rules = vec![Rule {
            head: self.head.clone(),
            composition: vec![self.composition[0].clone(), split.clone()],
            weight: self.weight.clone(),
        }];
        let rest = Rule {
            head: split,
            composition: suffix,
            weight: W::one(),
        };
        for rule in rest.binarise() {
            assert_eq!(2, rule.composition.len());
            rules.push(rule);
        }
        rules
    }
}

impl<N, T, W> fmt::Display for Rule<N, T, W>
where
    N: fmt::Display,
    T: fmt::Display,
    W: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} → [", self.head)?;
        for (i, symbol) in self.composition.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match *symbol {
                Symbol::Terminal(ref t) => write!(f, "T {}", t)?,
                ref other => write!(f, "Nt {}", other)?,
            }
        }
        write!(f, "] # {}", self.weight)
    }
}

/// An immutable set of weighted rules together with the designated initial
/// symbol.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Grammar<N, T, W> {
    pub initial: N,
    rules: BTreeSet<Rule<N, T, W>>,
}

impl<N, T, W> Grammar<N, T, W>
where
    N: Clone + Eq + Hash + Ord,
    T: Clone + Eq + Hash + Ord,
    W: Clone + Ord,
{
    /// Builds a grammar from a rule collection. Rules agreeing on
    /// `(head, composition)` collapse into one; the weight written last
    /// wins.
    pub fn new<I>(initial: N, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule<N, T, W>>,
    {
        let mut collapsed = BTreeMap::new();
        for rule in rules {
            collapsed.insert((rule.head, rule.composition), rule.weight);
        }

        Grammar {
            initial,
            rules: collapsed
                .into_iter()
                .map(|((head, composition), weight)| Rule {
                    head,
                    composition,
                    weight,
                })
                .collect(),
        }
    }

    pub fn rules<'a>(&'a self) -> impl Iterator<Item = &'a Rule<N, T, W>> + 'a {
        self.rules.iter()
    }

    pub fn unary_rules<'a>(&'a self) -> impl Iterator<Item = &'a Rule<N, T, W>> + 'a {
        self.rules.iter().filter(|rule| rule.composition.len() == 1)
    }

    pub fn binary_rules<'a>(&'a self) -> impl Iterator<Item = &'a Rule<N, T, W>> + 'a {
        self.rules.iter().filter(|rule| rule.composition.len() == 2)
    }

    /// The left-hand symbols of the grammar.
    pub fn nonterminal_symbols<'a>(&'a self) -> impl Iterator<Item = &'a Symbol<N, T>> + 'a {
        self.rules.iter().map(|rule| &rule.head)
    }

    /// Unary rules whose right-hand symbol heads no rule of the grammar.
    pub fn terminal_rules<'a>(&'a self) -> impl Iterator<Item = &'a Rule<N, T, W>> + 'a {
        let heads = self.head_symbols();
        self.unary_rules()
            .filter(move |rule| !heads.contains(&rule.composition[0]))
    }

    /// The complement of [`terminal_rules`](#method.terminal_rules).
    pub fn nonterminal_rules<'a>(&'a self) -> impl Iterator<Item = &'a Rule<N, T, W>> + 'a {
        let heads = self.head_symbols();
        self.rules.iter().filter(move |rule| {
            rule.composition.len() != 1 || heads.contains(&rule.composition[0])
        })
    }

    fn head_symbols(&self) -> FnvHashSet<&Symbol<N, T>> {
        self.nonterminal_symbols().collect()
    }

    pub fn is_binarised(&self) -> bool {
        self.rules.iter().all(|rule| rule.composition.len() <= 2)
    }

    /// Splits every rule of arity > 2 and unions the results into a new
    /// grammar. Binarising an already binarised grammar is a no-op.
    pub fn binarise(&self) -> Self
    where
        W: One,
    {
        Grammar::new(
            self.initial.clone(),
            self.rules.iter().flat_map(|rule| rule.binarise()),
        )
    }
}

impl<N, T, W> fmt::Display for Grammar<N, T, W>
where
    N: fmt::Display,
    T: fmt::Display,
    W: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "initial: [{}]", self.initial)?;
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
