//! Reading bracketed treebank files and extracting a PCFG from them.
//!
//! The input notation is the Penn-treebank style
//! `( (S (NP-SBJ (NNP John)) (VP (VBZ sleeps))) )`: every top-level tree is
//! wrapped in an extra pair of parentheses, nonterminals may carry a
//! function annotation after a `-` that is ignored during extraction, and
//! `-NONE-` marks an elided constituent whose placeholder ancestors are
//! pruned away.

use std::str::from_utf8;

use fnv::FnvHashMap;
use log_domain::LogDomain;
use nom::IResult;

use crate::pcfg::{Grammar, Rule, Symbol};
use crate::tree::Tree;

/// A token of the bracketed notation.
#[derive(Debug, PartialEq, Eq, Clone)]
enum Token<'a> {
    Open,
    Close,
    Symbol(&'a str),
}

fn is_tree_whitespace(c: u8) -> bool {
    (c as char).is_whitespace()
}

fn tokenize(input: &[u8]) -> IResult<&[u8], Vec<Token>> {
    do_parse!(
        input,
        tokens:
            many0!(complete!(do_parse!(
                take_while!(is_tree_whitespace)
                    >> token:
                        alt!(
                            map!(tag!("("), |_| Token::Open)
                                | map!(tag!(")"), |_| Token::Close)
                                | map!(
                                    map_res!(is_not!(" \t\n\r()"), from_utf8),
                                    Token::Symbol
                                )
                        )
                    >> (token)
            )))
            >> take_while!(is_tree_whitespace)
            >> (tokens)
    )
}

/// Nonterminals like `NP-SBJ` carry a function annotation that is ignored
/// during extraction.
fn strip_annotation(token: &str) -> &str {
    token.split('-').next().unwrap()
}

/// An entry of the reader stack: a node under construction, or a marker for
/// a redundant pair of parentheses around a node that is still unlabelled
/// (the treebank wraps every top-level tree in one).
enum Slot {
    Node {
        label: Option<String>,
        children: Vec<Tree<Symbol<String, String>>>,
    },
    Wrapper,
}

/// Reads every tree contained in the bracketed `data`.
///
/// A word position contributes a terminal-marker leaf carrying its parent's
/// label, so `(NP she)` becomes `(NP (T NP))`; the words themselves only
/// matter again after parsing, when a derivation is materialised against a
/// concrete input.
pub fn parse_treebank(data: &str) -> Result<Vec<Tree<Symbol<String, String>>>, String> {
    let tokens = match tokenize(data.as_bytes()) {
        IResult::Done(rest, ref tokens) if rest.is_empty() => tokens.clone(),
        _ => return Err(String::from("Could not tokenize the treebank")),
    };

    let mut stack: Vec<Slot> = Vec::new();
    let mut trees = Vec::new();

    for token in tokens {
        match token {
            Token::Open => {
                let unlabelled = match topmost_node(&mut stack) {
                    Some(&mut Slot::Node { ref label, .. }) => label.is_none(),
                    _ => false,
                };
                if unlabelled {
                    stack.push(Slot::Wrapper);
                } else {
                    stack.push(Slot::Node {
                        label: None,
                        children: Vec::new(),
                    });
                }
            }
            Token::Close => {
                match stack.pop() {
                    Some(Slot::Wrapper) => (),
                    Some(Slot::Node { label, children }) => {
                        let label = label
                            .ok_or_else(|| String::from("Closed a node without a label"))?;
                        let tree = Tree::new(Symbol::Nonterminal(label), children);
                        match topmost_node(&mut stack) {
                            Some(&mut Slot::Node {
                                ref mut children, ..
                            }) => children.push(tree),
                            _ => {
                                let mut tree = tree;
                                tree.prune_empty();
                                trees.push(tree);
                            }
                        }
                    }
                    None => return Err(String::from("Unbalanced \')\' in the treebank")),
                }
            }
            Token::Symbol(token) => {
                // Elided constituents are dropped; prune_empty takes care
                // of their placeholder parents once the tree is complete.
                if token == "-NONE-" {
                    continue;
                }
                let symbol = strip_annotation(token).to_owned();
                match topmost_node(&mut stack) {
                    Some(&mut Slot::Node {
                        ref mut label,
                        ref mut children,
                    }) => match *label {
                        None => *label = Some(symbol),
                        Some(ref label) => {
                            // A word position: the leaf carries the
                            // preterminal's tag, the word itself is dropped.
                            children.push(Tree::leaf(Symbol::Terminal(label.clone())));
                        }
                    },
                    _ => {
                        return Err(format!(
                            "Symbol \'{}\' occurs outside of any tree",
                            token
                        ))
                    }
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(String::from("Unbalanced \'(\' in the treebank"));
    }

    Ok(trees)
}

fn topmost_node(stack: &mut Vec<Slot>) -> Option<&mut Slot> {
    stack
        .iter_mut()
        .rev()
        .find(|slot| match **slot {
            Slot::Node { .. } => true,
            Slot::Wrapper => false,
        })
}

type RuleCounts = FnvHashMap<Symbol<String, String>, FnvHashMap<Vec<Symbol<String, String>>, usize>>;

fn count_rules(trees: &[Tree<Symbol<String, String>>]) -> RuleCounts {
    let mut counts = RuleCounts::default();
    for tree in trees {
        for subtree in tree.subtrees() {
            if subtree.is_terminal() || subtree.children.is_empty() {
                continue;
            }
            let composition: Vec<_> = subtree
                .children
                .iter()
                .map(|child| child.root.clone())
                .collect();
            *counts
                .entry(subtree.root.clone())
                .or_insert_with(FnvHashMap::default)
                .entry(composition)
                .or_insert(0) += 1;
        }
    }
    counts
}

/// Extracts a PCFG from `trees`: every production becomes a rule whose
/// probability is its relative frequency among the productions sharing the
/// same left-hand symbol. The returned grammar has initial symbol `S` and
/// is already binarised.
pub fn extract_grammar(trees: &[Tree<Symbol<String, String>>]) -> Grammar<String, String, LogDomain<f64>> {
    let mut rules = Vec::new();
    for (head, compositions) in count_rules(trees) {
        let total: usize = compositions.values().sum();
        debug!(
            "{} distinct right-hand sides for {} ({} occurrences)",
            compositions.len(),
            head,
            total
        );
        for (composition, count) in compositions {
            let weight = LogDomain::new(count as f64 / total as f64)
                .expect("relative frequencies lie in the unit interval");
            rules.push(Rule {
                head: head.clone(),
                composition,
                weight,
            });
        }
    }
    Grammar::new(String::from("S"), rules).binarise()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTDATA_SIMPLE: &str = " ( (S
        (PP-TMP (IN For)
          (NP (CD six) (NNS years) ))
        (, ,)
        (NP-SBJ (NNP T.) (NNP Marshall) (NNP Hahn) (NNP Jr.) )
        (VP (VBZ has)
          (VP (VBN made)
            (NP (JJ corporate) (NNS acquisitions) )))
        (. .) ))
    ";

    fn nt(name: &str) -> Symbol<String, String> {
        Symbol::Nonterminal(name.to_owned())
    }

    fn term(tag: &str) -> Symbol<String, String> {
        Symbol::Terminal(tag.to_owned())
    }

    fn lex(data: &str) -> Vec<Token> {
        match tokenize(data.as_bytes()) {
            IResult::Done(rest, tokens) => {
                assert!(rest.is_empty());
                tokens
            }
            other => panic!("tokenization failed: {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_nonletters() {
        assert_eq!(
            vec![
                Token::Open,
                Token::Symbol("T."),
                Token::Symbol(":"),
                Token::Symbol(":"),
                Token::Symbol("::"),
                Token::Symbol("FOO-BAR"),
                Token::Symbol("BAZ_FOO"),
                Token::Close,
            ],
            lex("(T. : : :: FOO-BAR BAZ_FOO)")
        );
    }

    #[test]
    fn test_tokenize_whitespace() {
        assert_eq!(vec![Token::Symbol("a"), Token::Symbol("b")], lex("a\nb"));
        assert_eq!(vec![Token::Symbol("a"), Token::Symbol("b")], lex("a\tb"));
    }

    #[test]
    fn test_strip_annotation() {
        assert_eq!("NP", strip_annotation("NP-SBJ"));
        assert_eq!("PP", strip_annotation("PP-TMP"));
        assert_eq!("NP", strip_annotation("NP"));
    }

    #[test]
    fn test_parse_trivial_tree() {
        assert_eq!(
            vec![Tree::new(nt("S"), vec![Tree::leaf(term("S"))])],
            parse_treebank("(S x)").unwrap()
        );
        assert_eq!(
            vec![Tree::new(nt("A"), vec![Tree::leaf(term("A"))])],
            parse_treebank("(A x)").unwrap()
        );
    }

    #[test]
    fn test_parse_wrapped_tree() {
        // The redundant parentheses around a top-level tree are ignored.
        assert_eq!(
            parse_treebank("(S x)").unwrap(),
            parse_treebank(" ( (S x) ) ").unwrap()
        );
    }

    #[test]
    fn test_parse_drops_empty_nodes() {
        // The elided constituent and its placeholder parent both vanish.
        assert_eq!(
            vec![Tree::new(
                nt("S"),
                vec![Tree::new(nt("NP"), vec![Tree::leaf(term("NP"))])]
            )],
            parse_treebank("(S (NP she) (VP (-NONE- *T*)))").unwrap()
        );
    }

    #[test]
    fn test_parse_unbalanced_input() {
        assert!(parse_treebank("(S x").is_err());
        assert!(parse_treebank("S x)").is_err());
    }

    #[test]
    fn test_parse_testdata() {
        let trees = parse_treebank(TESTDATA_SIMPLE).unwrap();
        assert_eq!(1, trees.len());
        let tree = &trees[0];

        assert_eq!(nt("S"), tree.root);
        // Function annotations disappear ...
        assert!(tree.subtrees().any(|subtree| subtree.root == nt("PP")));
        assert!(tree.subtrees().all(|subtree| subtree.root != nt("PP-TMP")));
        // ... and every preterminal carries its own tag as leaf.
        assert!(tree
            .subtrees()
            .filter(|subtree| subtree.is_preterminal())
            .all(|subtree| match (&subtree.root, &subtree.children[0].root) {
                (&Symbol::Nonterminal(ref label), &Symbol::Terminal(ref tag)) => label == tag,
                _ => false,
            }));
    }

    #[test]
    fn test_extract_grammar_weights() {
        let trees = parse_treebank(
            "( (S (NP a) (VP b)) )\n\
             ( (S (NP c)) )",
        )
        .unwrap();
        let grammar = extract_grammar(&trees);

        // Two productions for S, each seen once.
        let s_weights: Vec<f64> = grammar
            .rules()
            .filter(|rule| rule.head == nt("S"))
            .map(|rule| rule.weight.value())
            .collect();
        assert_eq!(2, s_weights.len());
        assert!(s_weights.iter().all(|value| (value - 0.5).abs() < 1e-10));

        // NP → [T NP] is the only production for NP.
        let np_rules: Vec<_> = grammar
            .rules()
            .filter(|rule| rule.head == nt("NP"))
            .collect();
        assert_eq!(1, np_rules.len());
        assert_eq!(vec![term("NP")], np_rules[0].composition);
        assert!((np_rules[0].weight.value() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_extracted_grammar_is_binarised() {
        let trees = parse_treebank("( (S (A a) (B b) (C c)) )").unwrap();
        assert!(extract_grammar(&trees).is_binarised());
    }
}
