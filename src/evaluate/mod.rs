//! Comparing a parse against a reference tree by labelled constituents.
//!
//! A constituent is a triple of a node's label and the span of leaf
//! positions it covers. Counting the constituents two trees share is the
//! usual ingredient of labelled precision and recall; the trees need not
//! cover the same yield, a constituent only matches when label, start and
//! end all agree.

use fnv::FnvHashSet;
use std::hash::Hash;

use crate::tree::Tree;

/// The number of constituents of `tree`, leaves included.
pub fn count_constituents<A>(tree: &Tree<A>) -> usize {
    tree.subtrees().count()
}

/// The number of constituents of `candidate` that also occur in
/// `reference`, compared by label and covered span.
pub fn count_correct_constituents<A>(candidate: &Tree<A>, reference: &Tree<A>) -> usize
where
    A: Clone + Eq + Hash,
{
    let reference: FnvHashSet<_> = constituents(reference).into_iter().collect();
    constituents(candidate)
        .into_iter()
        .filter(|constituent| reference.contains(constituent))
        .count()
}

/// Every node of `tree` as a `(label, start, end)` triple, where `start`
/// and `end` delimit the leaf positions the node covers and every leaf
/// occupies exactly one position.
fn constituents<A: Clone>(tree: &Tree<A>) -> Vec<(A, usize, usize)> {
    let mut result = Vec::new();
    collect(tree, 0, &mut result);
    result
}

fn collect<A: Clone>(tree: &Tree<A>, start: usize, result: &mut Vec<(A, usize, usize)>) -> usize {
    let mut position = start;
    if tree.children.is_empty() {
        position += 1;
    } else {
        for child in &tree.children {
            position = collect(child, position, result);
        }
    }
    result.push((tree.root.clone(), start, position));
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Tree<String> {
        // A minimal reader for the bracketed single-line form the tests use.
        let mut stack: Vec<(String, Vec<Tree<String>>)> = Vec::new();
        let mut trees = Vec::new();
        for token in s.replace('(', " ( ").replace(')', " ) ").split_whitespace() {
            match token {
                "(" => stack.push((String::new(), Vec::new())),
                ")" => {
                    let (label, children) = stack.pop().unwrap();
                    let tree = Tree::new(label, children);
                    match stack.last_mut() {
                        Some(&mut (_, ref mut children)) => children.push(tree),
                        None => trees.push(tree),
                    }
                }
                token => match stack.last_mut() {
                    Some(&mut (ref mut label, ref mut children)) => {
                        if label.is_empty() {
                            *label = token.to_owned();
                        } else {
                            children.push(Tree::leaf(token.to_owned()));
                        }
                    }
                    None => trees.push(Tree::leaf(token.to_owned())),
                },
            }
        }
        assert_eq!(1, trees.len());
        trees.pop().unwrap()
    }

    #[test]
    fn test_count_constituents() {
        assert_eq!(1, count_constituents(&parse("x")));
        assert_eq!(3, count_constituents(&parse("(S a b)")));
        assert_eq!(7, count_constituents(&parse("(S (NP she) (VP (V eats)))")));
    }

    #[test]
    fn test_identical_trees() {
        let tree = parse("(S (NP she) (VP (V eats)))");
        assert_eq!(
            count_constituents(&tree),
            count_correct_constituents(&tree, &tree)
        );
    }

    #[test]
    fn test_disjoint_labels() {
        assert_eq!(
            0,
            count_correct_constituents(&parse("(A x y)"), &parse("(B x y)"))
        );
    }

    #[test]
    fn test_same_label_different_span() {
        // Both leaves match positionally, but only the first NP spans
        // the same positions in both trees.
        let candidate = parse("(S (NP a) (NP b c))");
        let reference = parse("(S (NP a) (NP b) (NP c))");
        // Shared: the three leaves, S over 0..3 and NP over 0..1; the
        // candidate's NP over 1..3 matches no reference span.
        assert_eq!(5, count_correct_constituents(&candidate, &reference));
    }

    #[test]
    fn test_partial_overlap() {
        let candidate = parse("(S (NP she) (VP (V eats)))");
        let reference = parse("(S (NP she) (VP eats))");
        // Everything matches except the candidate's extra V node.
        assert_eq!(5, count_correct_constituents(&candidate, &reference));
    }
}
