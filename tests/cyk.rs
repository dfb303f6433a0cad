extern crate cykparse;
extern crate log_domain;

use log_domain::LogDomain;

use cykparse::cyk;
use cykparse::pcfg::Grammar;
use cykparse::storage;
use cykparse::treebank;

fn tokens(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|&(word, tag)| (word.to_owned(), tag.to_owned()))
        .collect()
}

#[test]
fn test_parse_with_textual_grammar() {
    let grammar: Grammar<String, String, LogDomain<f64>> = "initial: [S]\n\
         S   → [Nt NP, Nt VP] # 1\n\
         VP  → [Nt V, Nt NP] # 1\n\
         NP  → [Nt Det, Nt N] # 0.5\n\
         NP  → [T NP] # 0.5\n\
         V   → [T V] # 1\n\
         N   → [T N] # 1\n\
         Det → [T Det] # 1"
        .parse()
        .unwrap();

    let input = tokens(&[("she", "NP"), ("eats", "V"), ("a", "Det"), ("fish", "N")]);
    let parses = cyk::parse(&grammar, &input);

    assert_eq!(1, parses.len());
    let tree = parses.into_iter().next().unwrap();
    assert_eq!(
        "(S (NP she) (VP (V eats) (NP (Det a) (N fish))))",
        tree.debinarise().materialise(&input).to_string()
    );

    let scrambled = tokens(&[("eats", "V"), ("she", "NP"), ("a", "Det"), ("fish", "N")]);
    assert!(cyk::parse(&grammar, &scrambled).is_empty());
}

#[test]
fn test_train_store_parse_pipeline() {
    let trees = treebank::parse_treebank(
        "( (S (NP-SBJ (PRP she)) (VP (VBZ eats) (NP (DT a) (NN fish)))) )\n\
         ( (S (NP (PRP she)) (VP (VBZ sleeps) (ADVP (-NONE- *))) (. .)) )",
    )
    .unwrap();
    let grammar = treebank::extract_grammar(&trees);

    let mut buffer = Vec::new();
    storage::write_grammar(&grammar, &mut buffer).unwrap();
    let grammar: Grammar<String, String, LogDomain<f64>> =
        storage::read_grammar(&mut buffer.as_slice()).unwrap();

    let input = tokens(&[("he", "PRP"), ("eats", "VBZ"), ("a", "DT"), ("snack", "NN")]);
    let parses = cyk::parse(&grammar, &input);
    assert_eq!(1, parses.len());
    assert_eq!(
        "(S (NP (PRP he)) (VP (VBZ eats) (NP (DT a) (NN snack))))",
        parses
            .into_iter()
            .next()
            .unwrap()
            .debinarise()
            .materialise(&input)
            .to_string()
    );
}
