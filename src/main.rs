extern crate clap;
extern crate cykparse;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate log_domain;

use clap::{App, Arg, SubCommand};
use std::fs::File;
use std::io::prelude::*;

use log_domain::LogDomain;

use cykparse::cyk;
use cykparse::evaluate::{count_constituents, count_correct_constituents};
use cykparse::pcfg::{Grammar, Symbol};
use cykparse::storage;
use cykparse::tree::Tree;
use cykparse::treebank;

fn main() {
    env_logger::init();

    let matches = App::new("cykparse")
        .version("0.1")
        .about("CYK parsing with PCFGs extracted from treebanks")
        .subcommand(
            SubCommand::with_name("train")
                .about("extracts a grammar from bracketed treebank files")
                .arg(
                    Arg::with_name("treebanks")
                        .help("treebank files to read")
                        .index(1)
                        .multiple(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("output")
                        .help("file the grammar is written to")
                        .short("o")
                        .long("output")
                        .default_value("grammar.bin"),
                ),
        )
        .subcommand(
            SubCommand::with_name("parse")
                .about("parses word/tag sequences from stdin, one sentence per line")
                .arg(
                    Arg::with_name("grammar")
                        .help("grammar file to use")
                        .index(1)
                        .required(true),
                )
                .arg(
                    Arg::with_name("text")
                        .help("read the grammar in textual notation instead of binary")
                        .long("text"),
                )
                .arg(
                    Arg::with_name("raw")
                        .help("print the derivations as built, without debinarising")
                        .long("raw"),
                ),
        )
        .subcommand(
            SubCommand::with_name("evaluate")
                .about("compares the constituents of a candidate parse against a reference tree")
                .arg(
                    Arg::with_name("candidate")
                        .help("file containing the candidate tree")
                        .index(1)
                        .required(true),
                )
                .arg(
                    Arg::with_name("reference")
                        .help("file containing the reference tree")
                        .index(2)
                        .required(true),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        ("train", Some(train_matches)) => {
            let mut trees = Vec::new();
            for file_name in train_matches.values_of("treebanks").unwrap() {
                let mut file = File::open(file_name).unwrap();
                let mut data = String::new();
                let _ = file.read_to_string(&mut data);
                let mut file_trees = treebank::parse_treebank(&data).unwrap();
                info!("{}: {} trees", file_name, file_trees.len());
                trees.append(&mut file_trees);
            }

            let grammar = treebank::extract_grammar(&trees);
            info!("extracted {} rules", grammar.rules().count());

            let output_name = train_matches.value_of("output").unwrap();
            let mut output = File::create(output_name).unwrap();
            storage::write_grammar(&grammar, &mut output).unwrap();
        }
        ("parse", Some(parse_matches)) => {
            let grammar_file_name = parse_matches.value_of("grammar").unwrap();
            let grammar: Grammar<String, String, LogDomain<f64>> =
                if parse_matches.is_present("text") {
                    let mut grammar_file = File::open(grammar_file_name).unwrap();
                    let mut grammar_string = String::new();
                    let _ = grammar_file.read_to_string(&mut grammar_string);
                    grammar_string.parse().unwrap()
                } else {
                    let mut grammar_file = File::open(grammar_file_name).unwrap();
                    storage::read_grammar(&mut grammar_file).unwrap()
                };

            let mut corpus = String::new();
            let _ = std::io::stdin().read_to_string(&mut corpus);

            for sentence in corpus.lines() {
                let tokens = tagged_tokens(sentence);
                let parses = cyk::parse(&grammar, &tokens);
                if parses.is_empty() {
                    println!("no parse");
                }
                for parse in parses {
                    if parse_matches.is_present("raw") {
                        println!("{}", parse);
                    } else {
                        println!("{}", parse.debinarise().materialise(&tokens));
                    }
                }
            }
        }
        ("evaluate", Some(evaluate_matches)) => {
            let candidate = read_tree(evaluate_matches.value_of("candidate").unwrap());
            let reference = read_tree(evaluate_matches.value_of("reference").unwrap());

            println!(
                "{} of {} candidate constituents occur among the {} reference constituents",
                count_correct_constituents(&candidate, &reference),
                count_constituents(&candidate),
                count_constituents(&reference)
            );
        }
        _ => (),
    }
}

/// Splits a sentence of `word/tag` tokens; the rightmost `'/'` separates the
/// tag, so words may contain slashes.
fn tagged_tokens(sentence: &str) -> Vec<(String, String)> {
    sentence
        .split_whitespace()
        .map(|token| {
            let mut parts = token.rsplitn(2, '/');
            let tag = parts.next().unwrap().to_string();
            let word = parts.next().unwrap_or("").to_string();
            (word, tag)
        })
        .collect()
}

fn read_tree(file_name: &str) -> Tree<Symbol<String, String>> {
    let mut file = File::open(file_name).unwrap();
    let mut data = String::new();
    let _ = file.read_to_string(&mut data);
    let mut trees = treebank::parse_treebank(&data).unwrap();
    assert_eq!(1, trees.len(), "{} must contain exactly one tree", file_name);
    trees.pop().unwrap()
}
