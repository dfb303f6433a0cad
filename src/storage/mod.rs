//! Durable storage for grammars.
//!
//! The encoding is a private bincode record: the rules with their weights
//! flattened to plain probabilities. Reading a written grammar always
//! reproduces an equal grammar, split symbols and terminal markers
//! included; nothing else about the byte format is a contract.

use std::hash::Hash;
use std::io::{Read, Write};

use log_domain::LogDomain;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::pcfg::{Grammar, Rule, Symbol};

#[derive(Debug, Serialize, Deserialize)]
struct Record<N, T> {
    initial: N,
    rules: Vec<(Symbol<N, T>, Vec<Symbol<N, T>>, f64)>,
}

pub fn write_grammar<N, T, Out>(
    grammar: &Grammar<N, T, LogDomain<f64>>,
    writer: &mut Out,
) -> Result<(), String>
where
    N: Clone + Eq + Hash + Ord + Serialize,
    T: Clone + Eq + Hash + Ord + Serialize,
    Out: Write,
{
    let record = Record {
        initial: grammar.initial.clone(),
        rules: grammar
            .rules()
            .map(|rule| {
                (
                    rule.head.clone(),
                    rule.composition.clone(),
                    rule.weight.value(),
                )
            })
            .collect(),
    };
    bincode::serialize_into(writer, &record)
        .map_err(|e| format!("Could not write the grammar: {}", e))
}

pub fn read_grammar<N, T, In>(reader: &mut In) -> Result<Grammar<N, T, LogDomain<f64>>, String>
where
    N: Clone + Eq + Hash + Ord + DeserializeOwned,
    T: Clone + Eq + Hash + Ord + DeserializeOwned,
    In: Read,
{
    let record: Record<N, T> = bincode::deserialize_from(reader)
        .map_err(|e| format!("Could not read the grammar: {}", e))?;

    let mut rules = Vec::with_capacity(record.rules.len());
    for (head, composition, weight) in record.rules {
        let weight = LogDomain::new(weight)
            .map_err(|e| format!("Stored weight is not a probability: {:?}", e))?;
        rules.push(Rule {
            head,
            composition,
            weight,
        });
    }
    Ok(Grammar::new(record.initial, rules))
}
