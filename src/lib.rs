//! A CYK parsing framework for probabilistic context-free grammars.
//!
//! The crate covers the full round trip of treebank-based parsing: a PCFG is
//! extracted from bracketed treebank files (or written down in a textual
//! notation), brought into an almost-Chomsky normal form by binarisation,
//! used to build a CYK chart over a sequence of tagged tokens, and the
//! resulting derivations are flattened back into the original rule shapes.

#[macro_use]
extern crate log;
#[macro_use]
extern crate nom;
#[macro_use]
extern crate serde_derive;

pub mod cyk;
pub mod evaluate;
pub mod pcfg;
pub mod storage;
pub mod tree;
pub mod treebank;
