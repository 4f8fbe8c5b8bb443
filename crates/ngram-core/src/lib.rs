//! Compiler for packed n-gram prediction dictionaries.
//!
//! A build reads a frequency CSV ([`source`]), runs every key through a
//! script converter ([`convert`]), indexes the survivors in a weight-ordered
//! trie ([`trie`]) and writes one artifact per target ([`artifact`]).
//! [`pipeline`] wires the stages together from a [`config::BuildConfig`].

pub mod artifact;
pub mod config;
pub mod convert;
pub mod pipeline;
pub mod source;
pub mod trie;
pub mod unicode;
