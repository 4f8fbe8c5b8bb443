//! Raw inputs of a build: the frequency table and the phrase corpora.
//!
//! `csv` turns a frequency table into a text → weight map. `corpus` collects
//! the set of strings that count as complete words.

mod corpus;
mod csv;
#[cfg(test)]
mod tests;

use std::io;

pub use corpus::{extract_word, CorpusSpec, WordSet, DEFAULT_COMMENT_PREFIX};
pub use csv::{load_frequency_csv, read_frequency_csv, CsvSchema, RawDictionary};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason} (content: {content:?})")]
    Malformed {
        line: usize,
        content: String,
        reason: String,
    },
}

impl SourceError {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}
