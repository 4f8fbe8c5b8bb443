use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::SourceError;
use crate::convert::ScriptConverter;

pub const DEFAULT_COMMENT_PREFIX: &str = "#";

fn default_comment_prefix() -> String {
    DEFAULT_COMMENT_PREFIX.to_string()
}

/// One phrase corpus consulted for word classification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusSpec {
    pub path: PathBuf,
    /// Lines up to and including the first line equal to this marker are
    /// skipped. Without a marker, phrase data starts at the first line.
    /// Surrounding whitespace is ignored.
    #[serde(default)]
    pub start_marker: Option<String>,
    /// Lines starting with this prefix are never words, leading whitespace
    /// ignored. Empty disables it.
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
}

impl CorpusSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            start_marker: None,
            comment_prefix: default_comment_prefix(),
        }
    }

    pub fn with_start_marker(mut self, marker: impl Into<String>) -> Self {
        self.start_marker = Some(marker.into());
        self
    }
}

/// The word candidate on a corpus line: the text before the first tab, or
/// the whole line when there is no tab. `None` for blank lines.
pub fn extract_word(line: &str) -> Option<&str> {
    let word = match line.split_once('\t') {
        Some((head, _)) => head.trim(),
        None => line.trim(),
    };
    (!word.is_empty()).then_some(word)
}

/// Strings that are complete words, as opposed to trie fragments.
#[derive(Debug, Clone, Default)]
pub struct WordSet {
    words: HashSet<String>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: impl Into<String>) -> bool {
        self.words.insert(word.into())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Add every word of one corpus stream. Returns the number of phrase
    /// lines read (duplicates included).
    pub fn extend_from_reader(
        &mut self,
        reader: impl BufRead,
        start_marker: Option<&str>,
        comment_prefix: &str,
    ) -> Result<usize, SourceError> {
        let mut started = start_marker.is_none();
        let mut read = 0usize;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if !started {
                started = start_marker.is_some_and(|marker| line.trim() == marker);
                continue;
            }
            if !comment_prefix.is_empty() && line.trim_start().starts_with(comment_prefix) {
                continue;
            }
            if let Some(word) = extract_word(line) {
                read += 1;
                if !self.words.contains(word) {
                    self.words.insert(word.to_string());
                }
            }
        }

        Ok(read)
    }

    pub fn extend_from_corpus(&mut self, spec: &CorpusSpec) -> Result<usize, SourceError> {
        let file = File::open(&spec.path)?;
        self.extend_from_reader(
            BufReader::new(file),
            spec.start_marker.as_deref(),
            &spec.comment_prefix,
        )
    }

    /// The same set with every word run through `converter`.
    pub fn converted(&self, converter: &dyn ScriptConverter) -> Self {
        Self {
            words: self.words.iter().map(|w| converter.convert(w)).collect(),
        }
    }
}

impl FromIterator<String> for WordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}
