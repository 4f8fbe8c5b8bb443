use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::Serialize;

use super::{weight, ArtifactError, NGramHeader, SectionId, WordFlags};
use crate::trie::WeightedTrie;
use crate::unicode::{code_point_len, suffix_start};

/// Bytes of one section. The header must already be validated against `data`.
fn section_bytes<'a>(data: &'a [u8], header: &NGramHeader, id: SectionId) -> &'a [u8] {
    let section = header.section(id);
    &data[section.offset..section.offset + section.size]
}

/// A trie entry with its weight and word flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub text: String,
    pub id: u32,
    pub weight: f32,
    pub is_word: bool,
}

#[derive(Debug, Clone)]
pub struct PredictOptions {
    pub max_results: usize,
    /// Skip entries whose word flag is clear.
    pub words_only: bool,
    /// Entries whose full key or continuation is listed here are dropped.
    pub denylist: HashSet<String>,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            max_results: 10,
            words_only: false,
            denylist: HashSet::new(),
        }
    }
}

/// A loaded, validated artifact. Immutable once opened.
pub struct NGramArtifact {
    header: NGramHeader,
    trie: WeightedTrie,
    weights: Vec<u16>,
    word_flags: WordFlags,
}

impl NGramArtifact {
    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtifactError> {
        let header = NGramHeader::from_bytes(data)?;
        header.validate(data.len())?;
        let n = header.num_entries;

        let weights = section_bytes(data, &header, SectionId::Weight);
        if Some(weights.len()) != n.checked_mul(weight::WEIGHT_SIZE) {
            return Err(ArtifactError::Corrupt(format!(
                "weight section is {} bytes for {n} entries",
                weights.len()
            )));
        }
        let flags = section_bytes(data, &header, SectionId::IsWord);
        let word_flags = WordFlags::from_bytes(flags.to_vec(), n).ok_or_else(|| {
            ArtifactError::Corrupt(format!(
                "word flag section is {} bytes for {n} entries",
                flags.len()
            ))
        })?;

        let trie = WeightedTrie::from_bytes(section_bytes(data, &header, SectionId::Trie))?;
        if trie.len() != n {
            return Err(ArtifactError::Corrupt(format!(
                "trie holds {} keys, header says {n}",
                trie.len()
            )));
        }

        Ok(Self {
            weights: weight::from_bytes(weights),
            header,
            trie,
            word_flags,
        })
    }

    /// Open an artifact file, using mmap to avoid doubling peak memory.
    pub fn open(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // The Mmap is dropped after parsing completes below.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&mmap)
    }

    pub fn header(&self) -> &NGramHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn max_n(&self) -> usize {
        self.header.max_n as usize
    }

    pub fn weight(&self, id: u32) -> f32 {
        weight::decode(self.weights[id as usize])
    }

    pub fn is_word(&self, id: u32) -> bool {
        self.word_flags.get(id as usize)
    }

    fn candidate(&self, text: String, id: u32) -> Candidate {
        Candidate {
            text,
            id,
            weight: self.weight(id),
            is_word: self.is_word(id),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<Candidate> {
        self.trie
            .lookup(key)
            .map(|id| self.candidate(key.to_string(), id))
    }

    /// Number of entries flagged as complete words.
    pub fn word_count(&self) -> usize {
        self.word_flags.count_set()
    }

    /// Lazily enumerate keys starting with `prefix`, heaviest first.
    pub fn completions<'a>(&'a self, prefix: &str) -> impl Iterator<Item = Candidate> + 'a {
        self.trie
            .predictive_search(prefix)
            .map(move |m| self.candidate(m.key, m.id))
    }

    /// Keys starting with `prefix`, heaviest first.
    pub fn predict_prefix(&self, prefix: &str, limit: usize) -> Vec<Candidate> {
        self.completions(prefix).take(limit).collect()
    }

    /// Continuations of `context`.
    ///
    /// Tries the longest context suffix that still leaves room for one more
    /// code point first, then shorter ones. Each candidate's `text` is the
    /// part of the key after the matched suffix; duplicates are dropped.
    pub fn predict(&self, context: &str, options: &PredictOptions) -> Vec<Candidate> {
        let mut results = Vec::new();
        if options.max_results == 0 {
            return results;
        }
        let mut seen = HashSet::new();
        let longest = self.max_n().saturating_sub(1);

        for len in (1..=longest).rev() {
            let start = suffix_start(context, len);
            let suffix = &context[start..];
            if suffix.is_empty() || code_point_len(suffix) < len {
                continue;
            }

            for m in self.trie.predictive_search(suffix) {
                let continuation = &m.key[suffix.len()..];
                if continuation.is_empty() {
                    continue;
                }
                if options.words_only && !self.is_word(m.id) {
                    continue;
                }
                if options.denylist.contains(&m.key) || options.denylist.contains(continuation) {
                    continue;
                }
                if !seen.insert(continuation.to_string()) {
                    continue;
                }
                results.push(self.candidate(continuation.to_string(), m.id));
                if results.len() >= options.max_results {
                    return results;
                }
            }
        }
        results
    }
}
