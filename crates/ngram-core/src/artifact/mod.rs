//! The packed n-gram artifact.
//!
//! Layout (native byte order, no padding):
//!
//! ```text
//! magic "CANTNGAM" | header_size i16 | version i16 | max_n u8
//! | num_entries usize | 3 x (size usize, offset usize)
//! | trie blob | weights (N x f16) | word flags (ceil(N/8) bytes)
//! ```
//!
//! Readers locate sections through the table, never by position.

mod reader;
pub mod weight;
mod word_flags;
mod writer;

use std::io;
use std::mem::size_of;

use serde::Serialize;

use crate::trie::TrieError;

pub use reader::{Candidate, NGramArtifact, PredictOptions};
pub use word_flags::WordFlags;
pub use writer::ArtifactWriter;

pub const MAGIC: &[u8; 8] = b"CANTNGAM";
pub const VERSION: u16 = 0;
pub const SECTION_COUNT: usize = 3;

const WORD: usize = size_of::<usize>();
/// 69 bytes on 64-bit hosts.
pub const HEADER_SIZE: usize = 8 + 2 + 2 + 1 + WORD + SECTION_COUNT * 2 * WORD;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected CANTNGAM)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("longest key has {0} code points, header holds at most 255")]
    MaxNOverflow(usize),

    #[error("invalid trie section: {0}")]
    Trie(#[from] TrieError),

    #[error("corrupt artifact: {0}")]
    Corrupt(String),
}

/// Stable section identifiers; the discriminant indexes the header table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Trie = 0,
    Weight = 1,
    IsWord = 2,
}

impl SectionId {
    pub const ALL: [SectionId; SECTION_COUNT] = [Self::Trie, Self::Weight, Self::IsWord];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trie => "trie",
            Self::Weight => "weight",
            Self::IsWord => "is_word",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub size: usize,
    pub offset: usize,
}

impl Section {
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NGramHeader {
    pub header_size: u16,
    pub version: u16,
    pub max_n: u8,
    pub num_entries: usize,
    pub sections: [Section; SECTION_COUNT],
}

fn read_usize(data: &[u8], at: usize) -> usize {
    let mut buf = [0u8; WORD];
    buf.copy_from_slice(&data[at..at + WORD]);
    usize::from_ne_bytes(buf)
}

impl NGramHeader {
    pub fn new(max_n: u8, num_entries: usize) -> Self {
        Self {
            header_size: HEADER_SIZE as u16,
            version: VERSION,
            max_n,
            num_entries,
            sections: [Section::default(); SECTION_COUNT],
        }
    }

    pub fn section(&self, id: SectionId) -> Section {
        self.sections[id.index()]
    }

    /// Header size plus every section, i.e. the exact artifact size.
    pub fn total_size(&self) -> usize {
        self.header_size as usize + self.sections.iter().map(|s| s.size).sum::<usize>()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.header_size.to_ne_bytes());
        buf.extend_from_slice(&self.version.to_ne_bytes());
        buf.push(self.max_n);
        buf.extend_from_slice(&self.num_entries.to_ne_bytes());
        for section in &self.sections {
            buf.extend_from_slice(&section.size.to_ne_bytes());
            buf.extend_from_slice(&section.offset.to_ne_bytes());
        }
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArtifactError> {
        if data.len() < MAGIC.len() {
            return Err(ArtifactError::InvalidHeader);
        }
        if &data[..MAGIC.len()] != MAGIC {
            return Err(ArtifactError::InvalidMagic);
        }
        if data.len() < HEADER_SIZE {
            return Err(ArtifactError::InvalidHeader);
        }

        let header_size = u16::from_ne_bytes([data[8], data[9]]);
        let version = u16::from_ne_bytes([data[10], data[11]]);
        if version != VERSION {
            return Err(ArtifactError::UnsupportedVersion(version));
        }
        if (header_size as usize) < HEADER_SIZE || header_size as usize > data.len() {
            return Err(ArtifactError::InvalidHeader);
        }

        let max_n = data[12];
        let num_entries = read_usize(data, 13);
        let mut sections = [Section::default(); SECTION_COUNT];
        for (i, section) in sections.iter_mut().enumerate() {
            let at = 13 + WORD + i * 2 * WORD;
            section.size = read_usize(data, at);
            section.offset = read_usize(data, at + WORD);
        }

        Ok(Self {
            header_size,
            version,
            max_n,
            num_entries,
            sections,
        })
    }

    /// Every section lies after the header, inside the file, and apart from
    /// every other section.
    pub fn validate(&self, file_len: usize) -> Result<(), ArtifactError> {
        let mut spans: Vec<(usize, usize, SectionId)> = Vec::with_capacity(SECTION_COUNT);
        for id in SectionId::ALL {
            let section = self.section(id);
            let end = section.end().ok_or_else(|| {
                ArtifactError::Corrupt(format!("{} section range overflows", id.name()))
            })?;
            if end > file_len {
                return Err(ArtifactError::Corrupt(format!(
                    "{} section ends at {end}, past end of file ({file_len})",
                    id.name()
                )));
            }
            if section.size > 0 {
                if section.offset < self.header_size as usize {
                    return Err(ArtifactError::Corrupt(format!(
                        "{} section overlaps the header",
                        id.name()
                    )));
                }
                spans.push((section.offset, end, id));
            }
        }

        spans.sort_unstable_by_key(|&(offset, _, _)| offset);
        for pair in spans.windows(2) {
            let (_, a_end, a) = pair[0];
            let (b_start, _, b) = pair[1];
            if a_end > b_start {
                return Err(ArtifactError::Corrupt(format!(
                    "{} and {} sections overlap",
                    a.name(),
                    b.name()
                )));
            }
        }
        Ok(())
    }
}
