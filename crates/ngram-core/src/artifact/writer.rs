use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{weight, ArtifactError, NGramHeader, Section, SectionId, WordFlags, HEADER_SIZE};
use crate::trie::WeightedTrie;

/// A fully laid-out artifact, ready to be written.
#[derive(Debug)]
pub struct ArtifactWriter {
    header: NGramHeader,
    trie: Vec<u8>,
    weights: Vec<u8>,
    word_flags: Vec<u8>,
}

impl ArtifactWriter {
    /// `weights` and `word_flags` are indexed by trie id and must cover
    /// exactly `trie.len()` ids.
    pub fn new(
        max_n: usize,
        trie: &WeightedTrie,
        weights: &[u16],
        word_flags: &WordFlags,
    ) -> Result<Self, ArtifactError> {
        let n = trie.len();
        if weights.len() != n || word_flags.len() != n {
            return Err(ArtifactError::Corrupt(format!(
                "{n} trie entries but {} weights and {} word flags",
                weights.len(),
                word_flags.len()
            )));
        }
        let max_n = u8::try_from(max_n).map_err(|_| ArtifactError::MaxNOverflow(max_n))?;

        let trie = trie.to_bytes();
        let weights = weight::to_bytes(weights);
        let word_flags = word_flags.as_bytes().to_vec();

        let mut header = NGramHeader::new(max_n, n);
        let mut offset = HEADER_SIZE;
        for (id, size) in [
            (SectionId::Trie, trie.len()),
            (SectionId::Weight, weights.len()),
            (SectionId::IsWord, word_flags.len()),
        ] {
            header.sections[id.index()] = Section { size, offset };
            offset += size;
        }

        Ok(Self {
            header,
            trie,
            weights,
            word_flags,
        })
    }

    pub fn header(&self) -> &NGramHeader {
        &self.header
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(&self.header.to_bytes())?;
        out.write_all(&self.trie)?;
        out.write_all(&self.weights)?;
        out.write_all(&self.word_flags)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header.total_size());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.trie);
        buf.extend_from_slice(&self.weights);
        buf.extend_from_slice(&self.word_flags);
        buf
    }

    /// Atomic write: write to `<path>.tmp` then rename. A failed write
    /// removes the temporary file and leaves `path` untouched.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let tmp = tmp_path(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let result = self.write_file(&tmp).and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(
            path = %path.display(),
            bytes = self.header.total_size(),
            "artifact written"
        );
        Ok(())
    }

    fn write_file(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
