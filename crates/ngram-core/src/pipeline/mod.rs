//! End-to-end build: frequency table and corpora in, one artifact per target out.
//!
//! The frequency table and the corpora are read once. Every target then runs
//! normalize → trie → serialize on its own, sharing nothing mutable.


use std::borrow::Cow;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, debug_span, info};

use crate::artifact::{weight, ArtifactError, ArtifactWriter, NGramHeader, WordFlags};
use crate::config::{BuildConfig, ConfigError, TargetConfig};
use crate::convert::{normalize, ConvertError, IdentityConverter, OpenccConverter, ScriptConverter};
use crate::source::{load_frequency_csv, CorpusSpec, RawDictionary, SourceError, WordSet};
use crate::trie::{TrieError, WeightedTrie};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{}: {source}", path.display())]
    Source { path: PathBuf, source: SourceError },

    #[error(transparent)]
    Conversion(#[from] ConvertError),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: ArtifactError,
    },

    #[error("trie build failed: {0}")]
    Trie(#[from] TrieError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unknown target: {0}")]
    UnknownTarget(String),
}

/// Counters gathered while compiling one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileStats {
    /// Rows in the raw dictionary, before conversion.
    pub raw_entries: usize,
    /// Raw keys merged into another key by conversion.
    pub collisions: usize,
    /// N: keys in the trie.
    pub entries: usize,
    pub max_n: usize,
    /// Keys whose word flag is set.
    pub words: usize,
    pub trie_nodes: usize,
}

#[derive(Debug)]
pub struct Compiled {
    pub writer: ArtifactWriter,
    pub stats: CompileStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub target: String,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: CompileStats,
    pub header: NGramHeader,
    pub file_size: usize,
}

/// Normalize `raw`, index it and lay out the artifact in memory.
///
/// Keys are flagged as words by exact membership in `words`; nothing about
/// the trie shape influences the flag.
pub fn compile(
    raw: &RawDictionary,
    words: &WordSet,
    converter: &dyn ScriptConverter,
) -> Result<Compiled, BuildError> {
    let dict = {
        let _span = debug_span!("normalize", raw = raw.len()).entered();
        normalize(raw, converter)
    };

    let trie = {
        let _span = debug_span!("trie_build", keys = dict.len()).entered();
        WeightedTrie::build(dict.entries.iter().map(|(k, &w)| (k.as_str(), w)))?
    };

    let mut weights = vec![0u16; trie.len()];
    let mut word_flags = WordFlags::new(trie.len());
    for (key, &w) in &dict.entries {
        let id = trie.lookup(key).ok_or_else(|| {
            ArtifactError::Corrupt(format!("key {key:?} missing from the built trie"))
        })? as usize;
        weights[id] = weight::encode(w);
        if words.contains(key) {
            word_flags.set(id, true);
        }
    }

    let stats = CompileStats {
        raw_entries: raw.len(),
        collisions: dict.collisions,
        entries: trie.len(),
        max_n: dict.max_n,
        words: word_flags.count_set(),
        trie_nodes: trie.node_count(),
    };
    debug!(
        entries = stats.entries,
        words = stats.words,
        nodes = stats.trie_nodes,
        "compiled"
    );

    let writer = ArtifactWriter::new(dict.max_n, &trie, &weights, &word_flags)?;
    Ok(Compiled { writer, stats })
}

/// Converter for a target's OpenCC configuration id. `None` means identity.
pub fn load_converter(conversion: Option<&str>) -> Result<Box<dyn ScriptConverter>, BuildError> {
    Ok(match conversion {
        Some(config) => {
            let _span = debug_span!("opencc_load", config).entered();
            Box::new(OpenccConverter::new(config)?)
        }
        None => Box::new(IdentityConverter),
    })
}

/// Union of every corpus's words.
pub fn load_word_set(corpora: &[CorpusSpec]) -> Result<WordSet, BuildError> {
    let _span = debug_span!("corpora", count = corpora.len()).entered();
    let mut words = WordSet::new();
    for corpus in corpora {
        let read = words
            .extend_from_corpus(corpus)
            .map_err(|source| BuildError::Source {
                path: corpus.path.clone(),
                source,
            })?;
        debug!(path = %corpus.path.display(), lines = read, "corpus loaded");
    }
    Ok(words)
}

/// Compile and write one target.
pub fn build_target(
    raw: &RawDictionary,
    words: &WordSet,
    target: &TargetConfig,
) -> Result<BuildReport, BuildError> {
    let _span = debug_span!("target", name = %target.name).entered();

    let converter = load_converter(target.conversion.as_deref())?;
    let words = if target.convert_corpora {
        Cow::Owned(words.converted(converter.as_ref()))
    } else {
        Cow::Borrowed(words)
    };

    let Compiled { writer, stats } = compile(raw, &words, converter.as_ref())?;
    writer
        .save(&target.output)
        .map_err(|source| BuildError::Write {
            path: target.output.clone(),
            source,
        })?;

    let header = writer.header().clone();
    let file_size = header.total_size();
    info!(
        name = %target.name,
        output = %target.output.display(),
        entries = stats.entries,
        collisions = stats.collisions,
        max_n = stats.max_n,
        words = stats.words,
        bytes = file_size,
        "target built"
    );

    Ok(BuildReport {
        target: target.name.clone(),
        output: target.output.clone(),
        stats,
        header,
        file_size,
    })
}

/// Build every target of `config`, or only those named in `only`.
///
/// Unknown names are rejected before any input is read. The first failure
/// stops the run; artifacts of targets finished earlier stay on disk.
pub fn run(config: &BuildConfig, only: &[String]) -> Result<Vec<BuildReport>, BuildError> {
    if let Some(name) = only.iter().find(|n| config.target(n).is_none()) {
        return Err(BuildError::UnknownTarget(name.clone()));
    }

    let raw = {
        let _span = debug_span!("load_csv").entered();
        load_frequency_csv(&config.input.csv, config.input.schema).map_err(|source| {
            BuildError::Source {
                path: config.input.csv.clone(),
                source,
            }
        })?
    };
    info!(path = %config.input.csv.display(), entries = raw.len(), "frequency table loaded");

    let words = load_word_set(&config.corpora)?;
    info!(corpora = config.corpora.len(), words = words.len(), "word set loaded");

    config
        .targets
        .iter()
        .filter(|t| only.is_empty() || only.contains(&t.name))
        .map(|target| build_target(&raw, &words, target))
        .collect()
}
