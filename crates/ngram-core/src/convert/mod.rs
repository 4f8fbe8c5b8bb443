//! Script/variant conversion and post-conversion deduplication.
//!
//! A [`ScriptConverter`] maps one written variant to another (for example
//! Traditional to Simplified). [`normalize`] pushes every raw key through a
//! converter and merges keys that collide, keeping the larger weight. Ties
//! are broken by `f32::total_cmp`, so `+0.0` beats `-0.0` whatever the
//! iteration order.

mod opencc;
#[cfg(test)]
mod tests;

use std::collections::HashMap;

use tracing::debug;

use crate::source::RawDictionary;
use crate::unicode::code_point_len;

pub use opencc::{is_known_config, ConvertError, OpenccConverter, CONFIG_IDS};

/// Deterministic, many-to-one text transformation.
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl ScriptConverter for IdentityConverter {
    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Converted text → weight, safe to deduplicate by plain equality.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDictionary {
    pub entries: HashMap<String, f32>,
    /// Longest key, in code points.
    pub max_n: usize,
    /// Raw keys that landed on an already-present converted key.
    pub collisions: usize,
}

impl NormalizedDictionary {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert every key of `raw` and merge collisions by maximum weight.
pub fn normalize(raw: &RawDictionary, converter: &dyn ScriptConverter) -> NormalizedDictionary {
    let mut entries: HashMap<String, f32> = HashMap::with_capacity(raw.len());
    let mut collisions = 0usize;

    for (text, &weight) in raw {
        let converted = converter.convert(text);
        if converted.is_empty() {
            continue;
        }
        match entries.get_mut(&converted) {
            Some(existing) => {
                collisions += 1;
                if weight.total_cmp(existing).is_gt() {
                    *existing = weight;
                }
            }
            None => {
                entries.insert(converted, weight);
            }
        }
    }

    let max_n = entries.keys().map(|k| code_point_len(k)).max().unwrap_or(0);
    debug!(raw = raw.len(), normalized = entries.len(), collisions, max_n);

    NormalizedDictionary {
        entries,
        max_n,
        collisions,
    }
}
