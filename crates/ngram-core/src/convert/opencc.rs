use std::fmt;

use opencc_fmmseg::OpenCC;

use super::ScriptConverter;

/// Conversion configurations understood by [`OpenccConverter`], named the
/// way OpenCC names its `.json` configs.
pub const CONFIG_IDS: &[&str] = &[
    "s2t", "s2tw", "s2twp", "s2hk", "t2s", "t2tw", "t2twp", "t2hk", "tw2s", "tw2sp", "tw2t",
    "tw2tp", "hk2s", "hk2t", "jp2t", "t2jp",
];

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unknown conversion '{0}' (available: {list})", list = CONFIG_IDS.join(", "))]
    UnknownConfig(String),
}

/// Whether `config` names a known conversion, ignoring ASCII case.
pub fn is_known_config(config: &str) -> bool {
    CONFIG_IDS
        .iter()
        .any(|id| id.eq_ignore_ascii_case(config))
}

/// OpenCC conversion with the bundled dictionaries, segmented by forward
/// maximum matching. Punctuation is left as written.
pub struct OpenccConverter {
    engine: OpenCC,
    config: String,
}

impl OpenccConverter {
    pub fn new(config: &str) -> Result<Self, ConvertError> {
        if !is_known_config(config) {
            return Err(ConvertError::UnknownConfig(config.to_string()));
        }
        Ok(Self {
            engine: OpenCC::new(),
            config: config.to_ascii_lowercase(),
        })
    }

    pub fn config(&self) -> &str {
        &self.config
    }
}

impl fmt::Debug for OpenccConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenccConverter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScriptConverter for OpenccConverter {
    fn convert(&self, text: &str) -> String {
        self.engine.convert(text, &self.config, false)
    }
}
