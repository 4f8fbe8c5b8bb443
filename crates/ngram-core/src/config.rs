//! Build configuration loaded from TOML.
//!
//! - `parse_config_toml(text)` parses and validates without touching paths
//! - `load_config(path)` also resolves relative paths against the file's directory
//! - The documented default is embedded via `include_str!("default_build.toml")`

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::{is_known_config, CONFIG_IDS};
use crate::source::{CorpusSpec, CsvSchema};

pub const DEFAULT_BUILD_TOML: &str = include_str!("default_build.toml");

/// Returns the embedded default build configuration.
pub fn default_toml() -> &'static str {
    DEFAULT_BUILD_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    pub input: InputConfig,
    #[serde(default, rename = "corpus")]
    pub corpora: Vec<CorpusSpec>,
    #[serde(rename = "target")]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub csv: PathBuf,
    #[serde(default)]
    pub schema: CsvSchema,
}

/// One script variant: its conversion and where its artifact goes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    pub output: PathBuf,
    /// OpenCC configuration id such as `hk2s`. `None` keeps keys as written.
    #[serde(default)]
    pub conversion: Option<String>,
    #[serde(default)]
    pub convert_corpora: bool,
}

impl BuildConfig {
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Join every relative path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.input.csv);
        for corpus in &mut self.corpora {
            resolve(&mut corpus.path);
        }
        for target in &mut self.targets {
            resolve(&mut target.output);
        }
    }
}

pub fn parse_config_toml(toml_str: &str) -> Result<BuildConfig, ConfigError> {
    let config: BuildConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    let mut config = parse_config_toml(&text)?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

fn invalid(field: impl Into<String>, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.to_string(),
    }
}

fn validate(config: &BuildConfig) -> Result<(), ConfigError> {
    if config.input.csv.as_os_str().is_empty() {
        return Err(invalid("input.csv", "must not be empty"));
    }
    if config.targets.is_empty() {
        return Err(invalid("target", "at least one [[target]] is required"));
    }

    let mut names = HashSet::new();
    let mut outputs = HashSet::new();
    for (i, target) in config.targets.iter().enumerate() {
        if target.name.trim().is_empty() {
            return Err(invalid(format!("target[{i}].name"), "must not be empty"));
        }
        if !names.insert(target.name.as_str()) {
            return Err(invalid(
                format!("target[{i}].name"),
                "duplicate target name",
            ));
        }
        if target.output.as_os_str().is_empty() {
            return Err(invalid(format!("target[{i}].output"), "must not be empty"));
        }
        if !outputs.insert(&target.output) {
            return Err(invalid(
                format!("target[{i}].output"),
                "two targets write the same file",
            ));
        }
        if let Some(conversion) = &target.conversion {
            if !is_known_config(conversion) {
                return Err(invalid(
                    format!("target[{i}].conversion"),
                    &format!("unknown '{conversion}' (available: {})", CONFIG_IDS.join(", ")),
                ));
            }
        }
    }

    for (i, corpus) in config.corpora.iter().enumerate() {
        if corpus.path.as_os_str().is_empty() {
            return Err(invalid(format!("corpus[{i}].path"), "must not be empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[input]
csv = "words.csv"

[[target]]
name = "hk"
output = "hk.ngram"
"#;

    #[test]
    fn parse_default_toml() {
        let config = parse_config_toml(DEFAULT_BUILD_TOML).unwrap();
        assert_eq!(config.input.schema, CsvSchema::TextWeight);
        assert_eq!(config.corpora.len(), 2);
        assert_eq!(config.corpora[1].start_marker.as_deref(), Some("..."));
        assert_eq!(config.targets.len(), 2);

        let cn = config.target("zh-cn").unwrap();
        assert_eq!(cn.conversion.as_deref(), Some("hk2s"));
        assert!(cn.convert_corpora);
        assert_eq!(config.target("zh-hk").unwrap().conversion, None);
    }

    #[test]
    fn minimal_defaults() {
        let config = parse_config_toml(MINIMAL).unwrap();
        assert!(config.corpora.is_empty());
        let target = &config.targets[0];
        assert_eq!(target.conversion, None);
        assert!(!target.convert_corpora);
        assert_eq!(config.input.schema, CsvSchema::TextWeight);
    }

    #[test]
    fn schema_by_name() {
        let toml = MINIMAL.replace(
            "csv = \"words.csv\"",
            "csv = \"words.csv\"\nschema = \"text-ignored-weight\"",
        );
        let config = parse_config_toml(&toml).unwrap();
        assert_eq!(config.input.schema, CsvSchema::TextIgnoredWeight);

        let bad = MINIMAL.replace(
            "csv = \"words.csv\"",
            "csv = \"words.csv\"\nschema = \"weight-first\"",
        );
        assert!(matches!(parse_config_toml(&bad), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reject_no_targets() {
        let toml = "target = []\n\n[input]\ncsv = \"words.csv\"\n";
        let err = parse_config_toml(toml).unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { field, .. } if field == "target"),
            "{err}"
        );
    }

    #[test]
    fn reject_duplicate_target_name() {
        let toml = format!("{MINIMAL}\n[[target]]\nname = \"hk\"\noutput = \"other.ngram\"\n");
        let err = parse_config_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("target[1].name"), "{err}");
    }

    #[test]
    fn reject_shared_output() {
        let toml = format!("{MINIMAL}\n[[target]]\nname = \"cn\"\noutput = \"hk.ngram\"\n");
        let err = parse_config_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("target[1].output"), "{err}");
    }

    #[test]
    fn reject_empty_name() {
        let toml = MINIMAL.replace("name = \"hk\"", "name = \" \"");
        assert!(matches!(
            parse_config_toml(&toml),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn conversion_ids() {
        let ok = format!("{MINIMAL}conversion = \"HK2S\"\n");
        assert!(parse_config_toml(&ok).is_ok());

        let bad = format!("{MINIMAL}conversion = \"hk2cn\"\n");
        let err = parse_config_toml(&bad).unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { field, .. } if field == "target[0].conversion"),
            "{err}"
        );
    }

    #[test]
    fn reject_unknown_field() {
        let toml = format!("{MINIMAL}verbose = true\n");
        assert!(matches!(parse_config_toml(&toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(matches!(
            parse_config_toml("[input"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.toml");
        let toml = format!(
            "{MINIMAL}conversion = \"t2s\"\n\n[[corpus]]\npath = \"essay.txt\"\n"
        );
        std::fs::write(&path, toml).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.input.csv, dir.path().join("words.csv"));
        assert_eq!(config.corpora[0].path, dir.path().join("essay.txt"));
        let target = &config.targets[0];
        assert_eq!(target.output, dir.path().join("hk.ngram"));
        assert_eq!(target.conversion.as_deref(), Some("t2s"));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("none.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
