use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SourceError;

/// Surface text → weight, before script conversion.
pub type RawDictionary = HashMap<String, f32>;

/// Column layout of a frequency table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsvSchema {
    /// `text,weight`
    #[default]
    TextWeight,
    /// `text,<ignored>,weight`
    TextIgnoredWeight,
}

impl CsvSchema {
    fn weight_column(self) -> usize {
        match self {
            Self::TextWeight => 1,
            Self::TextIgnoredWeight => 2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text-weight" => Some(Self::TextWeight),
            "text-ignored-weight" => Some(Self::TextIgnoredWeight),
            _ => None,
        }
    }
}

/// Parse a frequency table.
///
/// The first line is a header and is always skipped, as are blank lines and
/// rows whose text is blank. The text is kept exactly as written, so `" A"`
/// and `"A"` are different keys. A repeated text replaces the earlier row.
/// Any row with a missing or unusable weight fails the whole read. `-0` is
/// stored as `+0`.
pub fn read_frequency_csv(
    reader: impl BufRead,
    schema: CsvSchema,
) -> Result<RawDictionary, SourceError> {
    let mut dict = RawDictionary::new();
    let mut rows = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index == 0 {
            continue;
        }
        let line_no = index + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        let text = fields[0];
        if text.trim().is_empty() {
            continue;
        }

        let raw_weight = fields
            .get(schema.weight_column())
            .ok_or_else(|| SourceError::malformed(line_no, line, "missing weight field"))?;
        let weight: f32 = raw_weight.trim().parse().map_err(|e| {
            SourceError::malformed(line_no, line, format!("invalid weight {raw_weight:?}: {e}"))
        })?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(SourceError::malformed(
                line_no,
                line,
                format!("weight must be finite and non-negative, got {weight}"),
            ));
        }

        rows += 1;
        // Adding +0.0 maps -0.0 to +0.0 and leaves every other value alone.
        dict.insert(text.to_string(), weight + 0.0);
    }

    debug!(rows, unique = dict.len(), "frequency table parsed");
    Ok(dict)
}

pub fn load_frequency_csv(path: &Path, schema: CsvSchema) -> Result<RawDictionary, SourceError> {
    let file = File::open(path)?;
    read_frequency_csv(BufReader::new(file), schema)
}
