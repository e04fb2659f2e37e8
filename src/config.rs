//! Pipeline configuration.
//!
//! Every marker vocabulary the stages close over lives here so callers (and tests) can swap it
//! out. [`NormalizeConfig::default`] carries the vocabulary used for the report catalog; a TOML
//! file can override any subset of fields:
//!
//! ```toml
//! excluded_sheets = ["Overview", "Content", "Lists", "Notes"]
//! drop_first_merged_row = false
//!
//! [aggregate_markers]
//! markers = ["Grand Total", "in %"]
//! case_sensitive = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NormalizeError, NormalizeResult};

/// A set of marker phrases matched as substrings of a cell's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSet {
    /// Phrases to look for.
    pub markers: Vec<String>,
    /// When `false`, both sides are lowercased before matching.
    pub case_sensitive: bool,
}

impl MarkerSet {
    /// Case-sensitive marker set.
    pub fn case_sensitive<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            case_sensitive: true,
        }
    }

    /// Case-insensitive marker set.
    pub fn case_insensitive<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            case_sensitive: false,
        }
    }

    /// `true` if `text` contains any non-empty marker.
    pub fn matches(&self, text: &str) -> bool {
        let mut markers = self.markers.iter().filter(|m| !m.is_empty());
        if self.case_sensitive {
            return markers.any(|m| text.contains(m.as_str()));
        }
        let haystack = text.to_lowercase();
        markers.any(|m| haystack.contains(&m.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::case_insensitive(Vec::<String>::new())
    }
}

/// Configuration shared by all stages of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Sheet names removed by the boilerplate stage (exact match).
    pub excluded_sheets: Vec<String>,
    /// Phrases that mark a row as survey metadata.
    pub metadata_markers: MarkerSet,
    /// Phrases that mark a column as an aggregate or percentage column.
    pub aggregate_markers: MarkerSet,
    /// Prefix for generated header names (`Column_3`).
    pub placeholder_prefix: String,
    /// Name of the single sheet produced by the merge stage.
    pub merged_sheet_name: String,
    /// Delete the first row of the merged sheet after concatenation.
    pub drop_first_merged_row: bool,
    /// Name of the output directory created next to each input file.
    pub output_dir_name: String,
    /// File-name substring that tags discovered files as specially formatted.
    pub special_format_marker: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            excluded_sheets: vec!["Overview".into(), "Content".into(), "Lists".into()],
            metadata_markers: MarkerSet::case_insensitive([
                "Survey Name:",
                "Base n =",
                "Question Type:",
                "Sample Size n =",
                "Population:",
                "¹Low base:",
                "Survey period",
            ]),
            aggregate_markers: MarkerSet::case_sensitive(["Grand Total", "in %"]),
            placeholder_prefix: "Column_".into(),
            merged_sheet_name: "Merged Data".into(),
            drop_first_merged_row: true,
            output_dir_name: "transformed".into(),
            special_format_marker: "adv".into(),
        }
    }
}

impl NormalizeConfig {
    /// Parse a TOML document; missing fields fall back to [`Default`].
    pub fn from_toml_str(s: &str) -> NormalizeResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> NormalizeResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject values the runner cannot work with.
    pub fn validate(&self) -> NormalizeResult<()> {
        let name = self.output_dir_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(config_err(format!(
                "output_dir_name must be a single path component, got '{}'",
                self.output_dir_name
            )));
        }
        if self.placeholder_prefix.trim().is_empty() {
            return Err(config_err("placeholder_prefix must not be blank"));
        }
        validate_sheet_name(&self.merged_sheet_name)
    }
}

// Excel's own limits on worksheet names.
fn validate_sheet_name(name: &str) -> NormalizeResult<()> {
    if name.trim().is_empty() {
        return Err(config_err("merged_sheet_name must not be blank"));
    }
    if name.chars().count() > 31 {
        return Err(config_err(format!(
            "merged_sheet_name '{name}' exceeds 31 characters"
        )));
    }
    if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
        return Err(config_err(format!(
            "merged_sheet_name '{name}' contains a character Excel does not allow"
        )));
    }
    Ok(())
}

fn config_err(message: impl Into<String>) -> NormalizeError {
    NormalizeError::Config {
        message: message.into(),
    }
}
