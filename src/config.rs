// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};
use tracing::{debug, info};

use crate::classify::BucketThresholds;
use crate::error::RankError;
use crate::fetch::SheetConfig;
use crate::process::date_parser::{DateFormat, DateParser, DEFAULT_DATE_FORMATS};
use crate::range::{default_presets, RangePreset};

/// Everything the pipeline can be tuned with. Every field has a default, so
/// an empty YAML document is a valid config.
///
/// ```yaml
/// metadata_column_count: 4
/// accepted_date_formats: [MM-DD-YYYY, MM/DD/YYYY]
/// bucket_thresholds: { top3: 3, top5: 5, top10: 10 }
/// range_presets:
///   - { name: Last 7 days, days: 7 }
/// sheet:
///   platform_gids: { android: "0", ios: "1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Leading columns before the first rank column, keyword included.
    pub metadata_column_count: usize,
    /// Header formats in priority order.
    pub accepted_date_formats: Vec<DateFormat>,
    pub bucket_thresholds: BucketThresholds,
    pub range_presets: Vec<RangePreset>,
    pub sheet: SheetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata_column_count: 4,
            accepted_date_formats: DEFAULT_DATE_FORMATS.to_vec(),
            bucket_thresholds: BucketThresholds::default(),
            range_presets: default_presets(),
            sheet: SheetConfig::default(),
        }
    }
}

impl Config {
    /// Read and validate a YAML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("loading config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                debug!("no config file given; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // serde_yaml reads an empty document as unit, not an empty map
        let config: Config = if text.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(text).context("parsing YAML config")?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.metadata_column_count == 0 {
            return Err(RankError::InvalidConfig(
                "metadata_column_count must include the keyword column (>= 1)".into(),
            ));
        }
        if self.accepted_date_formats.is_empty() {
            return Err(RankError::InvalidConfig(
                "accepted_date_formats must not be empty".into(),
            ));
        }
        self.bucket_thresholds.validate()?;

        let mut seen = HashSet::new();
        for preset in &self.range_presets {
            if preset.days == 0 {
                return Err(RankError::InvalidConfig(format!(
                    "range preset `{}` must span at least one day",
                    preset.name
                )));
            }
            if !seen.insert(preset.name.to_lowercase()) {
                return Err(RankError::InvalidConfig(format!(
                    "duplicate range preset `{}`",
                    preset.name
                )));
            }
        }
        Ok(())
    }

    /// Parser for rank-column headers.
    pub fn date_parser(&self) -> DateParser {
        DateParser::new(self.accepted_date_formats.clone())
    }

    /// Parser for dates a user supplies on the command line.
    pub fn user_date_parser(&self) -> DateParser {
        self.date_parser().with_iso_fallback()
    }
}
