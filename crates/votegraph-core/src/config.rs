//! Tunable pipeline constants, loadable from TOML.
//!
//! Every section has a `Default` built from the `DEFAULT_*` constants, so an
//! empty or missing file yields the standard pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CoreError;

pub const DEFAULT_THRESHOLD: f64 = 0.75;
pub const DEFAULT_DATE_BONUS: f64 = 0.03;
pub const DEFAULT_DATE_SLACK_DAYS: i64 = 7;
pub const DEFAULT_PREFIX_SCALE: f64 = 0.1;
pub const DEFAULT_MAX_PREFIX: usize = 4;
pub const DEFAULT_TOP_ALLIES: usize = 10;

/// Above this the Winkler boost can push a score past 1.0 with a 4-char prefix.
const MAX_PREFIX_SCALE: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub linker: LinkerConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Minimum composite score for an event to be assigned to a law.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Added to the title score when the dates are close.
    #[serde(default = "default_date_bonus")]
    pub date_bonus: f64,
    #[serde(default = "default_date_slack_days")]
    pub date_slack_days: i64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            date_bonus: DEFAULT_DATE_BONUS,
            date_slack_days: DEFAULT_DATE_SLACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_prefix_scale")]
    pub prefix_scale: f64,
    #[serde(default = "default_max_prefix")]
    pub max_prefix: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            prefix_scale: DEFAULT_PREFIX_SCALE,
            max_prefix: DEFAULT_MAX_PREFIX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Length of the top-allies list.
    #[serde(default = "default_top_allies")]
    pub top_allies: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_allies: DEFAULT_TOP_ALLIES,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the score bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        let l = &self.linker;
        if !l.threshold.is_finite() || l.threshold < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "linker.threshold must be a non-negative number, got {}",
                l.threshold
            )));
        }
        if !l.date_bonus.is_finite() || l.date_bonus < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "linker.date_bonus must be a non-negative number, got {}",
                l.date_bonus
            )));
        }
        if l.date_slack_days < 0 {
            return Err(CoreError::InvalidConfig(format!(
                "linker.date_slack_days must be >= 0, got {}",
                l.date_slack_days
            )));
        }
        let s = &self.similarity;
        if !s.prefix_scale.is_finite() || !(0.0..=MAX_PREFIX_SCALE).contains(&s.prefix_scale) {
            return Err(CoreError::InvalidConfig(format!(
                "similarity.prefix_scale must be within 0..={MAX_PREFIX_SCALE}, got {}",
                s.prefix_scale
            )));
        }
        Ok(())
    }
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig, CoreError> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(PipelineConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    PipelineConfig::from_toml_str(&raw)
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_date_bonus() -> f64 {
    DEFAULT_DATE_BONUS
}

fn default_date_slack_days() -> i64 {
    DEFAULT_DATE_SLACK_DAYS
}

fn default_prefix_scale() -> f64 {
    DEFAULT_PREFIX_SCALE
}

fn default_max_prefix() -> usize {
    DEFAULT_MAX_PREFIX
}

fn default_top_allies() -> usize {
    DEFAULT_TOP_ALLIES
}
