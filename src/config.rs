//! Engine configuration.

use crate::vocabulary::Vocabulary;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Threshold {name} must be within 0..=100, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("maxSampleRows must be at least 1")]
    ZeroSampleRows,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizerConfig {
    /// Minimum single-column redundancy (percent) for a column to be flagged.
    pub redundancy_threshold_single_column: f64,
    /// Minimum redundancy (percent) for an identifier combination to be flagged.
    pub redundancy_threshold_combination: f64,
    /// Rows sampled for content-based type inference and sample INSERTs.
    pub max_sample_rows: usize,
    pub emit_sample_data: bool,
    pub emit_views: bool,
    pub vocabulary: Vocabulary,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            redundancy_threshold_single_column: 20.0,
            redundancy_threshold_combination: 70.0,
            max_sample_rows: 20,
            emit_sample_data: false,
            emit_views: false,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl NormalizerConfig {
    /// Parse a JSON configuration; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (
                "redundancyThresholdSingleColumn",
                self.redundancy_threshold_single_column,
            ),
            (
                "redundancyThresholdCombination",
                self.redundancy_threshold_combination,
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.max_sample_rows == 0 {
            return Err(ConfigError::ZeroSampleRows);
        }
        Ok(())
    }
}
