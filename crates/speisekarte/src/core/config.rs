//! Pipeline configuration loading.
//!
//! All thresholds are load-time constants: a config is built once (defaults,
//! programmatically, or from a TOML file) and shared immutably by the whole
//! pipeline run. No dynamic reconfiguration happens mid-pipeline.

use crate::error::{Result, SpeisekarteError};
use crate::grammar::decompose::DEFAULT_CAPS_ABBREVIATIONS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main pipeline configuration.
///
/// # Example
///
/// ```rust
/// use speisekarte::core::config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.fuzzy_similarity_threshold, 0.82);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Similarity ratio above which two normalized names are fuzzy
    /// duplicates.
    #[serde(default = "default_fuzzy_similarity_threshold")]
    pub fuzzy_similarity_threshold: f64,

    /// Minimum normalized name length for fuzzy comparison.
    #[serde(default = "default_fuzzy_min_name_len")]
    pub fuzzy_min_name_len: usize,

    /// Category price outliers are flagged beyond this many MADs.
    #[serde(default = "default_outlier_mad_multiplier")]
    pub outlier_mad_multiplier: f64,

    /// Minimum priced items per category for outlier detection.
    #[serde(default = "default_min_category_samples")]
    pub min_category_samples: usize,

    /// Minimum priced items per category for cross-category coherence.
    #[serde(default = "default_cross_category_min_items")]
    pub cross_category_min_items: usize,

    /// Median gap ratio below which a cross-category rule does not apply.
    #[serde(default = "default_cross_category_min_gap_ratio")]
    pub cross_category_min_gap_ratio: f64,

    /// ALL-CAPS abbreviations that suppress the caps/mixed-case name split
    /// ("BBQ Chicken Pizza" stays whole). Extendable via TOML.
    #[serde(default = "default_caps_abbreviations")]
    pub caps_abbreviations: Vec<String>,

    /// Execute auto-fixable repair recommendations at the end of the run.
    #[serde(default)]
    pub apply_auto_repairs: bool,
}

fn default_fuzzy_similarity_threshold() -> f64 {
    0.82
}

fn default_fuzzy_min_name_len() -> usize {
    4
}

fn default_outlier_mad_multiplier() -> f64 {
    3.0
}

fn default_min_category_samples() -> usize {
    3
}

fn default_cross_category_min_items() -> usize {
    2
}

fn default_cross_category_min_gap_ratio() -> f64 {
    1.3
}

fn default_caps_abbreviations() -> Vec<String> {
    DEFAULT_CAPS_ABBREVIATIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fuzzy_similarity_threshold: default_fuzzy_similarity_threshold(),
            fuzzy_min_name_len: default_fuzzy_min_name_len(),
            outlier_mad_multiplier: default_outlier_mad_multiplier(),
            min_category_samples: default_min_category_samples(),
            cross_category_min_items: default_cross_category_min_items(),
            cross_category_min_gap_ratio: default_cross_category_min_gap_ratio(),
            caps_abbreviations: default_caps_abbreviations(),
            apply_auto_repairs: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content).map_err(|e| {
            SpeisekarteError::config_with_source(format!("failed to parse config file: {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate threshold ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_similarity_threshold) {
            return Err(SpeisekarteError::config(format!(
                "fuzzy_similarity_threshold must be within [0.0, 1.0], got {}",
                self.fuzzy_similarity_threshold
            )));
        }
        if self.outlier_mad_multiplier <= 0.0 {
            return Err(SpeisekarteError::config(format!(
                "outlier_mad_multiplier must be positive, got {}",
                self.outlier_mad_multiplier
            )));
        }
        if self.cross_category_min_gap_ratio < 1.0 {
            return Err(SpeisekarteError::config(format!(
                "cross_category_min_gap_ratio must be >= 1.0, got {}",
                self.cross_category_min_gap_ratio
            )));
        }
        Ok(())
    }

    /// Abbreviation guard list as borrowed strings for the decomposer.
    pub fn abbreviations(&self) -> Vec<&str> {
        self.caps_abbreviations.iter().map(String::as_str).collect()
    }
}
