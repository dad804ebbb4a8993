//! Externally supplied pipeline configuration.
//!
//! Every tunable the core consults lives here: chunk budget, continuity
//! threshold, classification minimum, relevance table. Each section falls back
//! to its defaults when absent, so a config file only names what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::classify::ClassificationConfig;
use crate::pipeline::entities::ExtractionConfig;
use crate::pipeline::grouping::GroupingConfig;
use crate::pipeline::relevance::RelevanceConfig;
use crate::pipeline::translation::TranslationConfig;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Batch-level scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Documents processed concurrently.
    pub document_workers: usize,
    /// Pages with less normalized text than this count as blank for grouping.
    pub min_page_chars: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            document_workers: 2,
            min_page_chars: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub grouping: GroupingConfig,
    pub translation: TranslationConfig,
    pub classification: ClassificationConfig,
    pub extraction: ExtractionConfig,
    pub relevance: RelevanceConfig,
    pub batch: BatchConfig,
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "Pipeline config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grouping = &self.grouping;
        if !(0.0..=1.0).contains(&grouping.continuity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "grouping.continuity_threshold must be within [0, 1], got {}",
                grouping.continuity_threshold
            )));
        }
        if grouping.ambiguity_margin.is_nan() || grouping.ambiguity_margin < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grouping.ambiguity_margin must not be negative, got {}",
                grouping.ambiguity_margin
            )));
        }
        if self.translation.max_chunk_size == 0 {
            return Err(ConfigError::Invalid("translation.max_chunk_size must be positive".into()));
        }
        if self.translation.workers == 0 {
            return Err(ConfigError::Invalid("translation.workers must be at least 1".into()));
        }
        if self.translation.timeout_secs == 0 {
            return Err(ConfigError::Invalid("translation.timeout_secs must be positive".into()));
        }
        if self.batch.document_workers == 0 {
            return Err(ConfigError::Invalid("batch.document_workers must be at least 1".into()));
        }
        if self.classification.min_match.is_nan() || self.classification.min_match <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "classification.min_match must be positive, got {}",
                self.classification.min_match
            )));
        }

        let table = &self.relevance.table;
        if let Some(doc_type) = table.duplicate_type() {
            return Err(ConfigError::Invalid(format!(
                "relevance.table lists {doc_type} in more than one tier"
            )));
        }
        if let Some(tier) = table.non_monotonic_tier() {
            return Err(ConfigError::Invalid(format!(
                "relevance.table ranks fewer entities above more for the {tier} tier"
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
