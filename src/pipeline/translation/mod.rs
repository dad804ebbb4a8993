pub mod chunker;
pub mod language_detect;
pub mod repetition;
pub mod translator;

pub use chunker::{plan_chunks, ChunkPlan, TranslationChunk};
pub use language_detect::detect_language;
pub use translator::*;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::models::Language;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Translation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Translation engine error: {0}")]
    Engine(String),

    #[error("Translation worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Translation model abstraction. Loaded once per process and shared by
/// every document; calls block, so the translator runs them off the async
/// workers.
pub trait TranslationEngine: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Character budget per chunk.
    pub max_chunk_size: usize,
    /// Concurrent adapter calls per document.
    pub workers: usize,
    pub timeout_secs: u64,
    /// `None` ("auto") detects the language per document.
    #[serde(with = "auto_language")]
    pub source_language: Option<Language>,
    pub target_language: Language,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1200,
            workers: 2,
            timeout_secs: 120,
            source_language: None,
            target_language: Language::English,
        }
    }
}

/// `"auto"` on the wire for an unset source language.
mod auto_language {
    use super::*;

    const AUTO: &str = "auto";

    pub fn serialize<S: Serializer>(value: &Option<Language>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map_or(AUTO, |lang| lang.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Language>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == AUTO {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}
