use serde::{Deserialize, Serialize};

use super::enums::{EntityKind, TextSource};

/// A typed span found in document text.
///
/// `offset` is a byte offset into the text named by `source`. Spans may
/// overlap freely; only (source, kind, offset) identifies an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub text: String,
    pub offset: usize,
    pub source: TextSource,
    /// Finer role such as "notary", "heir", "protocol", "registry".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Canonical form when one could be derived (ISO date, plain number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

impl Entity {
    pub fn new(kind: EntityKind, text: impl Into<String>, offset: usize, source: TextSource) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            source,
            label: None,
            normalized: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_normalized(mut self, normalized: impl Into<String>) -> Self {
        self.normalized = Some(normalized.into());
        self
    }

    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}
