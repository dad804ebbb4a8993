//! Page grouping: partitions an ordered page sequence into documents.
//!
//! One forward pass over the pages, no look-ahead and no backtracking. Each
//! page after the first is scored against a running anchor of the open group
//! and either joins it or opens a new group.

pub mod engine;
pub mod signals;
pub mod table;

pub use engine::*;

use serde::{Deserialize, Serialize};

use crate::models::DocumentGroup;

/// Grouping thresholds. Defaults are calibrated for typewritten notarial
/// records; tests override them freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// A page joins the open group when its continuity score exceeds this.
    pub continuity_threshold: f32,
    /// Scores within this distance of the threshold are ambiguous and merge.
    pub ambiguity_margin: f32,
    /// Words kept in the running anchor signature.
    pub signature_vocabulary: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            continuity_threshold: 0.35,
            ambiguity_margin: 0.10,
            signature_vocabulary: 48,
        }
    }
}

/// What the grouping engine needs to know about one page.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub index: usize,
    pub page_number: Option<u32>,
    /// Normalized page text.
    pub text: &'a str,
    /// File or locator the page was scanned from.
    pub source_ref: &'a str,
}

impl PageView<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Heuristic evidence that moved a continuity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuitySignal {
    PageNumberConsecutive,
    PageNumberRestart,
    PageNumberBreak,
    ContinuationFragment,
    TableContinuation,
    VocabularyOverlap,
    NewDocumentHeading,
    UntypedTitle,
    ClosingSignature,
    SharedSourceStem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHit {
    pub signal: ContinuitySignal,
    pub weight: f32,
}

/// Audit record for one continuity decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingDecision {
    pub page_index: usize,
    pub score: f32,
    pub joined: bool,
    pub signals: Vec<SignalHit>,
    /// Score fell inside the ambiguity margin and the page was merged.
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingOutcome {
    pub groups: Vec<DocumentGroup>,
    /// One decision per page after the first, in page order.
    pub decisions: Vec<GroupingDecision>,
}

impl GroupingOutcome {
    pub fn decision_for(&self, page_index: usize) -> Option<&GroupingDecision> {
        self.decisions.iter().find(|d| d.page_index == page_index)
    }

    pub fn ambiguous_pages(&self) -> Vec<usize> {
        self.decisions
            .iter()
            .filter(|d| d.ambiguous)
            .map(|d| d.page_index)
            .collect()
    }
}
