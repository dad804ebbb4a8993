use std::collections::BTreeMap;

use crate::models::DocumentGroup;

use super::signals::{self, Heading, NumberRelation};
use crate::pipeline::ingest::source_name::document_stem;
use super::{
    ContinuitySignal, GroupingConfig, GroupingDecision, GroupingOutcome, PageView, SignalHit,
};

/// Running summary of the open group.
#[derive(Debug, Default)]
struct Anchor {
    /// Word frequencies over every page in the group.
    word_counts: BTreeMap<String, usize>,
    /// Position in the input and printed number of the last numbered page.
    last_numbered: Option<(usize, u32)>,
    /// Text of the last non-blank page, for boundary signals.
    last_text: Option<String>,
    /// Document stem of the last non-blank page's source file.
    last_stem: Option<String>,
}

impl Anchor {
    fn absorb(&mut self, position: usize, page: &PageView<'_>) {
        if page.is_blank() {
            return;
        }
        for (word, count) in signals::word_counts(page.text) {
            *self.word_counts.entry(word).or_insert(0) += count;
        }
        if let Some(number) = page.page_number {
            self.last_numbered = Some((position, number));
        }
        self.last_text = Some(page.text.to_string());
        self.last_stem = document_stem(page.source_ref);
    }
}

/// Incremental grouper: feed pages in order with [`PageGrouper::push`], then
/// [`PageGrouper::finish`].
pub struct PageGrouper<'c> {
    config: &'c GroupingConfig,
    groups: Vec<DocumentGroup>,
    current: Vec<usize>,
    anchor: Anchor,
    decisions: Vec<GroupingDecision>,
    position: usize,
}

impl<'c> PageGrouper<'c> {
    pub fn new(config: &'c GroupingConfig) -> Self {
        Self {
            config,
            groups: Vec::new(),
            current: Vec::new(),
            anchor: Anchor::default(),
            decisions: Vec::new(),
            position: 0,
        }
    }

    pub fn push(&mut self, page: &PageView<'_>) {
        let position = self.position;
        self.position += 1;

        if self.current.is_empty() {
            self.current.push(page.index);
            self.anchor.absorb(position, page);
            return;
        }

        let decision = self.decide(position, page);
        tracing::debug!(
            page = page.index,
            score = decision.score,
            joined = decision.joined,
            signals = ?decision.signals.iter().map(|h| h.signal).collect::<Vec<_>>(),
            "Continuity decision"
        );
        if decision.ambiguous {
            tracing::debug!(
                page = page.index,
                score = decision.score,
                threshold = self.config.continuity_threshold,
                "Grouping ambiguity resolved by merging"
            );
        }

        if !decision.joined {
            self.close_group();
        }
        self.current.push(page.index);
        self.anchor.absorb(position, page);
        self.decisions.push(decision);
    }

    pub fn finish(mut self) -> GroupingOutcome {
        if !self.current.is_empty() {
            self.close_group();
        }
        tracing::info!(
            groups = self.groups.len(),
            pages = self.position,
            ambiguous = self.decisions.iter().filter(|d| d.ambiguous).count(),
            "Page grouping complete"
        );
        GroupingOutcome {
            groups: self.groups,
            decisions: self.decisions,
        }
    }

    fn close_group(&mut self) {
        let pages = std::mem::take(&mut self.current);
        self.groups.push(DocumentGroup {
            id: self.groups.len(),
            pages,
        });
        self.anchor = Anchor::default();
    }

    fn decide(&self, position: usize, page: &PageView<'_>) -> GroupingDecision {
        // Blank pages carry no evidence and stay with the open group.
        let hits = if page.is_blank() {
            Vec::new()
        } else {
            self.collect_signals(position, page)
        };

        let score = (signals::BASE_SCORE + hits.iter().map(|h| h.weight).sum::<f32>()).clamp(0.0, 1.0);
        let threshold = self.config.continuity_threshold;
        let ambiguous = (score - threshold).abs() <= self.config.ambiguity_margin;

        GroupingDecision {
            page_index: page.index,
            score,
            joined: score > threshold || ambiguous,
            signals: hits,
            ambiguous,
        }
    }

    fn collect_signals(&self, position: usize, page: &PageView<'_>) -> Vec<SignalHit> {
        let mut hits = Vec::new();
        let mut hit = |signal, weight| hits.push(SignalHit { signal, weight });

        if let (Some((last_position, last)), Some(number)) =
            (self.anchor.last_numbered, page.page_number)
        {
            match signals::page_number_relation(last, position - last_position, number) {
                NumberRelation::Consecutive => {
                    hit(ContinuitySignal::PageNumberConsecutive, signals::PAGE_NUMBER_CONSECUTIVE)
                }
                NumberRelation::Restart => {
                    hit(ContinuitySignal::PageNumberRestart, signals::PAGE_NUMBER_RESTART)
                }
                NumberRelation::Break => {
                    hit(ContinuitySignal::PageNumberBreak, signals::PAGE_NUMBER_BREAK)
                }
            }
        }

        if let Some(previous) = self.anchor.last_text.as_deref() {
            if signals::is_continuation_fragment(previous, page.text) {
                hit(ContinuitySignal::ContinuationFragment, signals::CONTINUATION_FRAGMENT);
            }
            if super::table::is_table_continuation(previous, page.text) {
                hit(ContinuitySignal::TableContinuation, signals::TABLE_CONTINUATION);
            }
            if signals::has_closing(previous) {
                hit(ContinuitySignal::ClosingSignature, signals::CLOSING_SIGNATURE);
            }
        }

        match signals::detect_heading(page.text) {
            Some(Heading::Typed) => hit(ContinuitySignal::NewDocumentHeading, signals::NEW_DOCUMENT_HEADING),
            Some(Heading::Untyped) => hit(ContinuitySignal::UntypedTitle, signals::UNTYPED_TITLE),
            None => {}
        }

        if let (Some(last), Some(stem)) = (self.anchor.last_stem.as_deref(), document_stem(page.source_ref)) {
            if last == stem {
                hit(ContinuitySignal::SharedSourceStem, signals::SHARED_SOURCE_STEM);
            }
        }

        let size = self.config.signature_vocabulary;
        let anchor_signature = signals::signature(&self.anchor.word_counts, size);
        let page_counts = signals::word_counts(page.text);
        let page_signature = signals::signature(&page_counts, size);
        let overlap = signals::jaccard(&anchor_signature, &page_signature);
        if overlap > 0.0 {
            hit(ContinuitySignal::VocabularyOverlap, signals::VOCABULARY_OVERLAP * overlap);
        }

        hits
    }
}

/// Partitions pages into document groups with a single forward pass.
#[derive(Debug, Clone, Default)]
pub struct GroupingEngine {
    config: GroupingConfig,
}

impl GroupingEngine {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Group `pages`, which must be in scan order.
    pub fn group(&self, pages: &[PageView<'_>]) -> GroupingOutcome {
        pages
            .iter()
            .fold(PageGrouper::new(&self.config), |mut grouper, page| {
                grouper.push(page);
                grouper
            })
            .finish()
    }
}
