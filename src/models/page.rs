use serde::{Deserialize, Serialize};

/// A scanned page image handed to the OCR adapter.
#[derive(Debug, Clone)]
pub struct ScanImage {
    pub index: usize,
    /// Where the image came from (file path, archive locator, ...).
    pub source_ref: String,
    pub bytes: Vec<u8>,
}

/// One OCR'd page. Produced once per scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub raw_text: String,
    pub ocr_confidence: f32,
    /// Printed page number found on the scan, if any.
    pub page_number: Option<u32>,
    pub source_ref: String,
}

impl Page {
    pub fn new(
        index: usize,
        raw_text: impl Into<String>,
        ocr_confidence: f32,
        page_number: Option<u32>,
        source_ref: impl Into<String>,
    ) -> Self {
        Self {
            index,
            raw_text: raw_text.into(),
            ocr_confidence,
            page_number,
            source_ref: source_ref.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty()
    }
}

/// A contiguous run of pages judged to form one logical document.
///
/// Groups produced by one grouping pass partition the input: every page index
/// appears in exactly one group and groups are ordered by first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentGroup {
    /// Position of the group in the batch, starting at zero.
    pub id: usize,
    /// Page indices owned by this group, ascending and contiguous in input order.
    pub pages: Vec<usize>,
}

impl DocumentGroup {
    pub fn first_page(&self) -> usize {
        self.pages.first().copied().unwrap_or_default()
    }

    pub fn last_page(&self) -> usize {
        self.pages.last().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, page_index: usize) -> bool {
        self.pages.binary_search(&page_index).is_ok()
    }
}
