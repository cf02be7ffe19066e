//! Structural statistics reported alongside the Markdown output.

use serde::{Deserialize, Serialize};

/// Counts of structural elements found in the source document.
///
/// The PDF path only fills `headings`, `paragraphs` and `lists`; the other
/// counters cannot be derived from plain extracted text and stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementsCount {
    pub headings: usize,
    pub paragraphs: usize,
    pub links: usize,
    pub images: usize,
    pub lists: usize,
    pub code_blocks: usize,
    pub tables: usize,
}

/// Result of one conversion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub markdown: String,
    pub elements: ElementsCount,
}

impl ConversionOutput {
    pub fn new(markdown: String, elements: ElementsCount) -> Self {
        Self { markdown, elements }
    }
}
