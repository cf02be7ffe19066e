//! Heuristic line classification for extracted PDF text.
//!
//! Extracted text carries no structure, so each non-blank line is guessed
//! to be a heading, a list item or a paragraph. The heading test runs first
//! and accepts any short line without a period.

use std::fmt;

use any2md_core::ElementsCount;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use tracing::trace;

static HEADING_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        // ALL CAPS
        r"^[A-Z][A-Z\s]{2,}$",
        // "1. Title"
        r"^[0-9]+\.\s+[A-Z]",
        // Title Case
        r"^[A-Z][a-z]+(\s+[A-Z][a-z]*)*$",
        r"^CHAPTER\s+[0-9]+",
        r"^SECTION\s+[0-9]+",
    ])
    .unwrap()
});

static LIST_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"^[•·▪▫‣⁃]\s+",
        r"^[-*+]\s+",
        r"^[0-9]+\.\s+",
        r"^[a-zA-Z]\.\s+",
        r"^[ivxlcdm]+\.\s+",
    ])
    .unwrap()
});

static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•·▪▫‣⁃\-*+]\s+").unwrap());

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.\s+").unwrap());

/// Characters stripped from the start of a list item before re-marking it
const BULLET_GLYPHS: &[char] = &['•', '·', '▪', '▫', '‣', '⁃', '-', '*', '+'];

/// Inserted after every page that produced output, except the last
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Structural role guessed for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading level 1-3
    Heading(u8),
    ListItem,
    Paragraph,
}

/// Whether a trimmed line looks like a heading.
///
/// Lines opening with a bullet marker only qualify through the explicit
/// patterns, never through the short-line fallback.
pub fn is_heading(line: &str) -> bool {
    if HEADING_PATTERNS.is_match(line) {
        return true;
    }
    !BULLET_MARKER.is_match(line) && line.chars().count() < 100 && !line.contains('.')
}

pub fn heading_level(line: &str) -> u8 {
    let length = line.chars().count();
    if length < 20 || NUMBERED.is_match(line) {
        1
    } else if length < 50 {
        2
    } else {
        3
    }
}

pub fn is_list_item(line: &str) -> bool {
    LIST_PATTERNS.is_match(line)
}

/// A non-blank line of page text with its guessed role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLine {
    pub text: String,
    pub kind: LineKind,
}

impl PdfLine {
    /// Classify a raw line; blank lines yield `None`
    pub fn classify(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        let kind = if is_heading(text) {
            LineKind::Heading(heading_level(text))
        } else if is_list_item(text) {
            LineKind::ListItem
        } else {
            LineKind::Paragraph
        };

        Some(Self {
            text: text.to_string(),
            kind,
        })
    }

    /// Record this line in the element counts
    pub fn count(&self, counts: &mut ElementsCount) {
        match self.kind {
            LineKind::Heading(_) => counts.headings += 1,
            LineKind::ListItem => counts.lists += 1,
            LineKind::Paragraph => counts.paragraphs += 1,
        }
    }
}

impl fmt::Display for PdfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LineKind::Heading(level) => {
                write!(f, "{} {}", "#".repeat(usize::from(level)), self.text)
            }
            LineKind::ListItem => {
                let item = self.text.trim_start_matches(BULLET_GLYPHS).trim();
                write!(f, "- {}", item)
            }
            LineKind::Paragraph => f.write_str(&self.text),
        }
    }
}

/// Convert one page of extracted text, updating `counts`
pub fn process_page(text: &str, counts: &mut ElementsCount) -> String {
    text.lines()
        .filter_map(PdfLine::classify)
        .map(|line| {
            trace!(kind = ?line.kind, text = %line.text, "classified PDF line");
            line.count(counts);
            line.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
