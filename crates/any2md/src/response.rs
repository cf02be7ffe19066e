//! Conversion results as they leave on the wire.

use std::time::Duration;

use any2md_core::{ConversionError, ConversionOutput, ElementsCount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::DocumentType;

/// Sizes, timing and structure counts of one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub input_length: usize,
    pub output_length: usize,
    pub processing_ms: u64,
    pub elements_count: ElementsCount,
}

/// Successful conversion result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub markdown: String,
    /// Completion time, serialized as RFC 3339 in UTC
    pub timestamp: DateTime<Utc>,
    pub stats: Stats,
    #[serde(rename = "type")]
    pub kind: DocumentType,
}

impl ConversionResponse {
    pub fn new(
        kind: DocumentType,
        input_length: usize,
        output: ConversionOutput,
        elapsed: Duration,
    ) -> Self {
        let ConversionOutput { markdown, elements } = output;
        Self {
            stats: Stats {
                input_length,
                output_length: markdown.len(),
                processing_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                elements_count: elements,
            },
            markdown,
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Failure envelope: `{"error": {"code", "message", "details"}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: ConversionError,
}

impl From<ConversionError> for ErrorResponse {
    fn from(error: ConversionError) -> Self {
        Self { error }
    }
}
