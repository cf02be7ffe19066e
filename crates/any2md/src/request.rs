//! Conversion requests as they arrive on the wire.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use any2md_core::{ConversionError, ConversionOptions, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Largest accepted HTML payload, in bytes
pub const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Largest accepted PDF payload, in bytes of base64 text
pub const MAX_PDF_SIZE: usize = 50 * 1024 * 1024;

/// Source format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Html,
    Pdf,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Html => "html",
            DocumentType::Pdf => "pdf",
        }
    }

    fn max_size(&self) -> usize {
        match self {
            DocumentType::Html => MAX_HTML_SIZE,
            DocumentType::Pdf => MAX_PDF_SIZE,
        }
    }
}

impl FromStr for DocumentType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(DocumentType::Html),
            "pdf" => Ok(DocumentType::Pdf),
            _ => Err(ConversionError::validation(format!(
                "unsupported conversion type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded document ready for conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    Html(Cow<'a, str>),
    Pdf(Cow<'a, [u8]>),
}

impl Document<'_> {
    pub fn kind(&self) -> DocumentType {
        match self {
            Document::Html(_) => DocumentType::Html,
            Document::Pdf(_) => DocumentType::Pdf,
        }
    }

    /// Input length reported in the response stats
    pub fn len(&self) -> usize {
        match self {
            Document::Html(html) => html.len(),
            Document::Pdf(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A conversion request.
///
/// PDF content travels as standard base64. Requests written before `type`
/// existed carry HTML in the `html` field instead of `content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub options: ConversionOptions,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html: String,
}

impl ConversionRequest {
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            kind: DocumentType::Html.to_string(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Request for raw PDF bytes, base64-encoded on construction
    pub fn pdf(bytes: &[u8]) -> Self {
        Self {
            kind: DocumentType::Pdf.to_string(),
            content: STANDARD.encode(bytes),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolved document type; a request with only the legacy `html` field
    /// is HTML
    pub fn document_type(&self) -> Result<DocumentType> {
        if self.kind.trim().is_empty() {
            if self.html.is_empty() {
                return Err(ConversionError::validation(
                    "type field is required (html or pdf)",
                ));
            }
            return Ok(DocumentType::Html);
        }
        self.kind.parse()
    }

    /// Raw content, falling back to the legacy `html` field
    pub fn content(&self) -> &str {
        if self.content.is_empty() {
            &self.html
        } else {
            &self.content
        }
    }

    /// Validate the request and decode its payload
    pub fn document(&self) -> Result<Document<'_>> {
        let kind = self.document_type()?;
        let content = self.content();

        if content.is_empty() {
            return Err(ConversionError::validation("content cannot be empty"));
        }
        if content.len() > kind.max_size() {
            return Err(ConversionError::validation(format!(
                "{} content exceeds maximum size of {}MB",
                kind,
                kind.max_size() / (1024 * 1024)
            )));
        }

        match kind {
            DocumentType::Html => Ok(Document::Html(Cow::Borrowed(content))),
            DocumentType::Pdf => STANDARD
                .decode(content.trim())
                .map(|bytes| Document::Pdf(Cow::Owned(bytes)))
                .map_err(|err| {
                    ConversionError::validation(format!("invalid base64 PDF content: {}", err))
                }),
        }
    }
}
