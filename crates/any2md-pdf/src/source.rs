//! Page text sources.
//!
//! The converter only needs a page count and per-page text. [`LopdfSource`]
//! extracts both from a PDF container; slices of already extracted page
//! strings work as a source too.

use any2md_core::{ConversionError, Result};

/// Ordered page text of a document; page numbers are 1-based
pub trait PdfSource {
    fn page_count(&self) -> Result<usize>;

    /// Text of one page. An error skips that page only.
    fn page_text(&self, page: usize) -> Result<String>;
}

impl<S: AsRef<str>> PdfSource for [S] {
    fn page_count(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn page_text(&self, page: usize) -> Result<String> {
        page.checked_sub(1)
            .and_then(|index| self.get(index))
            .map(|text| text.as_ref().to_string())
            .ok_or_else(|| ConversionError::internal(format!("page {} out of range", page)))
    }
}

#[cfg(feature = "pdf")]
pub use self::lopdf_source::{LopdfSource, PdfInfo};

#[cfg(feature = "pdf")]
pub(crate) mod lopdf_source {
    use lopdf::{Dictionary, Document, Object};
    use serde::Serialize;
    use tracing::debug;

    use super::PdfSource;
    use any2md_core::{ConversionError, Result};

    /// Basic facts about a PDF container
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct PdfInfo {
        pub pages: usize,
        pub encrypted: bool,
        pub size: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub author: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub subject: Option<String>,
    }

    /// A parsed, readable PDF document
    pub struct LopdfSource {
        document: Document,
        pages: Vec<u32>,
    }

    impl LopdfSource {
        /// Parse a PDF container, decrypting it with the empty password when
        /// it is encrypted
        pub fn open(bytes: &[u8]) -> Result<Self> {
            let mut document = parse(bytes)?;
            unlock(&mut document)?;
            Ok(Self::from_document(document))
        }

        pub fn from_document(document: Document) -> Self {
            let pages = document.get_pages().keys().copied().collect();
            Self { document, pages }
        }

        /// Inspect a PDF without extracting any text
        pub fn info(bytes: &[u8]) -> Result<PdfInfo> {
            let document = parse(bytes)?;
            let metadata = info_dictionary(&document);
            let field = |key: &[u8]| {
                metadata
                    .and_then(|dict| dict.get(key).ok())
                    .and_then(|value| value.as_str().ok())
                    .map(decode_text)
            };

            Ok(PdfInfo {
                pages: document.get_pages().len(),
                encrypted: document.is_encrypted(),
                size: bytes.len(),
                title: field(b"Title"),
                author: field(b"Author"),
                subject: field(b"Subject"),
            })
        }
    }

    impl PdfSource for LopdfSource {
        fn page_count(&self) -> Result<usize> {
            self.document.catalog().map_err(|err| {
                ConversionError::internal(format!("Failed to get PDF page count: {}", err))
            })?;
            Ok(self.pages.len())
        }

        fn page_text(&self, page: usize) -> Result<String> {
            let number = page
                .checked_sub(1)
                .and_then(|index| self.pages.get(index))
                .ok_or_else(|| ConversionError::internal(format!("page {} out of range", page)))?;
            self.document.extract_text(&[*number]).map_err(|err| {
                ConversionError::internal(format!("Failed to extract text from page {}: {}", page, err))
            })
        }
    }

    fn parse(bytes: &[u8]) -> Result<Document> {
        Document::load_mem(bytes).map_err(|err| {
            ConversionError::parsing_with("Failed to parse PDF", "error", err.to_string())
        })
    }

    /// Try the empty password on encrypted documents
    pub(super) fn unlock(document: &mut Document) -> Result<()> {
        if !document.is_encrypted() {
            return Ok(());
        }
        document.decrypt("").map_err(|err| {
            debug!(error = %err, "empty-password decrypt failed");
            ConversionError::parsing_with("PDF is encrypted and cannot be read", "encrypted", true)
        })
    }

    fn info_dictionary(document: &Document) -> Option<&Dictionary> {
        match document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => document.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Decode a PDF text string: UTF-16BE with BOM, otherwise byte text
    fn decode_text(bytes: &[u8]) -> String {
        if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return String::from_utf16_lossy(&units);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }


}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let pages = ["first", "second"];
        assert_eq!(pages[..].page_count().unwrap(), 2);
        assert_eq!(pages[..].page_text(2).unwrap(), "second");
        assert!(pages[..].page_text(0).is_err());
        assert!(pages[..].page_text(3).is_err());
    }
}
