//! PdfConverter - the entry point for PDF to Markdown conversion.

use any2md_core::{postprocess, ConversionOptions, ConversionOutput, ElementsCount, Result};
use tracing::{debug, warn};

use crate::classify::{process_page, PAGE_SEPARATOR};
use crate::source::PdfSource;

/// Converts PDF documents to Markdown by classifying extracted text lines.
///
/// Stateless; a single instance may be shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfConverter;

impl PdfConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert raw PDF bytes to Markdown
    #[cfg(feature = "pdf")]
    pub fn convert(&self, bytes: &[u8], options: &ConversionOptions) -> Result<ConversionOutput> {
        if bytes.is_empty() {
            return Err(any2md_core::ConversionError::validation(
                "PDF content cannot be empty",
            ));
        }

        let source = crate::source::LopdfSource::open(bytes)?;
        self.convert_source(&source, options)
    }

    /// Page count, encryption flag, size and metadata of a PDF
    #[cfg(feature = "pdf")]
    pub fn info(&self, bytes: &[u8]) -> Result<crate::source::PdfInfo> {
        if bytes.is_empty() {
            return Err(any2md_core::ConversionError::validation(
                "PDF content cannot be empty",
            ));
        }
        crate::source::LopdfSource::info(bytes)
    }

    /// Convert already extracted page texts, in page order
    pub fn convert_pages<S: AsRef<str>>(
        &self,
        pages: &[S],
        options: &ConversionOptions,
    ) -> Result<ConversionOutput> {
        self.convert_source(pages, options)
    }

    /// Convert any page source.
    ///
    /// Pages whose text cannot be extracted are skipped; the rest of the
    /// document is still converted.
    pub fn convert_source<S: PdfSource + ?Sized>(
        &self,
        source: &S,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput> {
        let options = options.resolve()?;
        let page_count = source.page_count()?;

        let mut elements = ElementsCount::default();
        let mut markdown = String::new();
        let mut skipped = 0;

        for page in 1..=page_count {
            let text = match source.page_text(page) {
                Ok(text) => text,
                Err(err) => {
                    warn!(page, error = %err, "skipping PDF page");
                    skipped += 1;
                    continue;
                }
            };

            let processed = process_page(&text, &mut elements);
            markdown.push_str(&processed);
            if page < page_count && !processed.trim().is_empty() {
                markdown.push_str(PAGE_SEPARATOR);
            }
        }

        let markdown = postprocess(&markdown, &options);
        debug!(
            pages = page_count,
            skipped,
            output_length = markdown.len(),
            headings = elements.headings,
            lists = elements.lists,
            paragraphs = elements.paragraphs,
            "converted PDF document"
        );

        Ok(ConversionOutput::new(markdown, elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use any2md_core::ConversionError;

    fn convert(pages: &[&str]) -> ConversionOutput {
        PdfConverter::new()
            .convert_pages(pages, &ConversionOptions::default())
            .unwrap()
    }

    #[test]
    fn test_single_page() {
        let output = convert(&["CHAPTER 1\nThe story begins here.\n- first\n• second"]);
        assert_eq!(
            output.markdown,
            "# CHAPTER 1\n\nThe story begins here.\n\n- first\n\n- second"
        );
        assert_eq!(output.elements.headings, 1);
        assert_eq!(output.elements.paragraphs, 1);
        assert_eq!(output.elements.lists, 2);
    }

    #[test]
    fn test_page_separators() {
        let output = convert(&["Page one text.", "Page two text."]);
        assert_eq!(output.markdown, "Page one text.\n\n---\n\nPage two text.");
    }

    #[test]
    fn test_blank_page_adds_no_separator() {
        let output = convert(&["   \n", "Only content."]);
        assert_eq!(output.markdown, "Only content.");

        let output = convert(&["First.", "", "Third."]);
        assert_eq!(output.markdown, "First.\n\n---\n\nThird.");
    }

    #[test]
    fn test_setext_and_marker_options() {
        let options = ConversionOptions {
            heading_style: "setext".to_string(),
            bullet_list_marker: "*".to_string(),
            ..Default::default()
        };
        let output = PdfConverter::new()
            .convert_pages(&["INTRODUCTION\n• point one"], &options)
            .unwrap();
        assert_eq!(output.markdown, "INTRODUCTION\n============\n\n* point one");
    }

    struct FlakySource;

    impl PdfSource for FlakySource {
        fn page_count(&self) -> Result<usize> {
            Ok(3)
        }

        fn page_text(&self, page: usize) -> Result<String> {
            match page {
                2 => Err(ConversionError::internal("broken content stream")),
                _ => Ok(format!("Text of page {}.", page)),
            }
        }
    }

    #[test]
    fn test_failed_pages_are_skipped() {
        let output = PdfConverter::new()
            .convert_source(&FlakySource, &ConversionOptions::default())
            .unwrap();
        assert_eq!(
            output.markdown,
            "Text of page 1.\n\n---\n\nText of page 3."
        );
        assert_eq!(output.elements.paragraphs, 2);
    }

    struct CountlessSource;

    impl PdfSource for CountlessSource {
        fn page_count(&self) -> Result<usize> {
            Err(ConversionError::internal("Failed to get PDF page count: no catalog"))
        }

        fn page_text(&self, _page: usize) -> Result<String> {
            unreachable!()
        }
    }

    #[test]
    fn test_page_count_failure_is_internal() {
        let err = PdfConverter::new()
            .convert_source(&CountlessSource, &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[cfg(feature = "pdf")]
    mod pdf {
        use super::*;
        use crate::source::lopdf_source::fixtures;

        #[test]
        fn test_empty_bytes_are_validation_error() {
            let err = PdfConverter::new()
                .convert(&[], &ConversionOptions::default())
                .unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }

        #[test]
        fn test_convert_document() {
            let bytes = fixtures::bytes(&[&["Hello World"], &["Goodbye"]], None);
            let output = PdfConverter::new()
                .convert(&bytes, &ConversionOptions::default())
                .unwrap();
            assert!(output.markdown.contains("Hello World"));
            assert!(output.markdown.contains("---"));
            assert!(output.markdown.contains("Goodbye"));
            assert_eq!(output.elements.links, 0);
        }

        #[test]
        fn test_info() {
            let bytes = fixtures::bytes(&[&["Only"]], Some("Title"));
            let info = PdfConverter::new().info(&bytes).unwrap();
            assert_eq!(info.pages, 1);
            assert_eq!(info.title.as_deref(), Some("Title"));
        }
    }
}
