//! ConverterService - routes documents to the matching converter.

use std::time::Instant;

use any2md_core::{ConversionOptions, ConversionOutput, Result};
use any2md_html::HtmlConverter;
use any2md_pdf::PdfConverter;
use tracing::debug;

use crate::request::{ConversionRequest, Document};
use crate::response::ConversionResponse;

/// Converts HTML and PDF documents to Markdown.
///
/// Holds one converter per document type. Both are immutable, so a single
/// service can be shared between threads (e.g. behind an `Arc`).
#[derive(Debug, Clone, Default)]
pub struct ConverterService {
    html: HtmlConverter,
    #[cfg_attr(not(feature = "pdf"), allow(dead_code))]
    pdf: PdfConverter,
}

impl ConverterService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom HTML converter, e.g. one with extra rules
    pub fn with_html(html: HtmlConverter) -> Self {
        Self {
            html,
            pdf: PdfConverter::new(),
        }
    }

    /// Validate, decode and convert a wire request
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
        let document = request.document()?;
        self.convert_document(&document, &request.options)
    }

    /// Convert an already decoded document
    pub fn convert_document(
        &self,
        document: &Document<'_>,
        options: &ConversionOptions,
    ) -> Result<ConversionResponse> {
        let started = Instant::now();
        let output = match document {
            Document::Html(html) => self.html.convert(html, options)?,
            Document::Pdf(bytes) => self.convert_pdf(bytes, options)?,
        };

        let response =
            ConversionResponse::new(document.kind(), document.len(), output, started.elapsed());
        debug!(
            kind = %response.kind,
            input_length = response.stats.input_length,
            output_length = response.stats.output_length,
            processing_ms = response.stats.processing_ms,
            "conversion finished"
        );
        Ok(response)
    }

    /// Page count, encryption flag and metadata of a PDF
    #[cfg(feature = "pdf")]
    pub fn pdf_info(&self, bytes: &[u8]) -> Result<any2md_pdf::PdfInfo> {
        self.pdf.info(bytes)
    }

    #[cfg(feature = "pdf")]
    fn convert_pdf(&self, bytes: &[u8], options: &ConversionOptions) -> Result<ConversionOutput> {
        self.pdf.convert(bytes, options)
    }

    #[cfg(not(feature = "pdf"))]
    fn convert_pdf(&self, _bytes: &[u8], _options: &ConversionOptions) -> Result<ConversionOutput> {
        Err(any2md_core::ConversionError::validation(
            "PDF support is not enabled in this build",
        ))
    }
}
