//! any2md - convert HTML and PDF documents to Markdown
//!
//! HTML is parsed into a node tree and rendered by a table of element rules;
//! PDF text is extracted page by page and each line is classified as a
//! heading, list item or paragraph. Both paths finish with the same
//! Markdown cleanup pass and report structural statistics alongside the
//! output.
//!
//! # Example
//!
//! ```rust
//! use any2md::{ConversionRequest, ConverterService};
//!
//! let service = ConverterService::new();
//! let response = service
//!     .convert(&ConversionRequest::html("<h1>Hello</h1><p>World</p>"))
//!     .unwrap();
//!
//! assert_eq!(response.markdown, "# Hello\n\nWorld");
//! assert_eq!(response.stats.elements_count.headings, 1);
//! ```
//!
//! # Features
//!
//! - `pdf` (default): parse PDF containers with lopdf
//! - `cli` (default): the `any2md` command line tool

pub mod request;
pub mod response;
mod service;

pub use any2md_core::{
    postprocess, BulletMarker, CodeBlockStyle, ConversionError, ConversionOptions,
    ConversionOutput, ElementsCount, HeadingStyle, LinkReferenceStyle, LinkStyle, RenderOptions,
    Result,
};
pub use any2md_html::{HtmlConverter, Rule, Rules};
pub use any2md_pdf::{PdfConverter, PdfSource};
#[cfg(feature = "pdf")]
pub use any2md_pdf::PdfInfo;

pub use request::{ConversionRequest, Document, DocumentType};
pub use response::{ConversionResponse, ErrorResponse, Stats};
pub use service::ConverterService;
