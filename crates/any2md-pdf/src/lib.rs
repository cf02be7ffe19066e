//! # any2md-pdf
//!
//! Convert PDF documents to Markdown.
//!
//! Text is extracted page by page, then every non-blank line is classified
//! as a heading, list item or paragraph with simple heuristics. Pages are
//! joined with horizontal rules and the shared postprocessor applies the
//! formatting options.
//!
//! ## Example
//!
//! ```rust
//! use any2md_core::ConversionOptions;
//! use any2md_pdf::PdfConverter;
//!
//! let output = PdfConverter::new()
//!     .convert_pages(&["CHAPTER 1\n• first point"], &ConversionOptions::default())
//!     .unwrap();
//!
//! assert_eq!(output.markdown, "# CHAPTER 1\n\n- first point");
//! assert_eq!(output.elements.lists, 1);
//! ```

pub mod classify;
mod service;
pub mod source;

pub use classify::{LineKind, PdfLine, PAGE_SEPARATOR};
pub use service::PdfConverter;
#[cfg(feature = "pdf")]
pub use source::{LopdfSource, PdfInfo};
pub use source::PdfSource;
