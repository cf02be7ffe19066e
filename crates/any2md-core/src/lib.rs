//! any2md-core - shared pieces of the document-to-Markdown converters
//!
//! This crate holds everything the HTML and PDF paths have in common:
//!
//! - [`ConversionOptions`], the request-level formatting knobs, and their pure
//!   merge into an immutable [`RenderOptions`] value
//! - [`ElementsCount`], the structural statistics reported next to the output
//! - [`ConversionError`], the error type shared by every conversion path
//! - [`postprocess`], the Markdown cleanup pass both paths finish with
//!
//! # Architecture
//!
//! ```text
//! HTML String ──parse──▶ Node tree ──rules──┐
//!                                           ├──▶ postprocess ──▶ Markdown + ElementsCount
//! PDF pages ──────────▶ line classifier ────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use any2md_core::{postprocess, ConversionOptions};
//!
//! let options = ConversionOptions {
//!     heading_style: "setext".to_string(),
//!     ..Default::default()
//! };
//! let render = options.resolve().unwrap();
//!
//! assert_eq!(postprocess("# Title\n\n\n\nBody", &render), "Title\n=====\n\nBody");
//! ```

mod error;
mod options;
mod postprocess;
mod stats;

pub use error::{ConversionError, Details, Result};
pub use options::{
    BulletMarker, CodeBlockStyle, ConversionOptions, HeadingStyle, LinkReferenceStyle, LinkStyle,
    RenderOptions,
};
pub use postprocess::postprocess;
pub use stats::{ConversionOutput, ElementsCount};
