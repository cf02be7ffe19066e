//! # any2md-html
//!
//! Convert HTML documents to Markdown.
//!
//! The converter walks a [`Node`] tree depth-first. Every element is offered
//! to the [`Rules`] table: keyed rules first (page chrome, HTML5 inline
//! semantics, media, definition lists), then the CommonMark/GFM rules.
//! Elements no rule accepts fall back to the default conversion, which wraps
//! block elements in blank lines and passes inline content through.
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use any2md_core::ConversionOptions;
//! use any2md_html::HtmlConverter;
//!
//! let converter = HtmlConverter::new();
//! let output = converter
//!     .convert("<h1>Hello</h1><p>A <mark>key</mark> point.</p>", &ConversionOptions::default())
//!     .unwrap();
//!
//! assert_eq!(output.markdown, "# Hello\n\nA ==key== point.");
//! assert_eq!(output.elements.headings, 1);
//! ```
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use any2md_core::ConversionOptions;
//! use any2md_html::{HtmlConverter, Node};
//!
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//!
//! let output = HtmlConverter::new()
//!     .convert_tree(&h1, &ConversionOptions::default())
//!     .unwrap();
//! assert_eq!(output.markdown, "# Hello World");
//! ```

#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod rules;
mod service;
mod stats;
mod utilities;

#[cfg(feature = "html")]
pub use html::{parse_html, parse_html_with_limit};
pub use node::{Node, NodeRef, NodeType, References};
pub use rules::{Filter, ReplacementFn, Rule, Rules};
pub use service::{HtmlConverter, Pipeline, MAX_NESTING_DEPTH};
pub use stats::count_elements;
pub use utilities::{clean_attribute, escape_markdown, is_block, BLOCK_ELEMENTS};
