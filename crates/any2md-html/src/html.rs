//! HTML parsing support.
//!
//! Parses HTML strings with scraper/html5ever and converts the result into
//! the [`Node`] tree the rule engine walks. Comments, doctypes and
//! processing instructions are dropped.

use any2md_core::{ConversionError, Result};
use scraper::{ElementRef, Html, Node as ScraperNode};
use tracing::debug;

use crate::node::Node;
use crate::service::MAX_NESTING_DEPTH;

/// Parse an HTML string into a Node tree.
///
/// # Example
///
/// ```rust
/// use any2md_html::parse_html;
///
/// let document = parse_html("<h1>Hello <em>World</em></h1>").unwrap();
/// assert_eq!(document.find("em").count(), 1);
/// ```
pub fn parse_html(html: &str) -> Result<Node> {
    parse_html_with_limit(html, MAX_NESTING_DEPTH)
}

/// Parse with an explicit nesting limit
pub fn parse_html_with_limit(html: &str, max_depth: usize) -> Result<Node> {
    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        debug!(
            errors = document.errors.len(),
            first = %document.errors[0],
            "recovered from HTML parse errors"
        );
    }

    let mut root = Node::document();
    root.add_child(scraper_to_node(document.root_element(), 1, max_depth)?);
    Ok(root)
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef, depth: usize, max_depth: usize) -> Result<Node> {
    if depth > max_depth {
        return Err(ConversionError::parsing_with(
            "HTML nesting exceeds maximum depth",
            "max_depth",
            max_depth,
        ));
    }

    let mut node = Node::element(element.value().name());
    for (name, value) in element.value().attrs() {
        node.set_attr(name, value);
    }

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element, depth + 1, max_depth)?);
                }
            }
            _ => {}
        }
    }

    Ok(node)
}
