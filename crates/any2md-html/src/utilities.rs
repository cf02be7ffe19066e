//! Utility functions and constants for HTML processing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "caption", "center", "dd", "details", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "li",
    "main", "menu", "nav", "noframes", "noscript", "ol", "output", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Markdown escapes applied to text nodes; anchored patterns only look at
/// the start of the text node.
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\$1"),
        (r"^(#{1,6}) ", r"\$1 "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"$1\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Escape markdown special characters in text
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// HTML whitespace; non-breaking spaces are content
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

/// Collapse runs of HTML whitespace to a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if is_html_whitespace(c) {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Split content into leading whitespace, the inner text and trailing whitespace
pub fn flanking_whitespace(content: &str) -> (&str, &str, &str) {
    let inner_start = content.trim_start_matches(is_html_whitespace);
    let leading = &content[..content.len() - inner_start.len()];
    let inner = inner_start.trim_end_matches(is_html_whitespace);
    let trailing = &inner_start[inner.len()..];
    (leading, inner, trailing)
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}
