//! Conversion options and their merge over the built-in defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Bullet list marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BulletMarker {
    #[default]
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "+")]
    Plus,
}

impl BulletMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulletMarker::Dash => "-",
            BulletMarker::Asterisk => "*",
            BulletMarker::Plus => "+",
        }
    }
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref]
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkReferenceStyle {
    /// Full reference: [text][label]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

macro_rules! impl_keyword {
    ($ty:ident, $field:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(ConversionError::validation(format!(
                        "invalid {}: {:?}",
                        $field, other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($ty::$variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

impl_keyword!(HeadingStyle, "heading_style", { "atx" => Atx, "setext" => Setext });
impl_keyword!(BulletMarker, "bullet_list_marker", { "-" => Dash, "*" => Asterisk, "+" => Plus });
impl_keyword!(CodeBlockStyle, "code_block_style", { "fenced" => Fenced, "indented" => Indented });
impl_keyword!(LinkStyle, "link_style", { "inlined" => Inlined, "referenced" => Referenced });
impl_keyword!(LinkReferenceStyle, "link_reference_style", {
    "full" => Full,
    "collapsed" => Collapsed,
    "shortcut" => Shortcut,
});

/// Formatting options as they arrive with a request.
///
/// Every string field may be left empty, in which case the built-in default
/// applies. Call [`ConversionOptions::resolve`] to obtain the typed,
/// immutable [`RenderOptions`] the converters work with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub heading_style: String,
    pub bullet_list_marker: String,
    pub code_block_style: String,
    pub fence: String,
    pub em_delimiter: String,
    pub strong_delimiter: String,
    pub link_style: String,
    pub link_reference_style: String,
    pub preformatted_code: bool,
}

fn keyword<T: FromStr<Err = ConversionError> + Default>(value: &str) -> Result<T> {
    if value.trim().is_empty() {
        Ok(T::default())
    } else {
        value.parse()
    }
}

fn text_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl ConversionOptions {
    /// Merge these options over the defaults.
    ///
    /// Each field is defaulted independently; nothing carries over from a
    /// previous call.
    pub fn resolve(&self) -> Result<RenderOptions> {
        let defaults = RenderOptions::default();
        Ok(RenderOptions {
            heading_style: keyword(&self.heading_style)?,
            hr: defaults.hr,
            bullet_list_marker: keyword(&self.bullet_list_marker)?,
            code_block_style: keyword(&self.code_block_style)?,
            fence: text_or(&self.fence, &defaults.fence),
            em_delimiter: text_or(&self.em_delimiter, &defaults.em_delimiter),
            strong_delimiter: text_or(&self.strong_delimiter, &defaults.strong_delimiter),
            link_style: keyword(&self.link_style)?,
            link_reference_style: keyword(&self.link_reference_style)?,
            preformatted_code: self.preformatted_code,
        })
    }
}

/// Resolved options used while rendering Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: BulletMarker,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: String,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Emit inline code text verbatim instead of collapsing whitespace
    pub preformatted_code: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "* * *".to_string(),
            bullet_list_marker: BulletMarker::Dash,
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            preformatted_code: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_resolve_to_defaults() {
        let resolved = ConversionOptions::default().resolve().unwrap();
        assert_eq!(resolved, RenderOptions::default());
        assert_eq!(resolved.bullet_list_marker.as_str(), "-");
        assert_eq!(resolved.fence, "```");
    }

    #[test]
    fn test_fields_override_independently() {
        let options = ConversionOptions {
            heading_style: "setext".to_string(),
            em_delimiter: "*".to_string(),
            bullet_list_marker: "+".to_string(),
            ..Default::default()
        };
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.heading_style, HeadingStyle::Setext);
        assert_eq!(resolved.em_delimiter, "*");
        assert_eq!(resolved.bullet_list_marker, BulletMarker::Plus);
        assert_eq!(resolved.strong_delimiter, "**");
        assert_eq!(resolved.code_block_style, CodeBlockStyle::Fenced);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let options = ConversionOptions {
            code_block_style: " Indented ".to_string(),
            link_style: "REFERENCED".to_string(),
            link_reference_style: "shortcut".to_string(),
            ..Default::default()
        };
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.code_block_style, CodeBlockStyle::Indented);
        assert_eq!(resolved.link_style, LinkStyle::Referenced);
        assert_eq!(resolved.link_reference_style, LinkReferenceStyle::Shortcut);
    }

    #[test]
    fn test_unknown_keyword_is_validation_error() {
        let options = ConversionOptions {
            heading_style: "underline".to_string(),
            ..Default::default()
        };
        let err = options.resolve().unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.message().contains("heading_style"));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let options: ConversionOptions =
            serde_json::from_str(r#"{"heading_style": "setext", "preformatted_code": true}"#)
                .unwrap();
        assert_eq!(options.heading_style, "setext");
        assert!(options.preformatted_code);
        assert!(options.fence.is_empty());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        assert_eq!(BulletMarker::Asterisk.to_string(), "*");
        assert_eq!("collapsed".parse::<LinkReferenceStyle>().unwrap().to_string(), "collapsed");
    }
}
