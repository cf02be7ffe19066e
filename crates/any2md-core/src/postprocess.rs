//! Markdown cleanup shared by the HTML and PDF paths.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::{BulletMarker, HeadingStyle, RenderOptions};

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Rewrite an ATX level 1 or 2 heading line into its setext form
fn setext_heading(line: &str) -> Option<String> {
    let (rest, underline) = if let Some(rest) = line.strip_prefix("## ") {
        (rest, '-')
    } else if let Some(rest) = line.strip_prefix("# ") {
        (rest, '=')
    } else {
        return None;
    };

    let title = rest.trim();
    if title.is_empty() || title.starts_with('#') {
        return None;
    }

    let rule: String = std::iter::repeat(underline)
        .take(title.chars().count())
        .collect();
    Some(format!("{}\n{}", title, rule))
}

/// Apply the option-driven formatting pass to rendered Markdown.
///
/// Collapses runs of three or more newlines to a single blank line, converts
/// level 1-2 ATX headings to setext when requested, swaps the `- ` bullet for
/// the configured marker and trims the result. Applying it to its own output
/// changes nothing.
pub fn postprocess(markdown: &str, options: &RenderOptions) -> String {
    let setext = options.heading_style == HeadingStyle::Setext;
    let marker = options.bullet_list_marker;

    let lines: Vec<String> = markdown
        .trim()
        .split('\n')
        .map(|line| {
            let line = if setext {
                setext_heading(line).unwrap_or_else(|| line.to_string())
            } else {
                line.to_string()
            };
            match line.strip_prefix("- ") {
                Some(rest) if marker != BulletMarker::Dash => {
                    format!("{} {}", marker.as_str(), rest)
                }
                _ => line,
            }
        })
        .collect();

    let joined = lines.join("\n");
    EXCESS_NEWLINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}
