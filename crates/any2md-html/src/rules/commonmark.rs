//! CommonMark and GFM rules for HTML to Markdown conversion.

use any2md_core::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};

use super::{Filter, Rule};
use crate::node::{Node, NodeRef};
use crate::utilities::{clean_attribute, collapse_whitespace, flanking_whitespace};

/// Create all CommonMark rules
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        task_list_item_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        reference_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
        table_cell_rule(),
        table_row_rule(),
        table_section_rule(),
        table_rule(),
        ignored_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |content, _, _| {
        Some(format!("\n\n{}\n\n", content.trim()))
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| Some("  \n".to_string()))
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |content, node, options| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        // Headings are single-line in Markdown
        let content = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if content.is_empty() {
            return Some(String::new());
        }

        match options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                Some(format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count())
                ))
            }
            _ => Some(format!("\n\n{} {}\n\n", "#".repeat(level), content)),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |content, _, _| {
        let content = content.trim();
        if content.is_empty() {
            return Some(String::new());
        }
        let mut quoted: Vec<String> = Vec::new();
        let mut previous_blank = false;
        for line in content.lines() {
            let blank = line.trim().is_empty();
            if blank && previous_blank {
                continue;
            }
            previous_blank = blank;
            quoted.push(if blank {
                ">".to_string()
            } else {
                format!("> {}", line)
            });
        }
        Some(format!("\n\n{}\n\n", quoted.join("\n")))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |content, node, _| {
        // A list closing its parent item hangs directly under the item text
        let closes_item = node.parent().is_some_and(|parent| {
            parent.tag_name() == "li"
                && parent
                    .element_children()
                    .last()
                    .is_some_and(|last| std::ptr::eq(last, node.node))
        });

        if closes_item {
            Some(format!("\n{}", content.trim_end()))
        } else {
            Some(format!("\n\n{}\n\n", content.trim_end()))
        }
    })
}

fn is_checkbox(node: &Node) -> bool {
    node.tag_name() == "input"
        && node
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
}

fn task_list_item_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, node, _| is_checkbox(node.node) && node.parent_tag() == Some("li")),
        |_, node, _| {
            if node.has_attr("checked") {
                Some("[x] ".to_string())
            } else {
                Some("[ ] ".to_string())
            }
        },
    )
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |content, node, options| {
        let prefix = match node.parent() {
            Some(parent) if parent.tag_name() == "ol" => {
                let start = parent
                    .attr("start")
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .unwrap_or(1);
                format!("{}. ", start + node.index() as i64)
            }
            _ => format!("{} ", options.bullet_list_marker.as_str()),
        };

        let indent = " ".repeat(prefix.chars().count());
        let body = content
            .trim_start_matches('\n')
            .trim_end()
            .split('\n')
            .map(|line| line.trim_end())
            .collect::<Vec<_>>();
        let mut item = prefix;
        for (i, line) in body.iter().enumerate() {
            if i > 0 {
                item.push('\n');
                if !line.is_empty() {
                    item.push_str(&indent);
                }
            }
            item.push_str(line);
        }
        item.push('\n');
        Some(item)
    })
}

/// Language from a `language-*` or `lang-*` class
fn code_language(node: &Node) -> Option<&str> {
    node.attr("class")?.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
    })
}

/// Longest fence-character run opening a line, plus one, at least `min`
fn fence_size(code: &str, fence_char: char, min: usize) -> usize {
    code.lines()
        .map(|line| line.chars().take_while(|c| *c == fence_char).count())
        .filter(|run| *run >= 3)
        .fold(min, |size, run| if run >= size { run + 1 } else { size })
}

/// The `<code>` child of a `<pre>` when it is the only non-blank child
fn sole_code_child(pre: &Node) -> Option<&Node> {
    let mut children = pre.children().filter(|child| {
        child.is_element() || child.value.as_deref().is_some_and(|v| !v.trim().is_empty())
    });
    match (children.next(), children.next()) {
        (Some(child), None) if child.is_element() && child.tag_name() == "code" => Some(child),
        _ => None,
    }
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |_, node, options| {
        let code_node = sole_code_child(node.node);

        let code = code_node.map_or_else(|| node.visible_text(), Node::visible_text);
        let language = code_node
            .and_then(code_language)
            .or_else(|| code_language(node.node))
            .unwrap_or("");
        let code = code.strip_suffix('\n').unwrap_or(&code);

        match options.code_block_style {
            CodeBlockStyle::Indented => {
                let indented = code
                    .split('\n')
                    .map(|line| format!("    {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(format!("\n\n{}\n\n", indented))
            }
            CodeBlockStyle::Fenced => {
                let fence_char = options.fence.chars().next().unwrap_or('`');
                let min = options.fence.chars().count().max(3);
                let fence = fence_char
                    .to_string()
                    .repeat(fence_size(code, fence_char, min));
                Some(format!("\n\n{}{}\n{}\n{}\n\n", fence, language, code, fence))
            }
        }
    })
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| Some(format!("\n\n{}\n\n", options.hr)))
}

fn link_parts(node: &NodeRef) -> (String, String) {
    let href = node
        .attr("href")
        .unwrap_or_default()
        .replace('(', "\\(")
        .replace(')', "\\)");
    let title = clean_attribute(node.attr("title"));
    let title = if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    };
    (href, title)
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "a" && node.has_attr("href") && options.link_style == LinkStyle::Inlined
        }),
        |content, node, _| {
            let (href, title) = link_parts(node);
            Some(format!("[{}]({}{})", content, href, title))
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "a" && node.has_attr("href") && options.link_style == LinkStyle::Referenced
        }),
        |content, node, options| {
            let (href, title) = link_parts(node);
            let replacement = match options.link_reference_style {
                LinkReferenceStyle::Full => {
                    let id = node.reference_count() + 1;
                    node.add_reference(format!("[{}]: {}{}", id, href, title));
                    format!("[{}][{}]", content, id)
                }
                LinkReferenceStyle::Collapsed => {
                    node.add_reference(format!("[{}]: {}{}", content, href, title));
                    format!("[{}][]", content)
                }
                LinkReferenceStyle::Shortcut => {
                    node.add_reference(format!("[{}]: {}{}", content, href, title));
                    format!("[{}]", content)
                }
            };
            Some(replacement)
        },
    )
}

fn delimited(content: &str, delimiter: &str) -> Option<String> {
    let (leading, inner, trailing) = flanking_whitespace(content);
    if inner.is_empty() {
        return Some(String::new());
    }
    Some(format!("{}{}{}{}{}", leading, delimiter, inner, delimiter, trailing))
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |content, _, options| {
        delimited(content, &options.em_delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |content, _, options| {
        delimited(content, &options.strong_delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "code" && !node.has_ancestor("pre")),
        |_, node, options| {
            let text = node.visible_text();
            let content = if options.preformatted_code {
                text.replace("\r\n", " ").replace(['\n', '\r'], " ")
            } else {
                collapse_whitespace(&text)
            };
            if content.is_empty() {
                return Some(String::new());
            }

            // Shortest backtick run that does not occur in the code
            let runs: Vec<usize> = content
                .split(|c: char| c != '`')
                .map(str::len)
                .filter(|len| *len > 0)
                .collect();
            let mut size = 1;
            while runs.contains(&size) {
                size += 1;
            }
            let delimiter = "`".repeat(size);

            let padded = content.starts_with('`')
                || content.ends_with('`')
                || (content.starts_with(' ')
                    && content.ends_with(' ')
                    && content.trim() != "");
            let space = if padded { " " } else { "" };

            Some(format!("{}{}{}{}{}", delimiter, space, content, space, delimiter))
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |_, node, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        if src.is_empty() {
            return Some(String::new());
        }

        let title = clean_attribute(node.attr("title"));
        let title_part = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title)
        };

        Some(format!("![{}]({}{})", alt, src, title_part))
    })
}

/// Whether `row` is the header row of its table: the first row of a
/// `thead`, or the table's first row when there is no `thead`
fn is_header_row(row: &NodeRef) -> bool {
    if row.parent_tag() == Some("thead") {
        return row.index() == 0;
    }
    let Some(table) = row.closest("table") else {
        return false;
    };
    if table.node.find("thead").next().is_some() {
        return false;
    }
    table
        .node
        .find("tr")
        .next()
        .is_some_and(|first| std::ptr::eq(first, row.node))
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["th", "td"], |content, node, _| {
        let cell = content
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('|', "\\|");
        let prefix = if node.index() == 0 { "| " } else { " " };
        Some(format!("{}{} |", prefix, cell))
    })
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |content, node, _| {
        let mut row = format!("\n{}", content);
        if is_header_row(node) {
            let separators: Vec<&str> = node
                .element_children()
                .filter(|cell| matches!(cell.tag_name(), "th" | "td"))
                .map(|cell| match cell.attr("align").map(str::to_ascii_lowercase).as_deref() {
                    Some("left") => ":---",
                    Some("right") => "---:",
                    Some("center") => ":---:",
                    _ => "---",
                })
                .collect();
            if !separators.is_empty() {
                row.push_str(&format!("\n| {} |", separators.join(" | ")));
            }
        }
        Some(row)
    })
}

fn table_section_rule() -> Rule {
    Rule::for_tags(&["thead", "tbody", "tfoot"], |content, _, _| Some(content.to_string()))
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |content, _, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return Some(String::new());
        }
        Some(format!("\n\n{}\n\n", content))
    })
}

fn ignored_rule() -> Rule {
    Rule::for_tags(&["head", "template"], |_, _, _| Some(String::new()))
}
