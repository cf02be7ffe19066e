//! HtmlConverter - the entry point for HTML to Markdown conversion.

use std::sync::Arc;

use any2md_core::{
    postprocess, ConversionError, ConversionOptions, ConversionOutput, RenderOptions, Result,
};
use tracing::{debug, error};

use crate::node::{Node, NodeRef, NodeType, References};
use crate::rules::Rules;
use crate::stats::count_elements;
use crate::utilities::{collapse_whitespace, escape_markdown, is_block, is_html_whitespace};

/// Deepest element nesting accepted before conversion is refused
pub const MAX_NESTING_DEPTH: usize = 512;

/// Converts HTML documents to Markdown.
///
/// The converter only holds the immutable rule table, so one instance can
/// serve concurrent calls from many threads.
#[derive(Debug, Clone)]
pub struct HtmlConverter {
    rules: Arc<Rules>,
    max_depth: usize,
}

impl HtmlConverter {
    /// Create a converter with the default rule table
    pub fn new() -> Self {
        Self::with_rules(Rules::new())
    }

    /// Create a converter with a custom rule table
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            rules: Arc::new(rules),
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Override the nesting limit
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Merge request options over the defaults into a call-scoped pipeline
    pub fn configure(&self, options: &ConversionOptions) -> Result<Pipeline> {
        Ok(Pipeline {
            options: options.resolve()?,
            rules: Arc::clone(&self.rules),
        })
    }

    /// Convert an HTML string to Markdown
    #[cfg(feature = "html")]
    pub fn convert(&self, html: &str, options: &ConversionOptions) -> Result<ConversionOutput> {
        if html.trim().is_empty() {
            return Err(ConversionError::validation("HTML content cannot be empty"));
        }

        let tree = crate::html::parse_html_with_limit(html, self.max_depth)?;
        self.convert_tree(&tree, options)
    }

    /// Convert an already parsed tree to Markdown
    pub fn convert_tree(&self, tree: &Node, options: &ConversionOptions) -> Result<ConversionOutput> {
        let depth = tree.depth();
        if depth > self.max_depth {
            return Err(ConversionError::parsing_with(
                "HTML nesting exceeds maximum depth",
                "max_depth",
                self.max_depth,
            ));
        }

        let elements = count_elements(tree);
        let pipeline = self.configure(options)?;

        let markdown = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pipeline.render(tree)
        }))
        .map_err(|panic| {
            let reason = panic
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| panic.downcast_ref::<&str>().copied())
                .unwrap_or("unknown panic");
            error!("Panic while rendering HTML: {reason}");
            ConversionError::internal(format!("Failed to convert HTML to Markdown: {}", reason))
        })?;

        debug!(
            depth,
            output_length = markdown.len(),
            headings = elements.headings,
            paragraphs = elements.paragraphs,
            "converted HTML document"
        );

        Ok(ConversionOutput::new(markdown, elements))
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved options plus the shared rule table for a single conversion
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: RenderOptions,
    rules: Arc<Rules>,
}

impl Pipeline {
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a tree to postprocessed Markdown
    pub fn render(&self, tree: &Node) -> String {
        let references = References::default();
        let root = NodeRef::new(tree, &references);
        let mut output = match tree.node_type {
            NodeType::Element => self.process_node(&root),
            NodeType::Document => self.process_children(&root),
            NodeType::Text => escape_markdown(&collapse_whitespace(tree.text_content().trim())),
        };

        let references = references.into_inner();
        if !references.is_empty() {
            output.push_str("\n\n");
            output.push_str(&references.join("\n"));
            output.push_str("\n\n");
        }

        postprocess(&output, &self.options)
    }

    /// Process a single element
    fn process_node(&self, node: &NodeRef) -> String {
        // Process children first
        let content = self.process_children(node);

        // Apply rule if one matches
        if let Some(replacement) = self.rules.apply(&content, node, &self.options) {
            return replacement;
        }

        if is_block(node.tag_name()) {
            format!("\n\n{}\n\n", content)
        } else {
            content
        }
    }

    /// Process children of an element
    fn process_children(&self, parent: &NodeRef) -> String {
        let children = &parent.node.children;
        let mut result = String::new();
        let mut element_index = 0;

        for (position, child) in children.iter().enumerate() {
            match child.node_type {
                NodeType::Text => {
                    result.push_str(&self.process_text(parent, position));
                }
                NodeType::Element => {
                    let child_ref = parent.child(child, element_index);
                    element_index += 1;
                    result.push_str(&self.process_node(&child_ref));
                }
                NodeType::Document => {}
            }
        }

        result
    }

    /// Render the text child at `position`, dropping whitespace that touches
    /// a block boundary
    fn process_text(&self, parent: &NodeRef, position: usize) -> String {
        let children = &parent.node.children;
        let text = children[position].value.as_deref().unwrap_or_default();

        if parent.tag_name() == "pre" || parent.has_ancestor("pre") {
            return text.to_string();
        }

        let parent_is_block =
            parent.node.node_type == NodeType::Document || is_block(parent.tag_name());
        let at_start = match position.checked_sub(1) {
            Some(prev) => is_boundary(&children[prev]),
            None => parent_is_block,
        };
        let at_end = match children.get(position + 1) {
            Some(next) => is_boundary(next),
            None => parent_is_block,
        };

        let mut collapsed = collapse_whitespace(text);
        if at_end {
            collapsed.truncate(collapsed.trim_end_matches(is_html_whitespace).len());
        }
        let collapsed = if at_start {
            collapsed.trim_start_matches(is_html_whitespace)
        } else {
            collapsed.as_str()
        };

        escape_markdown(collapsed)
    }
}

/// Siblings that end a line of inline content
fn is_boundary(node: &Node) -> bool {
    if !node.is_element() {
        return false;
    }
    let tag = node.tag_name();
    is_block(tag)
        || tag == "br"
        || (tag == "input"
            && node
                .attr("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("checkbox")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;

    fn convert(html: &str) -> String {
        HtmlConverter::new()
            .convert(html, &ConversionOptions::default())
            .unwrap()
            .markdown
    }

    fn convert_with(html: &str, options: ConversionOptions) -> String {
        HtmlConverter::new().convert(html, &options).unwrap().markdown
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(convert("<p>Hello World</p>"), "Hello World");
    }

    #[test]
    fn test_heading_atx_by_default() {
        assert_eq!(convert("<h1>Title</h1>"), "# Title");
        assert_eq!(convert("<h3>Deep</h3>"), "### Deep");
    }

    #[test]
    fn test_heading_setext() {
        let options = ConversionOptions {
            heading_style: "setext".to_string(),
            ..Default::default()
        };
        assert_eq!(convert_with("<h1>Title</h1>", options.clone()), "Title\n=====");
        assert_eq!(convert_with("<h2>Sub</h2>", options), "Sub\n---");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(convert("<em>emphasized</em>"), "_emphasized_");
        assert_eq!(convert("<p>a<em> b </em>c</p>"), "a _b_ c");
    }

    #[test]
    fn test_strong() {
        assert_eq!(convert("<strong>bold</strong>"), "**bold**");
        let options = ConversionOptions {
            strong_delimiter: "__".to_string(),
            ..Default::default()
        };
        assert_eq!(convert_with("<b>bold</b>", options), "__bold__");
    }

    #[test]
    fn test_inline_link() {
        assert_eq!(
            convert(r#"<a href="https://example.com">Link</a>"#),
            "[Link](https://example.com)"
        );
        assert_eq!(
            convert(r#"<a href="/x" title="Say &quot;hi&quot;">Link</a>"#),
            r#"[Link](/x "Say \"hi\"")"#
        );
        assert_eq!(convert("<a name=\"top\">Anchor</a>"), "Anchor");
    }

    #[test]
    fn test_referenced_links() {
        let html = r#"<p><a href="/a">A</a> and <a href="/b" title="B">B</a></p>"#;

        let full = ConversionOptions {
            link_style: "referenced".to_string(),
            ..Default::default()
        };
        assert_eq!(
            convert_with(html, full),
            "[A][1] and [B][2]\n\n[1]: /a\n[2]: /b \"B\""
        );

        let collapsed = ConversionOptions {
            link_style: "referenced".to_string(),
            link_reference_style: "collapsed".to_string(),
            ..Default::default()
        };
        assert_eq!(
            convert_with(html, collapsed),
            "[A][] and [B][]\n\n[A]: /a\n[B]: /b \"B\""
        );

        let shortcut = ConversionOptions {
            link_style: "referenced".to_string(),
            link_reference_style: "shortcut".to_string(),
            ..Default::default()
        };
        assert_eq!(
            convert_with(html, shortcut),
            "[A] and [B]\n\n[A]: /a\n[B]: /b \"B\""
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            convert(r#"<img src="test.png" alt="Alt">"#),
            "![Alt](test.png)"
        );
        assert_eq!(
            convert(r#"<img src="t.png" alt="A" title="T">"#),
            "![A](t.png \"T\")"
        );
        assert_eq!(convert(r#"<p>x<img alt="no source"></p>"#), "x");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(convert("<code>code</code>"), "`code`");
        assert_eq!(convert("<code>a `tick`</code>"), "`` a `tick` ``");
        assert_eq!(convert("<p><code>a   b</code></p>"), "`a b`");
    }

    #[test]
    fn test_preformatted_inline_code() {
        let options = ConversionOptions {
            preformatted_code: true,
            ..Default::default()
        };
        assert_eq!(convert_with("<p><code>a   b</code></p>", options), "`a   b`");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(convert("<p>a</p><hr><p>b</p>"), "a\n\n* * *\n\nb");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            convert("<blockquote><p>One</p><p>Two</p></blockquote>"),
            "> One\n>\n> Two"
        );
    }

    #[test]
    fn test_fenced_code_block() {
        assert_eq!(
            convert("<pre><code class=\"language-rust\">fn main() {\n    run();\n}\n</code></pre>"),
            "```rust\nfn main() {\n    run();\n}\n```"
        );
    }

    #[test]
    fn test_fence_lengthens_around_fences() {
        assert_eq!(
            convert("<pre><code>```\nx\n```</code></pre>"),
            "````\n```\nx\n```\n````"
        );
    }

    #[test]
    fn test_pre_keeps_text_around_code() {
        assert_eq!(
            convert("<pre>$ cargo run\n<code>fn main() {}</code></pre>"),
            "```\n$ cargo run\nfn main() {}\n```"
        );
        assert_eq!(
            convert("<pre><code>a</code>\n<code>b</code></pre>"),
            "```\na\nb\n```"
        );
        assert_eq!(
            convert("<pre>\n  <code class=\"lang-sh\">ls</code>\n</pre>"),
            "```sh\nls\n```"
        );
    }

    #[test]
    fn test_indented_code_block() {
        let options = ConversionOptions {
            code_block_style: "indented".to_string(),
            ..Default::default()
        };
        assert_eq!(
            convert_with("<p>Run:</p><pre><code>a()\nb()</code></pre>", options),
            "Run:\n\n    a()\n    b()"
        );
    }

    #[test]
    fn test_code_text_is_not_escaped() {
        assert_eq!(
            convert("<pre><code>a_b *c*</code></pre>"),
            "```\na_b *c*\n```"
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            convert("<ul>\n  <li>Item 1</li>\n  <li>Item 2</li>\n</ul>"),
            "- Item 1\n- Item 2"
        );
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            convert("<ol><li>One</li><li>Two</li></ol>"),
            "1. One\n2. Two"
        );
        assert_eq!(
            convert("<ol start=\"4\"><li>Four</li><li>Five</li></ol>"),
            "4. Four\n5. Five"
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            convert("<ul><li>A<ul><li>B</li></ul></li><li>C</li></ul>"),
            "- A\n  - B\n- C"
        );
    }

    #[test]
    fn test_bullet_marker_option() {
        let options = ConversionOptions {
            bullet_list_marker: "+".to_string(),
            ..Default::default()
        };
        assert_eq!(convert_with("<ul><li>x</li></ul>", options), "+ x");
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            convert("<ul><li><input type=\"checkbox\" checked> Done</li><li><input type=\"checkbox\"> Todo</li></ul>"),
            "- [x] Done\n- [ ] Todo"
        );
    }

    #[test]
    fn test_table_with_thead() {
        let html = "<table><thead><tr><th>H1</th><th>H2</th></tr></thead>\
                    <tbody><tr><td>a</td><td>b</td></tr></tbody></table>";
        assert_eq!(convert(html), "| H1 | H2 |\n| --- | --- |\n| a | b |");
    }

    #[test]
    fn test_table_promotes_first_row() {
        let html = "<table><tr><td>a</td><td align=\"right\">b</td></tr><tr><td>c</td><td>d</td></tr></table>";
        assert_eq!(convert(html), "| a | b |\n| --- | ---: |\n| c | d |");
    }

    #[test]
    fn test_table_caption() {
        let html = "<table><caption>Stats</caption><tr><th>k</th></tr><tr><td>v</td></tr></table>";
        assert_eq!(convert(html), "Stats\n\n| k |\n| --- |\n| v |");
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(convert("<p>1. not a list</p>"), "1\\. not a list");
        assert_eq!(convert("<p>*stars* and [brackets]</p>"), "\\*stars\\* and \\[brackets\\]");
        assert_eq!(convert("<p># hash</p>"), "\\# hash");
    }

    #[test]
    fn test_unmatched_elements() {
        assert_eq!(convert("<div>one</div><div>two</div>"), "one\n\ntwo");
        assert_eq!(convert("<p><span>in</span>line</p>"), "inline");
    }

    #[test]
    fn test_head_is_dropped() {
        assert_eq!(
            convert("<html><head><title>T</title></head><body><p>Body</p></body></html>"),
            "Body"
        );
    }

    #[test]
    fn test_line_break() {
        assert_eq!(convert("<p>a<br>b</p>"), "a  \nb");
    }

    #[test]
    fn test_extended_rules_in_document() {
        let html = "<p><mark>Highlighted</mark> <del>gone</del> <sup>2</sup></p>";
        assert_eq!(convert(html), "==Highlighted== ~~gone~~ ^2^");
    }

    #[test]
    fn test_scripts_removed_at_any_depth() {
        let html = "<div><section><p>Keep<script>var secret = 1;</script></p>\
                    <style>.x{}</style><noscript>enable js</noscript></section></div>";
        let markdown = convert(html);
        assert_eq!(markdown, "Keep");
        assert!(!markdown.contains("secret"));

        // Rules that read element text directly
        let cases = [
            ("<dl><dt>Term<script>SECRET</script></dt><dd>Def</dd></dl>", "**Term**\n: Def"),
            (
                "<details><summary>S<script>SECRET</script></summary>Body</details>",
                "<details>\n<summary>S</summary>\n",
            ),
            (
                "<figure><img src=\"a.png\" alt=\"A\"><figcaption>Cap<style>SECRET</style></figcaption></figure>",
                "*Cap*",
            ),
            ("<p><code>x<script>SECRET</script></code></p>", "`x`"),
            ("<pre><code>y<script>SECRET</script></code></pre>", "```\ny\n```"),
            ("<pre>z<noscript>SECRET</noscript></pre>", "```\nz\n```"),
        ];
        for (html, expected) in cases {
            let markdown = convert(html);
            assert!(!markdown.contains("SECRET"), "leaked in {markdown:?}");
            assert!(markdown.contains(expected), "missing {expected:?} in {markdown:?}");
        }
    }

    #[test]
    fn test_nav_footer_rule() {
        let html = "<nav>\n  <a href=\"#one\">One</a>\n  <a href=\"#two\">Two</a>\n</nav>\
                    <footer><p>&copy; 2024</p></footer>";
        assert_eq!(
            convert(html),
            "---\n[One](#one) [Two](#two)\n---\n\n---\n© 2024\n---"
        );
    }

    #[test]
    fn test_empty_input_is_validation_error() {
        let converter = HtmlConverter::new();
        for html in ["", "   \n\t"] {
            let err = converter
                .convert(html, &ConversionOptions::default())
                .unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR");
        }
    }

    #[test]
    fn test_invalid_option_is_validation_error() {
        let options = ConversionOptions {
            link_style: "footnote".to_string(),
            ..Default::default()
        };
        let err = HtmlConverter::new().convert("<p>x</p>", &options).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_depth_limit() {
        let converter = HtmlConverter::new().max_depth(8);
        let html = format!("{}x{}", "<div>".repeat(20), "</div>".repeat(20));
        let err = converter
            .convert(&html, &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "PARSING_ERROR");
        assert_eq!(err.details().unwrap()["max_depth"], 8);
    }

    #[test]
    fn test_custom_rule_precedence_and_decline() {
        let mut rules = Rules::new();
        rules.add(
            "shout",
            Rule::for_tag("p", |content, node, _| {
                if node.has_attr("data-shout") {
                    Some(format!("\n\n{}!\n\n", content.trim().to_uppercase()))
                } else {
                    None
                }
            }),
        );
        let converter = HtmlConverter::with_rules(rules);
        let output = converter
            .convert(
                "<p data-shout>hey</p><p>calm</p>",
                &ConversionOptions::default(),
            )
            .unwrap();
        assert_eq!(output.markdown, "HEY!\n\ncalm");
    }

    #[test]
    fn test_panicking_rule_is_internal_error() {
        let mut rules = Rules::new();
        rules.add("boom", Rule::for_tag("p", |_, _, _| panic!("rule failed")));
        let err = HtmlConverter::with_rules(rules)
            .convert("<p>x</p>", &ConversionOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.message().contains("rule failed"));
    }

    #[test]
    fn test_convert_tree() {
        let mut h1 = Node::element("h1");
        h1.add_child(Node::text("Hello World"));

        let output = HtmlConverter::new()
            .convert_tree(&h1, &ConversionOptions::default())
            .unwrap();
        assert_eq!(output.markdown, "# Hello World");
        assert_eq!(output.elements.headings, 1);
    }

    #[test]
    fn test_pipeline_is_reusable() {
        let converter = HtmlConverter::new();
        let pipeline = converter
            .configure(&ConversionOptions {
                em_delimiter: "*".to_string(),
                ..Default::default()
            })
            .unwrap();
        let mut em = Node::element("em");
        em.add_child(Node::text("x"));

        assert_eq!(pipeline.render(&em), "*x*");
        assert_eq!(pipeline.render(&em), "*x*");
        assert_eq!(pipeline.options().em_delimiter, "*");
    }
}
