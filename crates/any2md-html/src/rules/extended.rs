//! Tag rules layered over CommonMark: page chrome, HTML5 inline semantics
//! and embedded media.

use indexmap::IndexMap;

use super::Rule;
use crate::node::{Node, HIDDEN_TAGS};

/// Concatenated, untrimmed visible text of every `tag` descendant
fn descendant_text(node: &Node, tag: &str) -> String {
    node.find(tag).map(Node::visible_text).collect()
}

fn wrap(delimiter: &'static str) -> impl Fn(&str) -> Option<String> {
    move |content| Some(format!("{}{}{}", delimiter, content, delimiter))
}

/// Create the extended rules, keyed by name in lookup order
pub fn extended_rules() -> IndexMap<String, Rule> {
    let mut rules = IndexMap::new();
    let mut add = |key: &str, rule: Rule| {
        rules.insert(key.to_string(), rule);
    };

    add("chrome", chrome_rule());
    add("scripts", Rule::for_tags(HIDDEN_TAGS, |_, _, _| {
        Some(String::new())
    }));
    add("abbreviation", abbreviation_rule());
    add("details", details_rule());

    let mark = wrap("==");
    add("mark", Rule::for_tag("mark", move |content, _, _| mark(content)));
    let ins = wrap("++");
    add("insert", Rule::for_tag("ins", move |content, _, _| ins(content)));
    let del = wrap("~~");
    add("strikethrough", Rule::for_tags(&["del", "s", "strike"], move |content, _, _| {
        del(content)
    }));
    let sub = wrap("~");
    add("subscript", Rule::for_tag("sub", move |content, _, _| sub(content)));
    let sup = wrap("^");
    add("superscript", Rule::for_tag("sup", move |content, _, _| sup(content)));
    let kbd = wrap("`");
    add("keyboard", Rule::for_tag("kbd", move |content, _, _| kbd(content)));

    add("figure", figure_rule());
    add("media", media_rule());
    add("iframe", iframe_rule());
    add("definition_list", definition_list_rule());

    rules
}

fn chrome_rule() -> Rule {
    Rule::for_tags(&["nav", "aside", "header", "footer"], |content, _, _| {
        let content = content.trim();
        if content.is_empty() {
            return Some(String::new());
        }
        Some(format!("\n---\n{}\n---\n", content))
    })
}

fn abbreviation_rule() -> Rule {
    Rule::for_tags(&["abbr", "acronym"], |content, node, _| match node.attr("title") {
        Some(title) if !title.is_empty() => Some(format!("{} ({})", content, title)),
        _ => Some(content.to_string()),
    })
}

fn details_rule() -> Rule {
    Rule::for_tag("details", |content, node, _| {
        let summary = descendant_text(node.node, "summary");
        if summary.is_empty() {
            Some(format!("\n<details>\n{}\n</details>\n", content))
        } else {
            Some(format!(
                "\n<details>\n<summary>{}</summary>\n\n{}\n</details>\n",
                summary, content
            ))
        }
    })
}

fn figure_rule() -> Rule {
    Rule::for_tag("figure", |content, node, _| {
        let caption = descendant_text(node.node, "figcaption");
        if caption.is_empty() {
            Some(content.to_string())
        } else {
            Some(format!("{}\n*{}*\n", content, caption))
        }
    })
}

fn media_rule() -> Rule {
    Rule::for_tags(&["video", "audio"], |_, node, _| {
        // An explicit src attribute wins even when empty
        let src = match node.attr("src") {
            Some(src) => src.to_string(),
            None => node
                .node
                .find("source")
                .next()
                .and_then(|source| source.attr("src"))
                .unwrap_or_default()
                .to_string(),
        };

        let tag = node.tag_name();
        if src.is_empty() {
            Some(format!("[{}]", tag))
        } else {
            Some(format!("[{}]({})", tag, src))
        }
    })
}

fn iframe_rule() -> Rule {
    Rule::for_tag("iframe", |_, node, _| {
        let Some(src) = node.attr("src") else {
            return Some(String::new());
        };
        let title = node.attr("title").unwrap_or("Embedded content");
        Some(format!("[{}]({})", title, src))
    })
}

fn definition_list_rule() -> Rule {
    Rule::for_tag("dl", |_, node, _| {
        let mut result = String::from("\n");
        for item in node.node.descendants() {
            match item.tag_name() {
                "dt" if item.is_element() => {
                    result.push_str(&format!("**{}**\n", item.visible_text().trim()));
                }
                "dd" if item.is_element() => {
                    result.push_str(&format!(": {}\n", item.visible_text().trim()));
                }
                _ => {}
            }
        }
        Some(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeRef, References};
    use any2md_core::RenderOptions;

    fn apply(node: &Node, content: &str) -> Option<String> {
        let rules = extended_rules();
        let references = References::default();
        let node_ref = NodeRef::new(node, &references);
        let options = RenderOptions::default();
        rules
            .values()
            .filter(|rule| rule.filter.matches(node.tag_name(), &node_ref, &options))
            .find_map(|rule| rule.replace(content, &node_ref, &options))
    }

    #[test]
    fn test_wrap_rules() {
        assert_eq!(apply(&Node::element("mark"), "x").unwrap(), "==x==");
        assert_eq!(apply(&Node::element("ins"), "x").unwrap(), "++x++");
        assert_eq!(apply(&Node::element("del"), "x").unwrap(), "~~x~~");
        assert_eq!(apply(&Node::element("s"), "x").unwrap(), "~~x~~");
        assert_eq!(apply(&Node::element("strike"), "x").unwrap(), "~~x~~");
        assert_eq!(apply(&Node::element("sub"), "x").unwrap(), "~x~");
        assert_eq!(apply(&Node::element("sup"), "x").unwrap(), "^x^");
        assert_eq!(apply(&Node::element("kbd"), "x").unwrap(), "`x`");
    }

    #[test]
    fn test_chrome_rule() {
        let nav = Node::element("nav");
        assert_eq!(apply(&nav, "  links  ").unwrap(), "\n---\nlinks\n---\n");
        assert_eq!(apply(&nav, " \n ").unwrap(), "");
    }

    #[test]
    fn test_scripts_discarded() {
        for tag in ["script", "style", "noscript"] {
            assert_eq!(apply(&Node::element(tag), "alert(1)").unwrap(), "");
        }
    }

    #[test]
    fn test_abbreviation() {
        let abbr = Node::element_with_attrs("abbr", vec![("title", "Artificial Intelligence")]);
        assert_eq!(apply(&abbr, "AI").unwrap(), "AI (Artificial Intelligence)");

        let empty = Node::element_with_attrs("acronym", vec![("title", "")]);
        assert_eq!(apply(&empty, "AI").unwrap(), "AI");
    }

    #[test]
    fn test_details_with_summary() {
        let mut details = Node::element("details");
        let mut summary = Node::element("summary");
        summary.add_child(Node::text("S"));
        details.add_child(summary);
        details.add_child(Node::text("Body"));

        assert_eq!(
            apply(&details, "Body").unwrap(),
            "\n<details>\n<summary>S</summary>\n\nBody\n</details>\n"
        );
        assert_eq!(
            apply(&Node::element("details"), "Body").unwrap(),
            "\n<details>\nBody\n</details>\n"
        );
    }

    #[test]
    fn test_figure_caption() {
        let mut figure = Node::element("figure");
        let mut caption = Node::element("figcaption");
        caption.add_child(Node::text("Figure 1"));
        figure.add_child(caption);

        assert_eq!(apply(&figure, "![a](b.png)").unwrap(), "![a](b.png)\n*Figure 1*\n");
        assert_eq!(apply(&Node::element("figure"), "x").unwrap(), "x");
    }

    #[test]
    fn test_media_sources() {
        let video = Node::element_with_attrs("video", vec![("src", "movie.mp4")]);
        assert_eq!(apply(&video, "").unwrap(), "[video](movie.mp4)");

        let mut audio = Node::element("audio");
        audio.add_child(Node::element_with_attrs("source", vec![("src", "a.ogg")]));
        audio.add_child(Node::element_with_attrs("source", vec![("src", "b.mp3")]));
        assert_eq!(apply(&audio, "").unwrap(), "[audio](a.ogg)");

        assert_eq!(apply(&Node::element("video"), "").unwrap(), "[video]");
    }

    #[test]
    fn test_iframe() {
        let titled = Node::element_with_attrs("iframe", vec![("src", "https://x.test"), ("title", "Map")]);
        assert_eq!(apply(&titled, "").unwrap(), "[Map](https://x.test)");

        let untitled = Node::element_with_attrs("iframe", vec![("src", "https://x.test")]);
        assert_eq!(apply(&untitled, "").unwrap(), "[Embedded content](https://x.test)");

        assert_eq!(apply(&Node::element("iframe"), "").unwrap(), "");
    }

    #[test]
    fn test_definition_list() {
        let mut dl = Node::element("dl");
        let mut dt = Node::element("dt");
        dt.add_child(Node::text(" Term "));
        let mut dd = Node::element("dd");
        dd.add_child(Node::text("Meaning"));
        dl.add_child(dt);
        dl.add_child(dd);

        assert_eq!(apply(&dl, "ignored").unwrap(), "\n**Term**\n: Meaning\n");
    }
}
