//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod extended;
mod rule;

pub use commonmark::commonmark_rules;
pub use extended::extended_rules;
pub use rule::{Filter, ReplacementFn, Rule};

use any2md_core::RenderOptions;
use indexmap::IndexMap;

use crate::node::NodeRef;

/// Immutable rule table consulted for every element.
///
/// Keyed rules (the extended tag rules plus anything added with
/// [`Rules::add`]) are checked in insertion order before the CommonMark
/// rules.
#[derive(Debug)]
pub struct Rules {
    keyed_rules: IndexMap<String, Rule>,
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// Create the default table: extended tag rules, then CommonMark rules
    pub fn new() -> Self {
        Self {
            keyed_rules: extended_rules(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// CommonMark rules only
    pub fn commonmark() -> Self {
        Self {
            keyed_rules: IndexMap::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Add a keyed rule; an existing rule with the same key is replaced in place
    pub fn add(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.keyed_rules.insert(key.to_string(), rule);
        self
    }

    /// Rule keys in lookup order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keyed_rules.keys().map(String::as_str)
    }

    /// Run the first matching rule that accepts the element
    pub fn apply(&self, content: &str, node: &NodeRef, options: &RenderOptions) -> Option<String> {
        let tag = node.tag_name();
        self.keyed_rules
            .values()
            .chain(self.commonmark_rules.iter())
            .filter(|rule| rule.filter.matches(tag, node, options))
            .find_map(|rule| rule.replace(content, node, options))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
