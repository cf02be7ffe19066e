//! Rule and Filter types for HTML conversion.

use any2md_core::RenderOptions;

use crate::node::NodeRef;

/// Replacement function: (rendered child content, node, options).
///
/// Returning `None` declines the element so the next matching rule, or the
/// default conversion, handles it. `Some(String::new())` produces nothing.
pub type ReplacementFn =
    Box<dyn Fn(&str, &NodeRef, &RenderOptions) -> Option<String> + Send + Sync>;

type PredicateFn = Box<dyn Fn(&str, &NodeRef, &RenderOptions) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RenderOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, tag: &str, node: &NodeRef, options: &RenderOptions) -> bool {
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, options),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::TagName(t) => f.debug_tuple("TagName").field(t).finish(),
            Filter::TagNames(tags) => f.debug_tuple("TagNames").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RenderOptions) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RenderOptions) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&str, &NodeRef, &RenderOptions) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Apply this rule's replacement
    pub fn replace(&self, content: &str, node: &NodeRef, options: &RenderOptions) -> Option<String> {
        (self.replacement)(content, node, options)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("filter", &self.filter).finish_non_exhaustive()
    }
}
