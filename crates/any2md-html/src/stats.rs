//! Structural statistics for parsed HTML trees.

use any2md_core::ElementsCount;

use crate::node::Node;

/// Count structural elements anywhere in the tree.
///
/// Counting is independent of rendering, so rule overrides never change
/// the result. `pre` and `code` are counted separately, so a fenced block
/// written as `<pre><code>` contributes two code blocks.
pub fn count_elements(tree: &Node) -> ElementsCount {
    let mut counts = ElementsCount::default();
    let nodes = std::iter::once(tree).chain(tree.descendants());

    for node in nodes.filter(|n| n.is_element()) {
        match node.tag_name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => counts.headings += 1,
            "p" => counts.paragraphs += 1,
            "a" => counts.links += 1,
            "img" => counts.images += 1,
            "ul" | "ol" => counts.lists += 1,
            "pre" | "code" => counts.code_blocks += 1,
            "table" => counts.tables += 1,
            _ => {}
        }
    }

    counts
}
