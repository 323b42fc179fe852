//! Placeholder location
//!
//! Word processors fragment a typed token across several runs when the
//! user applies mixed formatting or autocorrect touches it, so the search
//! operates on each paragraph's flattened text, never on a single run's
//! text alone.

use doc_tree::DocumentTree;

/// A located placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMatch {
    /// Index of the owning paragraph in the body's block sequence
    pub block_index: usize,
    /// Byte offset of the token in the paragraph's flattened text
    pub start: usize,
    /// Byte offset just past the token
    pub end: usize,
}

/// Find the first paragraph, in document order, whose flattened text
/// contains `token`
///
/// A token spanning two paragraphs never matches; the caller surfaces
/// that as a placeholder-not-found failure.
pub fn find_placeholder(tree: &DocumentTree, token: &str) -> Option<PlaceholderMatch> {
    if token.is_empty() {
        return None;
    }
    for (index, block) in tree.blocks().iter().enumerate() {
        let Some(paragraph) = block.as_paragraph() else {
            continue;
        };
        if let Some(start) = paragraph.text().find(token) {
            return Some(PlaceholderMatch {
                block_index: index,
                start,
                end: start + token.len(),
            });
        }
    }
    None
}
