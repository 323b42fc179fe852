//! Content splicing
//!
//! Replaces the placeholder paragraph with the source body's block
//! sequence. Text around the token inside the placeholder paragraph
//! survives as prefix and suffix paragraphs, and the source's section
//! properties are dropped so the template's page layout wins.

use crate::error::ComposeResult;
use crate::locate::PlaceholderMatch;
use doc_tree::{Block, DocumentTree};
use std::ops::Range;

/// Outcome of a splice
#[derive(Debug, Clone)]
pub struct SpliceOutcome {
    /// Index range of the spliced-in source blocks in the merged body
    pub inserted: Range<usize>,
}

/// Splice the source body into the template at the located placeholder
///
/// The placeholder paragraph is replaced by: a prefix paragraph holding
/// the runs before the token (when any), the source blocks minus any
/// section marker, and a suffix paragraph holding the runs after the
/// token (when any). All sibling blocks of the template stay untouched,
/// so the merged body keeps exactly one terminal section marker - the
/// template's own.
pub fn splice(
    template: &mut DocumentTree,
    at: &PlaceholderMatch,
    source: &DocumentTree,
) -> ComposeResult<SpliceOutcome> {
    let paragraph = template
        .paragraph_at(at.block_index)
        .cloned()
        .ok_or(doc_tree::TreeError::BlockOutOfBounds(at.block_index))?;

    let body: Vec<Block> = source
        .blocks()
        .iter()
        .filter(|b| !b.is_section_marker())
        .cloned()
        .collect();

    let mut replacement: Vec<Block> = Vec::with_capacity(body.len() + 2);

    let prefix = paragraph.runs_before(at.start);
    if !prefix.is_empty() {
        replacement.push(Block::Paragraph(paragraph.with_runs(&prefix)?));
    }
    let inserted_start = at.block_index + replacement.len();
    replacement.extend(body);
    let inserted_end = at.block_index + replacement.len();

    let suffix = paragraph.runs_after(at.end);
    if !suffix.is_empty() {
        replacement.push(Block::Paragraph(paragraph.with_runs(&suffix)?));
    }

    template.replace_block(at.block_index, replacement)?;
    Ok(SpliceOutcome {
        inserted: inserted_start..inserted_end,
    })
}
