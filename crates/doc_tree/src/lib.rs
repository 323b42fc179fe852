//! Doc Tree - block-level document body model
//!
//! Parses a word-processing document part into an addressable sequence of
//! block elements (paragraphs, tables, section markers) with run-level text
//! decomposition, while keeping every byte of the original XML. Supports
//! structural queries, block-sequence mutation, and paragraph splitting
//! around a text match; serialization of an unmutated tree is byte-exact.

mod block;
mod error;
mod paragraph;
mod tree;
mod xml;

pub use block::{Block, SectionMarker, Table};
pub use error::{TreeError, TreeResult};
pub use paragraph::{text_run_xml, Paragraph, Run};
pub use tree::DocumentTree;
