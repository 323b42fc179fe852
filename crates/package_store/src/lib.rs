//! Package Store - OOXML zip container I/O
//!
//! This crate handles the container layer of the composition engine:
//! opening a word-processing package into memory, part lookup, rebuild with
//! selective part replacement, relationship tables, and content-type
//! bookkeeping. It never interprets document content; that is the job of
//! the `doc_tree` crate.

mod content_types;
mod error;
mod package;
mod paths;
mod relationships;
mod xml;

pub use content_types::{append_defaults, media_content_type, ContentTypes};
pub use error::{PackageError, PackageResult};
pub use package::{OpcPackage, Part, CONTENT_TYPES_PATH, ROOT_RELS_PATH};
pub use paths::{extension, is_xml_part, rels_path_for, resolve_target};
pub use relationships::{
    allocate_id, append_relationships, relationship_types, Relationship, Relationships, TargetMode,
};
