//! Relationship (.rels) table parsing and serialization
//!
//! Every part that references other parts owns a relationship table mapping
//! IDs of the form `rId<N>` to a target. Merging two packages means merging
//! two such tables without ID collisions, so serialization here is
//! append-based: new entries are spliced into the original XML text and an
//! untouched table stays byte-identical.

use crate::error::{PackageError, PackageResult};
use crate::xml::{escape_xml_attr, XmlParser};
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};

/// Relationship types used by the composition engine
pub mod relationship_types {
    pub const DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// A single relationship in a .rels part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the owning table (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path relative to the owning part, or an external URI
    pub target: String,
    /// Target mode (internal part or external location)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from one .rels part
///
/// Entries keep document order so re-serialization is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
    by_id: HashMap<String, usize>,
}

impl Relationships {
    /// Create an empty relationship table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels part from its XML content
    pub fn parse(content: &str) -> PackageResult<Self> {
        let mut result = Self::new();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Relationship") {
                        let id = XmlParser::get_attribute(e, b"Id").ok_or_else(|| {
                            PackageError::InvalidStructure("Relationship missing Id".into())
                        })?;
                        let rel_type = XmlParser::get_attribute(e, b"Type").ok_or_else(|| {
                            PackageError::InvalidStructure("Relationship missing Type".into())
                        })?;
                        let target = XmlParser::get_attribute(e, b"Target").ok_or_else(|| {
                            PackageError::InvalidStructure("Relationship missing Target".into())
                        })?;
                        let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                            .map(|m| {
                                if m == "External" {
                                    TargetMode::External
                                } else {
                                    TargetMode::Internal
                                }
                            })
                            .unwrap_or_default();

                        result.push(Relationship { id, rel_type, target, target_mode });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PackageError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Add a relationship; a later entry with a duplicate ID is ignored
    pub fn push(&mut self, rel: Relationship) {
        if self.by_id.contains_key(&rel.id) {
            return;
        }
        self.by_id.insert(rel.id.clone(), self.entries.len());
        self.entries.push(rel);
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    /// Get the first relationship of a given type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.rel_type == rel_type)
    }

    /// Check if a relationship ID is present
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// All relationship IDs in the table
    pub fn ids(&self) -> HashSet<String> {
        self.by_id.keys().cloned().collect()
    }

    /// All relationships in document order
    pub fn all(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate XML for a freshly created table
    ///
    /// Only used when the owning package has no .rels part yet; merging into
    /// an existing part goes through [`append_relationships`] instead.
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&serialize_relationship(rel));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Splice new relationship entries into an existing .rels part
///
/// The original XML text is preserved byte-for-byte apart from the inserted
/// elements, which land immediately before the closing tag.
pub fn append_relationships(original_xml: &str, new_rels: &[Relationship]) -> PackageResult<String> {
    if new_rels.is_empty() {
        return Ok(original_xml.to_string());
    }
    let close = original_xml.rfind("</Relationships>").ok_or_else(|| {
        PackageError::InvalidStructure("relationship part has no closing element".into())
    })?;

    let mut xml = String::with_capacity(original_xml.len() + new_rels.len() * 96);
    xml.push_str(&original_xml[..close]);
    for rel in new_rels {
        xml.push_str(&serialize_relationship(rel));
    }
    xml.push_str(&original_xml[close..]);
    Ok(xml)
}

fn serialize_relationship(rel: &Relationship) -> String {
    let mut xml = format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}""#,
        escape_xml_attr(&rel.id),
        escape_xml_attr(&rel.rel_type),
        escape_xml_attr(&rel.target)
    );
    if rel.target_mode == TargetMode::External {
        xml.push_str(r#" TargetMode="External""#);
    }
    xml.push_str("/>");
    xml
}

/// Allocate a fresh relationship ID that does not collide with `existing`
///
/// IDs follow the `rId<N>` convention; the smallest unused integer suffix
/// wins, starting from 1.
pub fn allocate_id(existing: &HashSet<String>) -> String {
    let mut n = 1u32;
    loop {
        let candidate = format!("rId{}", n);
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
