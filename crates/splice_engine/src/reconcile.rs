//! Relationship and media reconciliation
//!
//! Spliced-in content still carries the source package's relationship IDs.
//! Copying those through unchanged risks silent collisions with the
//! template's own IDs (two unrelated relationships sharing rId3) that
//! corrupt the result without raising any parse error, so every
//! source-origin reference is remapped to a freshly allocated ID in the
//! template's table, and the parts those relationships point at are
//! carried into the output package.

use crate::error::{ComposeError, ComposeResult};
use crate::report::{Degradation, RemappedRelationship};
use doc_tree::{Block, DocumentTree};
use package_store::{
    allocate_id, append_defaults, append_relationships, extension, media_content_type, ContentTypes,
    OpcPackage, Relationship, Relationships, TargetMode, CONTENT_TYPES_PATH,
};
use regex_lite::Regex;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Everything the rebuild step needs after reconciliation
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Old source ID -> freshly allocated template ID
    pub id_map: HashMap<String, String>,
    /// Parts to add to the output package (path, bytes)
    pub extra_parts: Vec<(String, Vec<u8>)>,
    /// Updated document relationship part, when it changed
    pub rels_xml: Option<String>,
    /// Updated content-type part, when it changed
    pub content_types_xml: Option<String>,
    /// Recoverable degradations encountered
    pub degradations: Vec<Degradation>,
    /// Remap records for the report
    pub remapped: Vec<RemappedRelationship>,
}

/// Reconcile cross-package references inside the spliced-in blocks
///
/// `inserted` is the block range the splicer filled with source content;
/// references outside it are template-native and never touched. When the
/// range references no IDs at all, the template's relationship table and
/// content types pass through unchanged.
pub fn reconcile(
    template: &OpcPackage,
    source: &OpcPackage,
    merged: &mut DocumentTree,
    inserted: Range<usize>,
) -> ComposeResult<Reconciliation> {
    let mut out = Reconciliation::default();
    let pattern = reference_pattern();

    // IDs referenced by the source-origin content, in document order.
    let used: Vec<String> = {
        let mut used = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for block in &merged.blocks()[inserted.clone()] {
            for caps in pattern.captures_iter(block.xml()) {
                if let Some(value) = caps.get(1) {
                    if seen.insert(value.as_str().to_string()) {
                        used.push(value.as_str().to_string());
                    }
                }
            }
        }
        used
    };
    if used.is_empty() {
        return Ok(out);
    }

    let source_rels = source.document_rels()?;
    let source_doc_path = source.document_path()?;
    let template_doc_path = template.document_path()?;
    let template_rels_path = template.document_rels_path()?;
    let template_rels_original = match template.part_opt(&template_rels_path) {
        Some(data) => Some(std::str::from_utf8(data).map_err(|e| ComposeError::Format(e.to_string()))?),
        None => None,
    };
    let template_rels = match template_rels_original {
        Some(xml) => Relationships::parse(xml)?,
        None => Relationships::new(),
    };
    let content_types = match template.part_opt(CONTENT_TYPES_PATH) {
        Some(data) => Some(ContentTypes::parse(
            std::str::from_utf8(data).map_err(|e| ComposeError::Format(e.to_string()))?,
        )?),
        None => None,
    };

    let mut existing = template_rels.ids();
    let mut new_entries: Vec<Relationship> = Vec::new();
    let mut new_defaults: Vec<(String, String)> = Vec::new();

    for old_id in &used {
        // Entries the source table never declared stay as they are: they
        // were dangling in the source and remain dangling in the output.
        let Some(rel) = source_rels.get(old_id) else {
            continue;
        };

        let new_id = allocate_id(&existing);
        existing.insert(new_id.clone());
        out.id_map.insert(old_id.clone(), new_id.clone());
        out.remapped.push(RemappedRelationship {
            source_id: old_id.clone(),
            merged_id: new_id.clone(),
            target: rel.target.clone(),
        });
        new_entries.push(Relationship {
            id: new_id,
            rel_type: rel.rel_type.clone(),
            target: rel.target.clone(),
            target_mode: rel.target_mode,
        });

        if rel.target_mode == TargetMode::External {
            // External targets point outside the package; nothing to copy.
            continue;
        }

        let source_part_path = package_store::resolve_target(&source_doc_path, &rel.target);
        match source.part_opt(&source_part_path) {
            Some(bytes) => {
                let output_path = package_store::resolve_target(&template_doc_path, &rel.target);
                if let (Some(ct), Some(ext)) = (&content_types, extension(&output_path)) {
                    if !ct.has_default(&ext) && !new_defaults.iter().any(|(e, _)| *e == ext) {
                        new_defaults.push((ext.clone(), media_content_type(&ext).to_string()));
                    }
                }
                out.extra_parts.push((output_path, bytes.to_vec()));
            }
            None => {
                tracing::warn!(
                    part = %source_part_path,
                    id = %old_id,
                    "referenced part missing from source package"
                );
                out.degradations.push(Degradation::MissingSourcePart {
                    relationship_id: old_id.clone(),
                    target: rel.target.clone(),
                });
            }
        }
    }

    // Rewrite the inserted blocks' references to the allocated IDs;
    // template-native references keep their values.
    if !out.id_map.is_empty() {
        for index in inserted {
            let rewritten = rewrite_references(merged.blocks()[index].xml(), &pattern, &out.id_map);
            if let Some(xml) = rewritten {
                let block = Block::parse(&xml)?;
                merged.replace_block(index, vec![block])?;
            }
        }
    }

    if !new_entries.is_empty() {
        out.rels_xml = Some(match template_rels_original {
            Some(xml) => append_relationships(xml, &new_entries)?,
            None => {
                let mut fresh = Relationships::new();
                for rel in new_entries {
                    fresh.push(rel);
                }
                fresh.to_xml()
            }
        });
    }
    if !new_defaults.is_empty() {
        if let Some(data) = template.part_opt(CONTENT_TYPES_PATH) {
            let xml = std::str::from_utf8(data).map_err(|e| ComposeError::Format(e.to_string()))?;
            out.content_types_xml = Some(append_defaults(xml, &new_defaults)?);
        }
    }

    tracing::debug!(
        remapped = out.id_map.len(),
        parts = out.extra_parts.len(),
        "reconciled relationships"
    );
    Ok(out)
}

/// Attribute names of reference kind: `r:id`, `r:embed`, `r:link` under
/// any namespace prefix
fn reference_pattern() -> Regex {
    Regex::new(r#"[A-Za-z][A-Za-z0-9]*:(?:id|embed|link)="([^"]+)""#).expect("invalid regex")
}

/// Rewrite reference attribute values per `id_map`; returns `None` when
/// nothing changed
fn rewrite_references(
    xml: &str,
    pattern: &Regex,
    id_map: &HashMap<String, String>,
) -> Option<String> {
    let mut result = String::with_capacity(xml.len());
    let mut last = 0usize;
    let mut changed = false;

    for caps in pattern.captures_iter(xml) {
        let Some(value) = caps.get(1) else { continue };
        if let Some(new_id) = id_map.get(value.as_str()) {
            result.push_str(&xml[last..value.start()]);
            result.push_str(new_id);
            last = value.end();
            changed = true;
        }
    }
    if !changed {
        return None;
    }
    result.push_str(&xml[last..]);
    Some(result)
}
