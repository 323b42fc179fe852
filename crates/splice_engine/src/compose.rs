//! Composition orchestration
//!
//! Sequences the package, tree, locate, splice, and reconcile layers into
//! one request -> response operation. Every composition is a single
//! synchronous computation over fully-buffered inputs; nothing is shared
//! between requests.

use crate::error::{ComposeError, ComposeResult};
use crate::locate::find_placeholder;
use crate::reconcile::reconcile;
use crate::report::{ComposeReport, Degradation};
use crate::splice::splice;
use doc_tree::{Block, DocumentTree, TreeError};
use package_store::{OpcPackage, CONTENT_TYPES_PATH};
use std::collections::HashMap;

/// Default placeholder token, by convention
pub const DEFAULT_TOKEN: &str = "{{Content}}";

/// A successful composition: the merged package plus its report
#[derive(Debug, Clone)]
pub struct Composition {
    /// The merged package bytes
    pub bytes: Vec<u8>,
    /// Metadata about the merge
    pub report: ComposeReport,
}

/// Compose two packages: replace the paragraph holding `token` in
/// `template` with the body content of `source`
///
/// The template's page layout, styles, and untouched parts survive
/// byte-for-byte; relationships referenced by the spliced-in content are
/// remapped to fresh IDs and their media parts copied over.
pub fn compose(
    template_bytes: &[u8],
    source_bytes: &[u8],
    token: &str,
) -> ComposeResult<Composition> {
    let template = OpcPackage::open(template_bytes)?;
    let source = OpcPackage::open(source_bytes)?;

    let mut merged = DocumentTree::parse(template.document_xml()?)?;
    let source_tree = match DocumentTree::parse(source.document_xml()?) {
        Ok(tree) => tree,
        Err(TreeError::MissingBody) => {
            return Err(ComposeError::StructuralDefect(
                "source document has no body".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let located = find_placeholder(&merged, token)
        .ok_or_else(|| ComposeError::PlaceholderNotFound(token.to_string()))?;
    tracing::debug!(block = located.block_index, "placeholder located");

    let outcome = splice(&mut merged, &located, &source_tree)?;
    tracing::debug!(blocks = outcome.inserted.len(), "source body spliced");

    let reconciliation = reconcile(&template, &source, &mut merged, outcome.inserted)?;

    let report = ComposeReport {
        remapped: reconciliation.remapped,
        copied_parts: reconciliation
            .extra_parts
            .iter()
            .map(|(path, _)| path.clone())
            .collect(),
        degradations: reconciliation.degradations,
        substitutions: Vec::new(),
    };

    let mut replacements = HashMap::new();
    let mut additions = reconciliation.extra_parts;
    replacements.insert(template.document_path()?, merged.to_xml().into_bytes());
    if let Some(rels_xml) = reconciliation.rels_xml {
        // A template that never referenced anything has no .rels part for
        // its document; the merged table then joins the package as a new
        // part rather than a replacement.
        let rels_path = template.document_rels_path()?;
        if template.contains(&rels_path) {
            replacements.insert(rels_path, rels_xml.into_bytes());
        } else {
            additions.push((rels_path, rels_xml.into_bytes()));
        }
    }
    if let Some(ct_xml) = reconciliation.content_types_xml {
        replacements.insert(CONTENT_TYPES_PATH.to_string(), ct_xml.into_bytes());
    }

    let bytes = template.rebuild(&replacements, &additions)?;
    Ok(Composition { bytes, report })
}

/// Replace literal text tokens throughout the template's paragraphs
///
/// Every occurrence of each token is replaced with its plain text value;
/// the replacement run inherits the formatting of the run the occurrence
/// starts in. Tokens absent from the document are recorded as
/// degradations rather than failing the call.
pub fn substitute_text(
    template_bytes: &[u8],
    substitutions: &[(String, String)],
) -> ComposeResult<Composition> {
    let template = OpcPackage::open(template_bytes)?;
    let mut tree = DocumentTree::parse(template.document_xml()?)?;

    let mut report = ComposeReport::default();
    for (token, value) in substitutions {
        if token.is_empty() {
            continue;
        }
        let mut occurrences = 0usize;
        for index in 0..tree.blocks().len() {
            let replaced = match tree.paragraph_at(index) {
                Some(paragraph) => paragraph.replace_text(token, value)?,
                None => continue,
            };
            if let Some((rebuilt, count)) = replaced {
                occurrences += count;
                tree.replace_block(index, vec![Block::Paragraph(rebuilt)])?;
            }
        }
        if occurrences == 0 {
            report.degradations.push(Degradation::TokenNotFound {
                token: token.clone(),
            });
        } else {
            tracing::debug!(token = %token, occurrences, "token substituted");
            report.substitutions.push((token.clone(), occurrences));
        }
    }

    let mut replacements = HashMap::new();
    replacements.insert(template.document_path()?, tree.to_xml().into_bytes());
    let bytes = template.rebuild(&replacements, &[])?;
    Ok(Composition { bytes, report })
}
