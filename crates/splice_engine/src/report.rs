//! Composition outcome reporting

use serde::Serialize;

/// One relationship carried over from the source package
#[derive(Debug, Clone, Serialize)]
pub struct RemappedRelationship {
    /// ID the relationship had in the source document
    pub source_id: String,
    /// Freshly allocated ID in the merged document
    pub merged_id: String,
    /// Relationship target, preserved verbatim
    pub target: String,
}

/// A recoverable problem encountered during composition
///
/// Degradations never abort a request; they are reported alongside the
/// output so callers can decide whether the result is good enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// An internal relationship's target part was missing from the source
    /// archive; the reference stays in the output unresolved
    MissingSourcePart {
        relationship_id: String,
        target: String,
    },
    /// A substitution token did not occur anywhere in the document
    TokenNotFound { token: String },
}

/// Metadata describing one successful composition
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComposeReport {
    /// Relationships carried over from the source package
    pub remapped: Vec<RemappedRelationship>,
    /// Paths of parts copied into the output package
    pub copied_parts: Vec<String>,
    /// Recoverable degradations; empty on a clean merge
    pub degradations: Vec<Degradation>,
    /// Text substitutions performed, as (token, occurrence count)
    pub substitutions: Vec<(String, usize)>,
}

impl ComposeReport {
    /// Whether the composition completed without degradations
    pub fn is_clean(&self) -> bool {
        self.degradations.is_empty()
    }
}
