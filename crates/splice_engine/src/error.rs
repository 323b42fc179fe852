//! Error types for composition requests

use doc_tree::TreeError;
use package_store::PackageError;
use serde::Serialize;
use thiserror::Error;

/// Coarse failure kinds surfaced to callers
///
/// An external transport layer maps these onto its own status codes
/// without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input is not a valid package, or its document XML is malformed
    Format,
    /// The token does not occur in any template paragraph
    PlaceholderNotFound,
    /// The source package is structurally unusable
    StructuralDefect,
}

/// Errors produced by a composition request
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The template or source is not a valid package, or its document XML
    /// is malformed
    #[error("format error: {0}")]
    Format(String),

    /// The placeholder token was not found in the template body
    #[error("placeholder not found: {0}")]
    PlaceholderNotFound(String),

    /// The source package cannot supply a body to splice
    #[error("structural defect: {0}")]
    StructuralDefect(String),
}

impl ComposeError {
    /// The coarse failure kind of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            ComposeError::Format(_) => FailureKind::Format,
            ComposeError::PlaceholderNotFound(_) => FailureKind::PlaceholderNotFound,
            ComposeError::StructuralDefect(_) => FailureKind::StructuralDefect,
        }
    }
}

impl From<PackageError> for ComposeError {
    fn from(err: PackageError) -> Self {
        ComposeError::Format(err.to_string())
    }
}

impl From<TreeError> for ComposeError {
    fn from(err: TreeError) -> Self {
        ComposeError::Format(err.to_string())
    }
}

/// Result type for composition requests
pub type ComposeResult<T> = std::result::Result<T, ComposeError>;
