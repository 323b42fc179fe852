//! Error types for document tree operations

use thiserror::Error;

/// Errors that can occur while parsing or mutating a document tree
#[derive(Debug, Error)]
pub enum TreeError {
    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlMalformed(String),

    /// The document part has no body element
    #[error("document has no body element")]
    MissingBody,

    /// A mutation addressed a block index past the end of the body
    #[error("block index {0} out of bounds")]
    BlockOutOfBounds(usize),
}

impl From<quick_xml::Error> for TreeError {
    fn from(err: quick_xml::Error) -> Self {
        TreeError::XmlMalformed(err.to_string())
    }
}

/// Result type for document tree operations
pub type TreeResult<T> = std::result::Result<T, TreeError>;
