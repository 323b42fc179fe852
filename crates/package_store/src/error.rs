//! Error types for package operations

use thiserror::Error;

/// Errors that can occur while reading or rebuilding an OOXML package
#[derive(Debug, Error)]
pub enum PackageError {
    /// IO error while reading or writing archive entries
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error in a package-level part
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// The container lacks a mandatory part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A part lookup failed
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A part expected to hold text was not valid UTF-8
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Invalid package structure
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),
}

impl From<quick_xml::Error> for PackageError {
    fn from(err: quick_xml::Error) -> Self {
        PackageError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for PackageError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        PackageError::XmlParse(format!("Attribute error: {}", err))
    }
}

/// Result type for package operations
pub type PackageResult<T> = std::result::Result<T, PackageError>;
