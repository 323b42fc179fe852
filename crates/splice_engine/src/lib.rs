//! Splice Engine - OOXML package composition
//!
//! Composes two independently-authored word-processing packages into one:
//! a template package containing a textual placeholder token, and a source
//! package whose body content replaces that token in place.
//!
//! # Features
//!
//! - Placeholder search over flattened paragraph text, so tokens split
//!   across runs by mixed formatting are still found
//! - Splicing that keeps the text around the token and the template's
//!   section properties (page geometry, margins, pagination)
//! - Relationship remapping with collision-free ID allocation, media part
//!   carry-over, and content-type bookkeeping
//! - Literal text substitution preserving run formatting
//!
//! # Example
//!
//! ```ignore
//! use splice_engine::{compose, DEFAULT_TOKEN};
//!
//! let template = std::fs::read("template.docx")?;
//! let source = std::fs::read("source.docx")?;
//! let merged = compose(&template, &source, DEFAULT_TOKEN)?;
//! std::fs::write("merged.docx", &merged.bytes)?;
//! ```

mod compose;
mod error;
mod locate;
mod reconcile;
mod report;
mod splice;
mod tests;

pub use compose::{compose, substitute_text, Composition, DEFAULT_TOKEN};
pub use error::{ComposeError, ComposeResult, FailureKind};
pub use locate::{find_placeholder, PlaceholderMatch};
pub use reconcile::{reconcile, Reconciliation};
pub use report::{ComposeReport, Degradation, RemappedRelationship};
pub use splice::{splice, SpliceOutcome};
