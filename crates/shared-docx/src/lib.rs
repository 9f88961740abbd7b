//! Word-processing container inspection
//!
//! Opens zip-of-XML document containers and extracts revision markup and
//! comments directly from their XML parts. Nothing here resolves a document
//! to plain text and nothing writes to the container.
//!
//! # Example
//! ```no_run
//! use shared_docx::{extract_comments, extract_tracked_changes, DocxSnapshot, InspectError};
//!
//! fn inspect(path: &str) -> Result<(), InspectError> {
//!     let snapshot = DocxSnapshot::open(path)?;
//!     let changes = extract_tracked_changes(&snapshot)?;
//!     let comments = extract_comments(&snapshot)?;
//!     println!("{} tracked changes, {} comments", changes.len(), comments.len());
//!     Ok(())
//! }
//! ```

pub mod comments;
pub mod container;
pub mod error;
pub mod revisions;
mod xml;

#[cfg(test)]
mod testing;

pub use comments::extract_comments;
pub use container::{DocxSnapshot, DEFAULT_COMMENTS_PART, DEFAULT_MAIN_PART};
pub use error::InspectError;
pub use revisions::{extract_tracked_changes, revision_text, RevisionText};

/// Open the container at `path`
pub fn open(path: impl AsRef<std::path::Path>) -> Result<DocxSnapshot, InspectError> {
    DocxSnapshot::open(path)
}
