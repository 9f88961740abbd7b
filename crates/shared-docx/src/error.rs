use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while opening or reading a document container
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid document {}: {reason}", .path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Failed to parse {part} in {}: {reason}", .path.display())]
    ParseError {
        path: PathBuf,
        part: String,
        reason: String,
    },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl InspectError {
    /// Path of the container the error refers to
    pub fn path(&self) -> &Path {
        match self {
            InspectError::FileNotFound(path) => path,
            InspectError::InvalidDocument { path, .. } => path,
            InspectError::ParseError { path, .. } => path,
            InspectError::Io { path, .. } => path,
        }
    }

    pub(crate) fn parse(path: &Path, part: &str, reason: impl ToString) -> Self {
        InspectError::ParseError {
            path: path.to_path_buf(),
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        InspectError::InvalidDocument {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
