use shared_types::ParseCategoryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from checkpoint management and configuration
///
/// Comparison failures are not errors: `verify` and `verify_round_trip`
/// report them as failing results.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Checkpoint '{0}' already exists")]
    DuplicateName(String),

    #[error("Checkpoint '{0}' not found")]
    CheckpointNotFound(String),

    #[error(transparent)]
    UnknownCategory(#[from] ParseCategoryError),

    #[error("Checkpoint persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
