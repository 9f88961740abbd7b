//! Format preservation verification
//!
//! Compares a document before and after a processing stage and reports
//! whether its tracked changes and comments survived. Verification reads
//! the revision and comment markup directly, so a stage that flattens a
//! document to text and rebuilds it is caught even when the visible text
//! looks right.
//!
//! # Example
//!
//! ```no_run
//! use format_verifier::report::{format_catastrophic_loss_alert, format_report};
//! use format_verifier::{verify_round_trip, CheckpointManager, VerifyConfig};
//!
//! # fn example() -> Result<(), format_verifier::VerifyError> {
//! let results = verify_round_trip("contract.docx", "contract.processed.docx");
//! println!("{}", format_report(&results));
//! for alert in results.iter().filter_map(format_catastrophic_loss_alert) {
//!     eprintln!("{}", alert);
//! }
//!
//! let mut manager = CheckpointManager::new(VerifyConfig::default());
//! manager.add_checkpoint("stage-1.docx", "parsed")?;
//! manager.add_checkpoint("stage-2.docx", "redlined")?;
//! let pipeline = manager.verify_all_checkpoints();
//! assert!(pipeline.get("parsed→redlined").is_some());
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;

#[cfg(test)]
mod testing;

pub use checkpoint::{
    transition_label, CategoryState, Checkpoint, CheckpointManager, PipelineResults, Transition,
    CHECKPOINT_FORMAT_VERSION,
};
pub use config::VerifyConfig;
pub use engine::Verifier;
pub use error::VerifyError;
pub use report::{OutputFormat, Reporter};

pub use shared_docx::InspectError;
pub use shared_types::{
    Finding, FormatCategory, LossRate, PassPolicy, VerificationDetails, VerificationResult,
    VerificationSummary, DEFAULT_CATEGORIES,
};

use std::path::Path;

/// Verify tracked changes under the default configuration
pub fn verify_track_changes(
    before: impl AsRef<Path>,
    after: impl AsRef<Path>,
) -> VerificationResult {
    Verifier::default().verify(before, after, FormatCategory::TrackChanges)
}

/// Verify comments under the default configuration
pub fn verify_comments(before: impl AsRef<Path>, after: impl AsRef<Path>) -> VerificationResult {
    Verifier::default().verify(before, after, FormatCategory::Comments)
}

/// Verify every default category
pub fn verify_round_trip(
    before: impl AsRef<Path>,
    after: impl AsRef<Path>,
) -> Vec<VerificationResult> {
    Verifier::default().verify_round_trip(before, after)
}

pub fn has_tracked_changes(path: impl AsRef<Path>) -> Result<bool, InspectError> {
    engine::has_tracked_changes(path)
}

pub fn has_comments(path: impl AsRef<Path>) -> Result<bool, InspectError> {
    engine::has_comments(path)
}

/// Capture a standalone checkpoint of the default categories
pub fn create_checkpoint(
    path: impl AsRef<Path>,
    name: impl Into<String>,
) -> Result<Checkpoint, VerifyError> {
    Checkpoint::capture(path, name, DEFAULT_CATEGORIES)
}

/// Compare a document against a previously captured checkpoint
///
/// The before side is the state captured in `previous`; its file on disk is
/// not read again. Only the categories `previous` captured are checked.
pub fn compare_checkpoints(
    current: impl AsRef<Path>,
    previous: &Checkpoint,
) -> Vec<VerificationResult> {
    checkpoint::compare_with_checkpoint(
        &Verifier::default(),
        previous,
        current.as_ref(),
        previous.captured().keys().copied().collect(),
    )
}
