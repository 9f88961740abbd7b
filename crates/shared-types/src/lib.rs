//! Shared data model for format-preservation verification
//!
//! Types in this crate are produced by the container inspector
//! (`shared-docx`) and consumed by the verification engine, checkpoint
//! manager and report renderer (`format-verifier`).

pub mod audit;
pub mod result;
pub mod types;

pub use audit::{hash_document, hash_file};
pub use result::{
    CategorySummary, Evidence, Finding, LossRate, OverallStatus, PassPolicy, VerificationDetails,
    VerificationResult, VerificationSummary,
};
pub use types::{
    Anchor, ChangeKind, Comment, FormatCategory, ParseCategoryError, TrackedChange,
    DEFAULT_CATEGORIES,
};
