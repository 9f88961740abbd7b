//! Verification results and loss metrics

use crate::types::{ChangeKind, Comment, FormatCategory, TrackedChange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const FULL_LOSS_BASIS_POINTS: u32 = 10_000;
const MAX_SAMPLES: usize = 3;
const SAMPLE_CHARS: usize = 80;

/// Fraction of items lost between two snapshots, in basis points
///
/// Computed with floor division so that only a loss of every item
/// reaches 100%.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LossRate(u32);

impl LossRate {
    pub const NONE: LossRate = LossRate(0);
    pub const TOTAL: LossRate = LossRate(FULL_LOSS_BASIS_POINTS);

    /// `(before - after) / before`, or 0% when nothing existed before
    /// or nothing was lost
    pub fn from_counts(before: usize, after: usize) -> Self {
        if before == 0 || after >= before {
            return Self::NONE;
        }
        let lost = (before - after) as u128;
        let bp = lost * FULL_LOSS_BASIS_POINTS as u128 / before as u128;
        LossRate(bp as u32)
    }

    pub fn basis_points(self) -> u32 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Every item present before is gone
    pub fn is_total(self) -> bool {
        self.0 == FULL_LOSS_BASIS_POINTS
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LossRate {
    /// `0%`, `100%`, or a percentage truncated to one decimal place
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("0%")
        } else if self.is_total() {
            f.write_str("100%")
        } else {
            write!(f, "{}.{}%", self.0 / 100, (self.0 % 100) / 10)
        }
    }
}

/// Counts and loss metrics for one category comparison
///
/// Serialized with `loss_rate` as its display string (`"100%"`) and the
/// exact value alongside as `loss_rate_basis_points`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "DetailsRecord", from = "DetailsRecord")]
pub struct VerificationDetails {
    pub before_count: usize,
    pub after_count: usize,
    pub loss_count: usize,
    pub loss_rate: LossRate,
}

impl VerificationDetails {
    pub fn from_counts(before_count: usize, after_count: usize) -> Self {
        Self {
            before_count,
            after_count,
            loss_count: before_count.saturating_sub(after_count),
            loss_rate: LossRate::from_counts(before_count, after_count),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DetailsRecord {
    before_count: usize,
    after_count: usize,
    loss_count: usize,
    #[serde(default)]
    loss_rate: String,
    loss_rate_basis_points: u32,
}

impl From<VerificationDetails> for DetailsRecord {
    fn from(details: VerificationDetails) -> Self {
        Self {
            before_count: details.before_count,
            after_count: details.after_count,
            loss_count: details.loss_count,
            loss_rate: details.loss_rate.to_string(),
            loss_rate_basis_points: details.loss_rate.basis_points(),
        }
    }
}

impl From<DetailsRecord> for VerificationDetails {
    fn from(record: DetailsRecord) -> Self {
        Self {
            before_count: record.before_count,
            after_count: record.after_count,
            loss_count: record.loss_count,
            loss_rate: LossRate(record.loss_rate_basis_points.min(FULL_LOSS_BASIS_POINTS)),
        }
    }
}

/// What a comparison observed, independent of pass policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    /// Every item survived (count unchanged or grown from a nonzero base)
    Preserved,
    /// Neither snapshot contains the category
    NotApplicable,
    /// Items appeared where none existed before
    Added,
    /// Some but not all items were lost
    PartialLoss,
    /// All items were lost
    TotalLoss,
    /// One of the snapshots could not be inspected
    Unreadable,
}

impl Finding {
    /// Classify a pair of counts
    pub fn classify(before_count: usize, after_count: usize) -> Self {
        match (before_count, after_count) {
            (0, 0) => Finding::NotApplicable,
            (0, _) => Finding::Added,
            (_, 0) => Finding::TotalLoss,
            (b, a) if a < b => Finding::PartialLoss,
            _ => Finding::Preserved,
        }
    }

    pub fn is_loss(&self) -> bool {
        matches!(self, Finding::PartialLoss | Finding::TotalLoss)
    }
}

/// Decides which findings fail a verification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPolicy {
    /// Any loss fails
    #[default]
    PreserveAll,
    /// Only a total loss fails; partial loss passes with a warning
    CriticalOnly,
}

impl PassPolicy {
    pub fn fails(&self, finding: Finding) -> bool {
        match finding {
            Finding::Unreadable | Finding::TotalLoss => true,
            Finding::PartialLoss => matches!(self, PassPolicy::PreserveAll),
            Finding::Preserved | Finding::NotApplicable | Finding::Added => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PassPolicy::PreserveAll => "preserve_all",
            PassPolicy::CriticalOnly => "critical_only",
        }
    }
}

impl fmt::Display for PassPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condensed view of one category's collection, kept as evidence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    /// Insertions (tracked changes only)
    #[serde(default)]
    pub insertion_count: usize,
    /// Deletions (tracked changes only)
    #[serde(default)]
    pub deletion_count: usize,
    /// Sorted unique authors
    pub authors: Vec<String>,
    /// First few non-empty texts, shortened
    pub samples: Vec<String>,
}

impl CategorySummary {
    pub fn from_changes(changes: &[TrackedChange]) -> Self {
        let insertion_count = changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Insertion)
            .count();
        Self {
            count: changes.len(),
            insertion_count,
            deletion_count: changes.len() - insertion_count,
            authors: unique_authors(changes.iter().map(|c| c.author.as_deref())),
            samples: samples(changes.iter().map(|c| c.text.as_str())),
        }
    }

    pub fn from_comments(comments: &[Comment]) -> Self {
        Self {
            count: comments.len(),
            insertion_count: 0,
            deletion_count: 0,
            authors: unique_authors(comments.iter().map(|c| c.author.as_deref())),
            samples: samples(comments.iter().map(|c| c.text.as_str())),
        }
    }
}

fn unique_authors<'a>(authors: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    authors
        .flatten()
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn samples<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<String> {
    texts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_SAMPLES)
        .map(|t| {
            if t.chars().count() > SAMPLE_CHARS {
                let cut: String = t.chars().take(SAMPLE_CHARS).collect();
                format!("{}...", cut)
            } else {
                t.to_string()
            }
        })
        .collect()
}

/// Collections observed on each side of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub before: Option<CategorySummary>,
    pub after: Option<CategorySummary>,
}

/// Outcome of verifying one category between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub category: FormatCategory,
    pub passed: bool,
    pub message: String,
    pub details: VerificationDetails,
    pub finding: Finding,
    /// Policy that decided `passed`
    pub policy: PassPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Cause when a snapshot could not be inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    /// Nonzero prior count dropped to zero
    pub fn is_catastrophic(&self) -> bool {
        self.details.loss_rate.is_total()
    }

    /// Passed, but lost items under a lenient policy
    pub fn is_warning(&self) -> bool {
        self.passed && self.finding.is_loss()
    }

    pub fn status_label(&self) -> &'static str {
        if !self.passed {
            "FAIL"
        } else if self.is_warning() {
            "WARN"
        } else {
            "PASS"
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.status_label(), self.category, self.message)
    }
}

/// Overall status of a batch of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Pass,
    PassWithWarnings,
    Fail,
}

/// Aggregate counts over a list of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub catastrophic: usize,
    pub failed_categories: Vec<FormatCategory>,
    pub status: OverallStatus,
}

impl VerificationSummary {
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let warnings = results.iter().filter(|r| r.is_warning()).count();
        let failed = results.len() - passed;

        let status = if failed > 0 {
            OverallStatus::Fail
        } else if warnings > 0 {
            OverallStatus::PassWithWarnings
        } else {
            OverallStatus::Pass
        };

        Self {
            total: results.len(),
            passed,
            failed,
            warnings,
            catastrophic: results.iter().filter(|r| r.is_catastrophic()).count(),
            failed_categories: results
                .iter()
                .filter(|r| !r.passed)
                .map(|r| r.category)
                .collect(),
            status,
        }
    }

    /// Pass rate as `"66.7%"`, or `"N/A"` for an empty batch
    pub fn pass_rate(&self) -> String {
        if self.total == 0 {
            "N/A".to_string()
        } else {
            format!("{:.1}%", self.passed as f64 / self.total as f64 * 100.0)
        }
    }
}
