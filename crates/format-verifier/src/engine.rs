//! Before/after comparison of format categories
//!
//! The engine never raises for unreadable inputs. A missing, invalid or
//! malformed document becomes a failing result with finding
//! [`Finding::Unreadable`] so a batch over many documents keeps going.

use crate::config::VerifyConfig;
use shared_docx::{extract_comments, extract_tracked_changes, DocxSnapshot, InspectError};
use shared_types::{
    CategorySummary, Evidence, Finding, FormatCategory, VerificationDetails, VerificationResult,
};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
enum Side {
    Before,
    After,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Before => f.write_str("Before"),
            Side::After => f.write_str("After"),
        }
    }
}

/// Compares documents under an explicit [`VerifyConfig`]
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifyConfig,
}

impl Verifier {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify one category between two documents on disk
    #[instrument(skip_all, fields(category = %category))]
    pub fn verify(
        &self,
        before: impl AsRef<Path>,
        after: impl AsRef<Path>,
        category: FormatCategory,
    ) -> VerificationResult {
        let before = DocxSnapshot::open(before);
        let after = DocxSnapshot::open(after);
        self.judge(&before, &after, category)
    }

    /// Verify every configured category, opening each document once
    ///
    /// Results follow category order. Each category is judged on its own:
    /// a malformed comments part fails the comments check without touching
    /// the tracked-changes check.
    #[instrument(skip_all, fields(categories = self.config.categories.len()))]
    pub fn verify_round_trip(
        &self,
        before: impl AsRef<Path>,
        after: impl AsRef<Path>,
    ) -> Vec<VerificationResult> {
        if self.config.categories.is_empty() {
            debug!("No categories configured, nothing to verify");
            return Vec::new();
        }

        let before = DocxSnapshot::open(before);
        let after = DocxSnapshot::open(after);
        self.config
            .categories
            .iter()
            .map(|&category| self.judge(&before, &after, category))
            .collect()
    }

    /// Verify one category between two already opened snapshots
    pub fn verify_snapshots(
        &self,
        before: &DocxSnapshot,
        after: &DocxSnapshot,
        category: FormatCategory,
    ) -> VerificationResult {
        let before_summary =
            summarize(before, category).map_err(|e| describe_failure(Side::Before, &e));
        let after_summary =
            summarize(after, category).map_err(|e| describe_failure(Side::After, &e));
        self.decide(category, before_summary, after_summary)
    }

    fn judge(
        &self,
        before: &Result<DocxSnapshot, InspectError>,
        after: &Result<DocxSnapshot, InspectError>,
        category: FormatCategory,
    ) -> VerificationResult {
        let before_summary = inspect(Side::Before, before, category);
        let after_summary = inspect(Side::After, after, category);
        self.decide(category, before_summary, after_summary)
    }

    /// Judge a category from summaries that are already in hand
    ///
    /// An `Err` side carries a description of why that side has no summary.
    pub(crate) fn decide(
        &self,
        category: FormatCategory,
        before: Result<CategorySummary, String>,
        after: Result<CategorySummary, String>,
    ) -> VerificationResult {
        let result = match (before, after) {
            (Ok(before), Ok(after)) => self.compare(category, before, after),
            (before, after) => self.unreadable(category, before, after),
        };

        if !result.passed {
            warn!(
                category = %category,
                before = result.details.before_count,
                after = result.details.after_count,
                loss_rate = %result.details.loss_rate,
                "Verification failed"
            );
        } else if result.is_warning() {
            warn!(
                category = %category,
                loss_rate = %result.details.loss_rate,
                policy = %result.policy,
                "Verification passed with partial loss"
            );
        } else {
            info!(
                category = %category,
                count = result.details.after_count,
                "Verification passed"
            );
        }
        result
    }

    fn compare(
        &self,
        category: FormatCategory,
        before: CategorySummary,
        after: CategorySummary,
    ) -> VerificationResult {
        let details = VerificationDetails::from_counts(before.count, after.count);
        let finding = Finding::classify(before.count, after.count);
        let label = category.label();

        let message = match finding {
            Finding::Preserved if after.count == before.count => {
                format!("{} preserved ({} items)", label, after.count)
            }
            Finding::Preserved => format!(
                "{} preserved ({} items, {} before processing)",
                label, after.count, before.count
            ),
            Finding::NotApplicable => {
                format!("{} not present (verification not applicable)", label)
            }
            Finding::Added => format!("{} added during processing ({} items)", label, after.count),
            Finding::PartialLoss => format!(
                "{} partially preserved ({} loss, {} of {} items remain)",
                label, details.loss_rate, after.count, before.count
            ),
            Finding::TotalLoss => format!(
                "{} lost during processing (all {} items removed)",
                label, before.count
            ),
            Finding::Unreadable => format!("{} could not be inspected", label),
        };

        VerificationResult {
            category,
            passed: !self.config.policy.fails(finding),
            message,
            details,
            finding,
            policy: self.config.policy,
            evidence: Some(Evidence {
                before: Some(before),
                after: Some(after),
            }),
            error: None,
        }
    }

    fn unreadable(
        &self,
        category: FormatCategory,
        before: Result<CategorySummary, String>,
        after: Result<CategorySummary, String>,
    ) -> VerificationResult {
        let mut causes = Vec::new();
        let mut evidence = Evidence::default();
        match before {
            Ok(summary) => evidence.before = Some(summary),
            Err(cause) => causes.push(cause),
        }
        match after {
            Ok(summary) => evidence.after = Some(summary),
            Err(cause) => causes.push(cause),
        }
        let cause = causes.join("; ");

        VerificationResult {
            category,
            passed: false,
            message: format!("{} verification failed: {}", category.label(), cause),
            details: VerificationDetails::default(),
            finding: Finding::Unreadable,
            policy: self.config.policy,
            evidence: Some(evidence),
            error: Some(cause),
        }
    }
}

/// Summarize one category of an opened snapshot
pub fn summarize(
    snapshot: &DocxSnapshot,
    category: FormatCategory,
) -> Result<CategorySummary, InspectError> {
    let summary = match category {
        FormatCategory::TrackChanges => {
            CategorySummary::from_changes(&extract_tracked_changes(snapshot)?)
        }
        FormatCategory::Comments => CategorySummary::from_comments(&extract_comments(snapshot)?),
    };
    debug!(
        source = %snapshot.source().display(),
        category = %category,
        count = summary.count,
        "Counted category"
    );
    Ok(summary)
}

/// Number of items of `category` in the document at `path`
pub fn count(path: impl AsRef<Path>, category: FormatCategory) -> Result<usize, InspectError> {
    let snapshot = DocxSnapshot::open(path)?;
    Ok(summarize(&snapshot, category)?.count)
}

/// Whether the document at `path` contains any tracked change
pub fn has_tracked_changes(path: impl AsRef<Path>) -> Result<bool, InspectError> {
    Ok(count(path, FormatCategory::TrackChanges)? > 0)
}

/// Whether the document at `path` contains any comment
pub fn has_comments(path: impl AsRef<Path>) -> Result<bool, InspectError> {
    Ok(count(path, FormatCategory::Comments)? > 0)
}

/// Summary of the document under verification, or why there is none
pub(crate) fn inspect_current(
    snapshot: &Result<DocxSnapshot, InspectError>,
    category: FormatCategory,
) -> Result<CategorySummary, String> {
    inspect(Side::After, snapshot, category)
}

fn inspect(
    side: Side,
    snapshot: &Result<DocxSnapshot, InspectError>,
    category: FormatCategory,
) -> Result<CategorySummary, String> {
    let snapshot = snapshot
        .as_ref()
        .map_err(|e| describe_failure(side, e))?;
    summarize(snapshot, category).map_err(|e| describe_failure(side, &e))
}

fn describe_failure(side: Side, error: &InspectError) -> String {
    match error {
        InspectError::FileNotFound(path) => {
            format!("{} file not found: {}", side, path.display())
        }
        other => format!("{} file unreadable: {}", side, other),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::testing::docx;
    use proptest::prelude::*;
    use shared_types::PassPolicy;

    fn revisions(inserts: usize, deletes: usize) -> String {
        let ins = (0..inserts)
            .map(|i| format!(r#"<w:p><w:ins w:id="i{i}"><w:r><w:t>a{i}</w:t></w:r></w:ins></w:p>"#));
        let del = (0..deletes).map(|i| {
            format!(r#"<w:p><w:del w:id="d{i}"><w:r><w:delText>b{i}</w:delText></w:r></w:del></w:p>"#)
        });
        ins.chain(del).collect()
    }

    proptest! {
        /// Property: a document compared with itself never reports loss
        #[test]
        fn self_comparison_never_loses(inserts in 0usize..6, deletes in 0usize..6) {
            let bytes = docx(&revisions(inserts, deletes), None);
            let doc = DocxSnapshot::from_bytes(&bytes, "p.docx").unwrap();
            let result = Verifier::default().verify_snapshots(&doc, &doc, FormatCategory::TrackChanges);

            prop_assert!(result.passed);
            prop_assert!(result.details.loss_rate.is_zero());
            prop_assert_eq!(result.details.before_count, inserts + deletes);
            prop_assert_eq!(result.details.after_count, inserts + deletes);
        }

        /// Property: a result is catastrophic exactly when a nonzero count drops to zero
        #[test]
        fn catastrophic_iff_everything_lost(before in 0usize..5, after in 0usize..5, lenient: bool) {
            let policy = if lenient { PassPolicy::CriticalOnly } else { PassPolicy::PreserveAll };
            let verifier = Verifier::new(VerifyConfig::default().with_policy(policy));
            let b = DocxSnapshot::from_bytes(&docx(&revisions(before, 0), None), "b.docx").unwrap();
            let a = DocxSnapshot::from_bytes(&docx(&revisions(after, 0), None), "a.docx").unwrap();
            let result = verifier.verify_snapshots(&b, &a, FormatCategory::TrackChanges);

            prop_assert_eq!(result.is_catastrophic(), before > 0 && after == 0);
            if result.is_catastrophic() {
                prop_assert!(!result.passed);
            }
        }
    }
}
