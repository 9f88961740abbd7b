//! Plain-text rendering of results, pipelines and checkpoints
//!
//! Every function is a pure function of its input: the same results always
//! render to the same text.

use crate::checkpoint::{CategoryState, Checkpoint, PipelineResults};
use chrono::SecondsFormat;
use shared_types::{
    CategorySummary, Finding, OverallStatus, VerificationResult, VerificationSummary,
};

const RULE_WIDTH: usize = 60;
const ALERT_WIDTH: usize = 58;

fn status_marker(result: &VerificationResult) -> &'static str {
    if !result.passed {
        "✗ FAIL"
    } else if result.is_warning() {
        "⚠ WARN"
    } else {
        "✓ PASS"
    }
}

/// One line per result: status, category and message
pub fn format_result(result: &VerificationResult) -> String {
    format!(
        "{} [{}] {}",
        status_marker(result),
        result.category,
        result.message
    )
}

/// Summary header plus every result with its details
pub fn format_report(results: &[VerificationResult]) -> String {
    let summary = VerificationSummary::from_results(results);
    let mut output = String::new();

    output.push_str("Format Preservation Report\n");
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');
    output.push_str(&format!("Status: {}\n", status_text(summary.status)));
    output.push_str(&format!(
        "Summary: {}/{} checks passed\n",
        summary.passed, summary.total
    ));
    if summary.warnings > 0 {
        output.push_str(&format!("Warnings: {}\n", summary.warnings));
    }
    if summary.catastrophic > 0 {
        output.push_str(&format!("Catastrophic losses: {}\n", summary.catastrophic));
    }
    output.push('\n');

    if results.is_empty() {
        output.push_str("No checks were run.\n");
        return output;
    }

    output.push_str("Checks:\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    for result in results {
        output.push_str(&format_result(result));
        output.push('\n');
        push_details(&mut output, result);
    }

    output
}

fn status_text(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Pass => "PASS",
        OverallStatus::PassWithWarnings => "PASS WITH WARNINGS",
        OverallStatus::Fail => "FAIL",
    }
}

fn push_details(output: &mut String, result: &VerificationResult) {
    let details = &result.details;

    if result.finding != Finding::Unreadable {
        output.push_str(&format!(
            "    Before: {}  After: {}  Lost: {} ({})\n",
            details.before_count, details.after_count, details.loss_count, details.loss_rate
        ));
    }
    output.push_str(&format!("    Policy: {}\n", result.policy));

    match result.finding {
        Finding::TotalLoss => {
            output.push_str("    ‼ TOTAL LOSS: every item present before processing is gone\n")
        }
        Finding::PartialLoss => output.push_str(&format!(
            "    ⚠ Partial loss: {} of items removed\n",
            details.loss_rate
        )),
        _ => {}
    }

    if let Some(error) = &result.error {
        output.push_str(&format!("    Error: {}\n", error));
    }

    if !result.passed || result.finding.is_loss() {
        if let Some(evidence) = &result.evidence {
            push_evidence(output, "Before", evidence.before.as_ref());
            push_evidence(output, "After", evidence.after.as_ref());
        }
    }
}

fn push_evidence(output: &mut String, side: &str, summary: Option<&CategorySummary>) {
    let Some(summary) = summary else {
        output.push_str(&format!("    {} evidence: unavailable\n", side));
        return;
    };

    let mut line = format!("    {} evidence: {} items", side, summary.count);
    if summary.insertion_count + summary.deletion_count > 0 {
        line.push_str(&format!(
            " ({} insertions, {} deletions)",
            summary.insertion_count, summary.deletion_count
        ));
    }
    if !summary.authors.is_empty() {
        line.push_str(&format!("; authors: {}", summary.authors.join(", ")));
    }
    output.push_str(&line);
    output.push('\n');

    for sample in &summary.samples {
        output.push_str(&format!("      - {:?}\n", sample));
    }
}

/// Pipeline summary, one report per transition, then every failed check
/// labelled with the transition that produced it
pub fn format_checkpoint_report(pipeline: &PipelineResults) -> String {
    let all: Vec<VerificationResult> = pipeline.all_results().cloned().collect();
    let summary = VerificationSummary::from_results(&all);
    let mut output = String::new();

    output.push_str("Checkpoint Pipeline Report\n");
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');

    if pipeline.is_empty() {
        output.push_str("Fewer than two checkpoints, nothing to compare.\n");
        return output;
    }

    output.push_str(&format!("Transitions: {}\n", pipeline.len()));
    output.push_str(&format!(
        "Summary: {}/{} checks passed\n",
        summary.passed, summary.total
    ));

    let failing: Vec<&str> = pipeline
        .failed_transitions()
        .map(|t| t.label.as_str())
        .collect();
    if failing.is_empty() {
        output.push_str("All transitions preserved formatting\n");
    } else {
        output.push_str(&format!("Loss introduced at: {}\n", failing.join(", ")));
    }

    for transition in pipeline.iter() {
        output.push('\n');
        let marker = if transition.passed() { "✓" } else { "✗" };
        output.push_str(&format!("Transition {} {}\n", transition.label, marker));
        output.push_str(&format_report(&transition.results));
    }

    if !failing.is_empty() {
        output.push('\n');
        output.push_str("Failed checks:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for transition in pipeline.failed_transitions() {
            for result in transition.results.iter().filter(|r| !r.passed) {
                output.push_str(&format!(
                    "{}: {}\n",
                    transition.label,
                    format_result(result)
                ));
            }
        }
    }

    output
}

/// Stop-the-pipeline alert for a total loss
///
/// Returns `None` unless every item present before processing was lost.
pub fn format_catastrophic_loss_alert(result: &VerificationResult) -> Option<String> {
    if !result.is_catastrophic() {
        return None;
    }

    let details = &result.details;
    let title = format!(
        "CATASTROPHIC FORMAT LOSS: {}",
        result.category.label().to_uppercase()
    );
    let mut output = String::new();

    output.push_str(&format!("╔{}╗\n", "═".repeat(ALERT_WIDTH)));
    output.push_str(&format!("║  {:<width$}║\n", title, width = ALERT_WIDTH - 2));
    output.push_str(&format!("╚{}╝\n", "═".repeat(ALERT_WIDTH)));
    output.push('\n');
    output.push_str(&format!(
        "All {} {} items present before processing are gone (loss rate {}).\n",
        details.before_count,
        result.category.label(),
        details.loss_rate
    ));
    output.push_str(&format!(
        "Before: {}  After: {}\n",
        details.before_count, details.after_count
    ));
    output.push_str(&format!("Policy: {}\n", result.policy));
    output.push_str(&format!("Detail: {}\n", result.message));
    output.push('\n');
    output.push_str("A stage most likely rebuilt the document from extracted text\n");
    output.push_str("and discarded its markup.\n");
    output.push('\n');
    output.push_str("Required actions:\n");
    output.push_str("  1. Stop the pipeline before further stages run\n");
    output.push_str("  2. Inspect the stage that produced the processed document\n");
    output.push_str("  3. Verify intermediate files against the last passing checkpoint\n");
    output.push_str("  4. Restore from that checkpoint once the stage is fixed\n");

    Some(output)
}

/// Audit view of a single checkpoint
pub fn format_checkpoint(checkpoint: &Checkpoint) -> String {
    let mut output = String::new();

    output.push_str(&format!("Checkpoint: {}\n", checkpoint.name()));
    output.push_str(&format!("  Path:     {}\n", checkpoint.path().display()));
    output.push_str(&format!(
        "  Created:  {}\n",
        checkpoint
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    output.push_str(&format!("  SHA-256:  {}\n", checkpoint.document_hash()));
    for (category, state) in checkpoint.captured() {
        match state {
            CategoryState::Counted { summary } => {
                output.push_str(&format!("  {}: {} items\n", category, summary.count))
            }
            CategoryState::Unreadable { reason } => {
                output.push_str(&format!("  {}: unreadable ({})\n", category, reason))
            }
        }
    }

    output
}
