//! Verification reporting
//!
//! Renders results, checkpoint pipelines and loss alerts as deterministic
//! text, or as JSON for machine consumption.
//!
//! # Example
//!
//! ```no_run
//! use format_verifier::report::{OutputFormat, Reporter};
//! use format_verifier::verify_round_trip;
//!
//! # fn example() -> anyhow::Result<()> {
//! let results = verify_round_trip("draft.docx", "final.docx");
//! Reporter::new(OutputFormat::Text).report(&results)?;
//!
//! Reporter::new(OutputFormat::JsonPretty).write_to_file(&results, "verification.json")?;
//! # Ok(())
//! # }
//! ```

mod json;
mod text;

use crate::checkpoint::PipelineResults;
use anyhow::{Context, Result};
use shared_types::VerificationResult;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub use json::JsonReporter;
pub use text::{
    format_catastrophic_loss_alert, format_checkpoint, format_checkpoint_report, format_report,
    format_result,
};

/// Output format for verification results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// Reporter for verification results
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report results to stdout
    ///
    /// Text output appends the catastrophic-loss alert for every total loss.
    pub fn report(&self, results: &[VerificationResult]) -> Result<()> {
        let output = self.format_results(results)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Write results to a file
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        results: &[VerificationResult],
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        let output = self.format_results(results)?;
        fs::write(path, output)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Write a checkpoint pipeline report to a file
    pub fn write_pipeline_to_file<P: AsRef<Path>>(
        &self,
        pipeline: &PipelineResults,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        let output = self.format_pipeline(pipeline)?;
        fs::write(path, output)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Format results as a string
    pub fn format_results(&self, results: &[VerificationResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format_results(results, false),
            OutputFormat::JsonPretty => JsonReporter::format_results(results, true),
            OutputFormat::Text => {
                let mut output = format_report(results);
                for alert in results.iter().filter_map(format_catastrophic_loss_alert) {
                    output.push('\n');
                    output.push_str(&alert);
                }
                Ok(output)
            }
        }
    }

    /// Format a checkpoint pipeline as a string
    pub fn format_pipeline(&self, pipeline: &PipelineResults) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format_pipeline(pipeline, false),
            OutputFormat::JsonPretty => JsonReporter::format_pipeline(pipeline, true),
            OutputFormat::Text => Ok(format_checkpoint_report(pipeline)),
        }
    }
}
