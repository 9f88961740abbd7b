//! JSON rendering of results and pipelines

use crate::checkpoint::{PipelineResults, Transition};
use anyhow::Result;
use serde::Serialize;
use shared_types::{VerificationResult, VerificationSummary};

#[derive(Serialize)]
struct ResultsDocument<'a> {
    summary: VerificationSummary,
    results: &'a [VerificationResult],
}

#[derive(Serialize)]
struct PipelineDocument<'a> {
    summary: VerificationSummary,
    transitions: &'a [Transition],
}

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Results with their aggregate summary
    pub fn format_results(results: &[VerificationResult], pretty: bool) -> Result<String> {
        let document = ResultsDocument {
            summary: VerificationSummary::from_results(results),
            results,
        };
        to_json(&document, pretty)
    }

    /// Transitions in pipeline order, summarized across all of them
    pub fn format_pipeline(pipeline: &PipelineResults, pretty: bool) -> Result<String> {
        let all: Vec<VerificationResult> = pipeline.all_results().cloned().collect();
        let document = PipelineDocument {
            summary: VerificationSummary::from_results(&all),
            transitions: &pipeline.transitions,
        };
        to_json(&document, pretty)
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}
