//! Stage collaborators driven by the pipeline
//!
//! Each stage of a run is delegated to one of these traits. The orchestrator
//! owns sequencing, timing and failure policy; the collaborators own the work.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use apiprobe_utils::error::PipelineError;
use apiprobe_utils::timer::StageTimer;

use crate::coverage::CoverageMeter;
use crate::test_case::TestCase;

/// Produces the concrete test cases of one run
pub trait TestCaseGenerator: Send {
    /// Zero the nominal/faulty counters of the current run
    fn reset_current_counts(&mut self);

    /// # Errors
    /// Returns `PipelineError::Generation` when no suite can be produced.
    fn generate(&mut self) -> Result<Vec<TestCase>, PipelineError>;

    /// Nominal cases produced since the last reset
    fn nominal_count(&self) -> usize;

    /// Faulty cases produced since the last reset
    fn faulty_count(&self) -> usize;
}

/// Serializes test cases into an executable artifact
pub trait TestWriter: Send + Sync {
    /// Write `cases` for the artifact rooted at `destination`
    ///
    /// Returns the path actually written, which may add an extension.
    ///
    /// # Errors
    /// Returns `PipelineError::Write` on any failure.
    fn write(&self, cases: &[TestCase], destination: &Utf8Path)
    -> Result<Utf8PathBuf, PipelineError>;
}

/// A compiled or loaded unit ready for the harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltUnit {
    /// Fully-qualified unit name, `{package}.{class}`
    pub name: String,
    pub artifact: Utf8PathBuf,
}

/// Compiles and loads a written artifact
#[async_trait]
pub trait UnitBuilder: Send + Sync {
    /// # Errors
    /// Returns `PipelineError::Build` when the artifact cannot be loaded.
    async fn build(&self, artifact: &Utf8Path, unit_name: &str)
    -> Result<BuiltUnit, PipelineError>;
}

/// Outcome of a single executed test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Ignored,
}

/// Per-case record reported by the harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOutcome {
    pub name: String,
    pub status: CaseStatus,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate counts returned by the harness
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub total: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub ignored: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_location: Option<String>,
}

impl ExecutionSummary {
    /// `total - failed - ignored`, never below zero
    #[must_use]
    pub fn successful(&self) -> usize {
        self.total
            .saturating_sub(self.failed)
            .saturating_sub(self.ignored)
    }
}

/// Receives results while the harness runs
pub trait ResultObserver: Send {
    fn on_case_finished(&mut self, outcome: &CaseOutcome);

    /// Called once after the last case
    fn on_run_finished(&mut self, _summary: &ExecutionSummary) {}
}

/// Runs a built unit
#[async_trait]
pub trait TestHarness: Send + Sync {
    /// Failing test cases are reported in the summary, not as errors.
    ///
    /// # Errors
    /// Returns `PipelineError::Execution` when the harness itself fails.
    async fn execute(
        &self,
        unit: &BuiltUnit,
        observer: &mut dyn ResultObserver,
    ) -> Result<ExecutionSummary, PipelineError>;
}

/// Renders the human-facing test report
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    /// Returns `PipelineError::Report`; the pipeline logs it and carries on.
    async fn render(&self, summary: Option<&ExecutionSummary>) -> Result<(), PipelineError>;
}

/// Renders coverage and timing statistics
pub trait StatsRenderer: Send + Sync {
    fn name(&self) -> &str;

    /// # Errors
    /// Returns `PipelineError::Report`; the pipeline logs it and carries on.
    fn render(&self, coverage: &CoverageMeter, timer: &StageTimer) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_saturates() {
        let summary = ExecutionSummary {
            total: 3,
            failed: 2,
            ignored: 4,
            report_location: None,
        };
        assert_eq!(summary.successful(), 0);

        let summary = ExecutionSummary {
            total: 10,
            failed: 2,
            ignored: 1,
            report_location: None,
        };
        assert_eq!(summary.successful(), 7);
    }

    #[test]
    fn test_case_status_wire_format() {
        let outcome: CaseOutcome =
            serde_json::from_str(r#"{"name":"getItem_1","status":"ignored"}"#).unwrap();
        assert_eq!(outcome.status, CaseStatus::Ignored);
        assert_eq!(outcome.duration_ms, 0);
        assert_eq!(CaseStatus::Failed.to_string(), "failed");
    }
}
