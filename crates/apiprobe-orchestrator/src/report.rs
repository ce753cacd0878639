//! Report and statistics renderers

use async_trait::async_trait;
use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use apiprobe_utils::atomic_write::write_file_atomic;
use apiprobe_utils::error::PipelineError;
use apiprobe_utils::timer::StageTimer;

use crate::collaborators::{ExecutionSummary, ReportRenderer, StatsRenderer};
use crate::command::CommandLine;
use crate::coverage::CoverageMeter;

/// Runs `[reports].report_command` over the results directory
///
/// `{results_dir}` and `{report_dir}` are substituted into the command.
/// Without a command rendering is skipped.
#[derive(Debug, Clone)]
pub struct CommandReportRenderer {
    command: Option<CommandLine>,
    results_dir: Utf8PathBuf,
    report_dir: Utf8PathBuf,
    timeout: Duration,
}

impl CommandReportRenderer {
    /// # Errors
    /// Returns `PipelineError::Report` when the command line cannot be parsed.
    pub fn new(
        command: Option<&str>,
        results_dir: impl Into<Utf8PathBuf>,
        report_dir: impl Into<Utf8PathBuf>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let command = command
            .map(CommandLine::parse)
            .transpose()
            .map_err(|reason| PipelineError::Report {
                renderer: "command".to_string(),
                reason,
            })?;
        Ok(Self {
            command,
            results_dir: results_dir.into(),
            report_dir: report_dir.into(),
            timeout,
        })
    }
}

#[async_trait]
impl ReportRenderer for CommandReportRenderer {
    fn name(&self) -> &str {
        "command"
    }

    async fn render(&self, _summary: Option<&ExecutionSummary>) -> Result<(), PipelineError> {
        let Some(command) = &self.command else {
            debug!("No report command configured");
            return Ok(());
        };
        let fail = |reason: String| PipelineError::Report {
            renderer: self.name().to_string(),
            reason,
        };

        std::fs::create_dir_all(&self.report_dir)
            .map_err(|e| fail(format!("cannot create {}: {e}", self.report_dir)))?;
        let command = command.substitute(&[
            ("results_dir", self.results_dir.as_str()),
            ("report_dir", self.report_dir.as_str()),
        ]);
        info!(command = %command, "Generating test report");

        let output = command.run_with_timeout(self.timeout).await.map_err(fail)?;
        if !output.success {
            return Err(fail(format!(
                "report command exited with {:?}: {}",
                output.code,
                output.stderr_tail()
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsDocument<'a> {
    label: &'a str,
    generated_at: String,
    coverage: &'a CoverageMeter,
    timings_ms: BTreeMap<String, Vec<u128>>,
}

/// Writes coverage and stage timings as JSON, plus the timing CSV
#[derive(Debug, Clone)]
pub struct CoverageStatsRenderer {
    label: String,
    coverage_dir: Utf8PathBuf,
    time_csv: Option<Utf8PathBuf>,
}

impl CoverageStatsRenderer {
    /// `label` tags every CSV row, usually the test class name
    #[must_use]
    pub fn new(label: impl Into<String>, coverage_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            label: label.into(),
            coverage_dir: coverage_dir.into(),
            time_csv: None,
        }
    }

    /// Also append stage timings to `path`
    #[must_use]
    pub fn with_time_csv(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.time_csv = Some(path.into());
        self
    }

    #[must_use]
    pub fn summary_path(&self) -> Utf8PathBuf {
        self.coverage_dir.join("coverage-summary.json")
    }
}

impl StatsRenderer for CoverageStatsRenderer {
    fn name(&self) -> &str {
        "coverage"
    }

    fn render(&self, coverage: &CoverageMeter, timer: &StageTimer) -> Result<(), PipelineError> {
        let fail = |reason: String| PipelineError::Report {
            renderer: self.name().to_string(),
            reason,
        };

        let timings_ms = timer
            .snapshot()
            .into_iter()
            .map(|(step, samples)| {
                (
                    step.to_string(),
                    samples.iter().map(Duration::as_millis).collect(),
                )
            })
            .collect();
        let doc = StatsDocument {
            label: &self.label,
            generated_at: chrono::Utc::now().to_rfc3339(),
            coverage,
            timings_ms,
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| fail(e.to_string()))?;
        let path = self.summary_path();
        write_file_atomic(&path, &json).map_err(|e| fail(format!("{e:#}")))?;
        info!(path = %path, operations = coverage.operations_covered(), "Wrote coverage summary");

        if let Some(csv) = &self.time_csv {
            let rows = timer
                .export_csv(csv, &self.label)
                .map_err(|e| fail(format!("{e:#}")))?;
            debug!(path = %csv, rows, "Exported stage timings");
        }
        Ok(())
    }
}
