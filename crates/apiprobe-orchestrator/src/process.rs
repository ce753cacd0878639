//! Subprocess-backed build and harness stages
//!
//! Both collaborators run a configured command line. Placeholders
//! `{artifact}` and `{unit}` are substituted before spawning.

use async_trait::async_trait;
use camino::Utf8Path;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use apiprobe_utils::error::PipelineError;

use crate::collaborators::{
    BuiltUnit, CaseOutcome, ExecutionSummary, ResultObserver, TestHarness, UnitBuilder,
};
use crate::command::CommandLine;

fn placeholders<'a>(artifact: &'a str, unit: &'a str) -> [(&'static str, &'a str); 2] {
    [("artifact", artifact), ("unit", unit)]
}

/// Builds the artifact with `[execution].build_command`
///
/// Without a command the artifact is handed to the harness unchanged.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    command: Option<CommandLine>,
    timeout: Duration,
}

impl CommandBuilder {
    /// # Errors
    /// Returns `PipelineError::Build` when the command line cannot be parsed.
    pub fn new(command: Option<&str>, timeout: Duration) -> Result<Self, PipelineError> {
        let command = command
            .map(CommandLine::parse)
            .transpose()
            .map_err(|reason| PipelineError::Build {
                unit: "<configuration>".to_string(),
                reason,
            })?;
        Ok(Self { command, timeout })
    }
}

#[async_trait]
impl UnitBuilder for CommandBuilder {
    async fn build(&self, artifact: &Utf8Path, unit_name: &str) -> Result<BuiltUnit, PipelineError> {
        let unit = BuiltUnit {
            name: unit_name.to_string(),
            artifact: artifact.to_path_buf(),
        };
        let Some(command) = &self.command else {
            debug!(unit = %unit_name, "No build command configured; loading artifact as-is");
            return Ok(unit);
        };

        let command = command.substitute(&placeholders(artifact.as_str(), unit_name));
        info!(unit = %unit_name, command = %command, "Building test unit");

        let fail = |reason: String| PipelineError::Build {
            unit: unit_name.to_string(),
            reason,
        };
        let output = command.run_with_timeout(self.timeout).await.map_err(fail)?;
        if !output.success {
            return Err(fail(format!(
                "build command exited with {}: {}",
                output
                    .code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                output.stderr_tail()
            )));
        }
        Ok(unit)
    }
}

/// JSON document a harness prints on stdout
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HarnessReport {
    #[serde(flatten)]
    summary: ExecutionSummary,
    #[serde(default)]
    cases: Vec<CaseOutcome>,
}

/// Runs `[execution].harness_command` and reads its JSON summary
///
/// The summary is `{"total", "failed", "ignored", "reportLocation", "cases"}`.
/// A non-zero exit status with a valid summary is a run with failing tests,
/// not a harness failure.
#[derive(Debug, Clone)]
pub struct CommandHarness {
    command: Option<CommandLine>,
}

impl CommandHarness {
    /// # Errors
    /// Returns `PipelineError::Execution` when the command line cannot be parsed.
    pub fn new(command: Option<&str>) -> Result<Self, PipelineError> {
        let command = command
            .map(CommandLine::parse)
            .transpose()
            .map_err(|reason| PipelineError::Execution {
                unit: "<configuration>".to_string(),
                reason,
            })?;
        Ok(Self { command })
    }

    fn parse_report(unit: &str, stdout: &str) -> Result<HarnessReport, PipelineError> {
        // Harnesses may log before and after the summary; take the last
        // object that reads as one, ignoring whatever trails it.
        let mut last_error = None;
        for (start, _) in stdout.rmatch_indices('{') {
            let mut values =
                serde_json::Deserializer::from_str(&stdout[start..]).into_iter::<HarnessReport>();
            match values.next() {
                Some(Ok(report)) => return Ok(report),
                Some(Err(e)) => {
                    last_error.get_or_insert(e);
                }
                None => {}
            }
        }
        Err(PipelineError::Execution {
            unit: unit.to_string(),
            reason: match last_error {
                Some(e) => format!("harness did not print a JSON summary: {e}"),
                None => "harness did not print a JSON summary".to_string(),
            },
        })
    }
}

#[async_trait]
impl TestHarness for CommandHarness {
    async fn execute(
        &self,
        unit: &BuiltUnit,
        observer: &mut dyn ResultObserver,
    ) -> Result<ExecutionSummary, PipelineError> {
        let fail = |reason: String| PipelineError::Execution {
            unit: unit.name.clone(),
            reason,
        };
        let Some(command) = &self.command else {
            return Err(fail("no harness command configured".to_string()));
        };

        let command = command.substitute(&placeholders(unit.artifact.as_str(), &unit.name));
        info!(unit = %unit.name, command = %command, "Running test harness");
        let output = command.run().await.map_err(fail)?;

        let report = match Self::parse_report(&unit.name, &output.stdout) {
            Ok(report) => report,
            Err(e) if !output.success => {
                debug!(error = %e, "No summary from failing harness");
                return Err(fail(format!(
                    "harness exited with {:?}: {}",
                    output.code,
                    output.stderr_tail()
                )));
            }
            Err(e) => return Err(e),
        };
        if !output.success {
            warn!(unit = %unit.name, code = ?output.code, "Harness exited non-zero");
        }

        for outcome in &report.cases {
            observer.on_case_finished(outcome);
        }
        observer.on_run_finished(&report.summary);
        Ok(report.summary)
    }
}
