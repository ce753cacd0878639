//! Result observer writing into the process-wide report sink

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::warn;

use apiprobe_utils::atomic_write::write_file_atomic;
use apiprobe_utils::report_sink::{self, file_stem};

use crate::collaborators::{CaseOutcome, ExecutionSummary, ResultObserver};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord<'a> {
    sequence: usize,
    recorded_at: String,
    #[serde(flatten)]
    outcome: &'a CaseOutcome,
}

/// Writes one JSON record per finished case
///
/// Records land in the directory published through
/// [`report_sink::set_results_dir`] at the time each case finishes, so the
/// orchestrator controls where results go. Write failures are logged only.
#[derive(Debug, Default)]
pub struct ResultsDirectoryObserver {
    sequence: usize,
    written: Vec<Utf8PathBuf>,
}

impl ResultsDirectoryObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }
}

impl ResultObserver for ResultsDirectoryObserver {
    fn on_case_finished(&mut self, outcome: &CaseOutcome) {
        let Some(dir) = report_sink::results_dir() else {
            warn!(case = %outcome.name, "No results directory set; dropping result");
            return;
        };
        self.sequence += 1;

        let path = dir.join(format!("{:05}-{}-result.json", self.sequence, file_stem(&outcome.name)));
        let record = ResultRecord {
            sequence: self.sequence,
            recorded_at: chrono::Utc::now().to_rfc3339(),
            outcome,
        };
        let written = serde_json::to_string_pretty(&record)
            .map_err(anyhow::Error::from)
            .and_then(|json| write_file_atomic(&path, &json));
        match written {
            Ok(_) => self.written.push(path),
            Err(e) => warn!(path = %path, error = %e, "Failed to write test result"),
        }
    }

    fn on_run_finished(&mut self, summary: &ExecutionSummary) {
        let Some(dir) = report_sink::results_dir() else {
            return;
        };
        let path = dir.join("summary.json");
        let written = serde_json::to_string_pretty(summary)
            .map_err(anyhow::Error::from)
            .and_then(|json| write_file_atomic(&path, &json));
        if let Err(e) = written {
            warn!(path = %path, error = %e, "Failed to write run summary");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CaseStatus;
    use serial_test::serial;
    use tempfile::TempDir;

    fn outcome(name: &str, status: CaseStatus) -> CaseOutcome {
        CaseOutcome {
            name: name.to_string(),
            status,
            duration_ms: 4,
            message: None,
        }
    }

    #[test]
    #[serial]
    fn test_writes_records_into_current_sink() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp.path().join("results")).unwrap();
        report_sink::set_results_dir(&dir);

        let mut observer = ResultsDirectoryObserver::new();
        observer.on_case_finished(&outcome("GET /items ok", CaseStatus::Passed));
        observer.on_case_finished(&outcome("getItem", CaseStatus::Failed));
        observer.on_run_finished(&ExecutionSummary {
            total: 2,
            failed: 1,
            ignored: 0,
            report_location: None,
        });
        report_sink::clear_results_dir();

        assert_eq!(
            observer.written(),
            [
                dir.join("00001-GET__items_ok-result.json"),
                dir.join("00002-getItem-result.json")
            ]
        );
        let first = std::fs::read_to_string(&observer.written()[1]).unwrap();
        assert!(first.contains("\"status\": \"failed\""));
        assert!(first.contains("\"sequence\": 2"));
        assert!(dir.join("summary.json").exists());
    }

    #[test]
    #[serial]
    fn test_without_sink_nothing_is_written() {
        report_sink::clear_results_dir();
        let mut observer = ResultsDirectoryObserver::new();
        observer.on_case_finished(&outcome("a", CaseStatus::Passed));
        assert!(observer.written().is_empty());
    }
}
