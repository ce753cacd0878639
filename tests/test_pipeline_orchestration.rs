//! Library-level pipeline runs with the shipped collaborators

use async_trait::async_trait;
use camino::Utf8PathBuf;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

use apiprobe::{Config, PipelineOrchestrator, PipelineSettings, TestCase};
use apiprobe_orchestrator::{
    BuiltUnit, CaseOutcome, CaseStatus, Collaborators, CommandBuilder, CommandHarness,
    CommandReportRenderer, CoverageStatsRenderer, ExecutionSummary, JsonSuiteWriter,
    PipelineState, ResultObserver, ResultsDirectoryObserver, SuiteFileGenerator, TestHarness,
    TestSuiteFile,
};
use apiprobe_utils::error::PipelineError;

/// Marks every faulty case as failed
struct VerdictHarness;

#[async_trait]
impl TestHarness for VerdictHarness {
    async fn execute(
        &self,
        unit: &BuiltUnit,
        observer: &mut dyn ResultObserver,
    ) -> Result<ExecutionSummary, PipelineError> {
        let suite = SuiteFileGenerator::load(&unit.artifact).map_err(|e| PipelineError::Execution {
            unit: unit.name.clone(),
            reason: e.to_string(),
        })?;
        let mut summary = ExecutionSummary {
            total: suite.len(),
            ..ExecutionSummary::default()
        };
        for case in &suite {
            let status = if case.faulty {
                summary.failed += 1;
                CaseStatus::Failed
            } else {
                CaseStatus::Passed
            };
            observer.on_case_finished(&CaseOutcome {
                name: case.id.clone(),
                status,
                duration_ms: 1,
                message: None,
            });
        }
        observer.on_run_finished(&summary);
        Ok(summary)
    }
}

fn root(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
}

fn write_suite(path: &Utf8PathBuf) {
    let doc = TestSuiteFile {
        class_name: None,
        generated_at: None,
        test_cases: vec![
            TestCase::new("t1", "listItems", "get", "/items").with_query("status", "open"),
            TestCase::new("t2", "getItem", "get", "/items/{id}")
                .with_path_param("id", "-1")
                .faulty("negative id"),
            TestCase::new("t3", "getItem", "get", "/items/{id}").with_path_param("id", "7"),
        ],
    };
    fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
}

fn config(root: &Utf8PathBuf) -> Config {
    Config::builder()
        .target_dir(root.join("generated"))
        .test_class_name("ItemsTest")
        .package_name("probe")
        .csv_stats(true)
        .input_coverage(true)
        .test_data_dir(root.join("test-data"))
        .coverage_data_dir(root.join("coverage"))
        .results_dir(root.join("results"))
        .report_dir(root.join("reports"))
        .build()
        .unwrap()
}

fn collaborators(
    suite: &Utf8PathBuf,
    config: &Config,
    harness: Box<dyn TestHarness>,
) -> Collaborators {
    Collaborators {
        generator: Box::new(SuiteFileGenerator::new(suite)),
        writer: Box::new(JsonSuiteWriter::new()),
        builder: Box::new(CommandBuilder::new(None, config.harness_timeout()).unwrap()),
        harness,
        observer: Box::new(ResultsDirectoryObserver::new()),
        report_renderer: Box::new(
            CommandReportRenderer::new(
                None,
                config.results_dir(),
                config.report_dir(),
                config.harness_timeout(),
            )
            .unwrap(),
        ),
        stats_renderer: Box::new(
            CoverageStatsRenderer::new(config.test_class_name(), config.coverage_data_dir())
                .with_time_csv(config.time_csv_path()),
        ),
    }
}

#[tokio::test]
#[serial]
async fn test_suite_runs_through_every_stage() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp);
    let suite = root.join("suite.json");
    write_suite(&suite);
    let config = config(&root);

    let mut orchestrator = PipelineOrchestrator::new(
        PipelineSettings::from_config(&config),
        collaborators(&suite, &config, Box::new(VerdictHarness)),
    );
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(orchestrator.state(), PipelineState::Done);
    assert_eq!(outcome.unit, "probe.ItemsTest");
    assert_eq!(outcome.artifact, root.join("generated/ItemsTest.json"));
    let summary = outcome.summary.unwrap();
    assert_eq!((summary.total, summary.failed, summary.successful()), (3, 1, 2));
    assert!(outcome.report_errors.is_empty());

    let results = config.results_dir();
    assert!(results.join("00001-t1-result.json").exists());
    assert!(results.join("summary.json").exists());

    let nominal_faulty = fs::read_to_string(config.nominal_faulty_csv_path()).unwrap();
    assert!(nominal_faulty.ends_with("ItemsTest,2,1\n"));
    assert_eq!(orchestrator.coverage().operations_covered(), 2);
    assert!(config.coverage_data_dir().join("coverage-summary.json").exists());
}

#[tokio::test]
#[serial]
async fn test_counts_accumulate_across_runs_and_retargeting() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp);
    let suite = root.join("suite.json");
    write_suite(&suite);
    let config = config(&root);

    let mut orchestrator = PipelineOrchestrator::new(
        PipelineSettings::from_config(&config),
        collaborators(&suite, &config, Box::new(VerdictHarness)),
    );
    orchestrator.run().await.unwrap();
    orchestrator.set_test_class_name("ItemsRerunTest");
    orchestrator.set_target_dir(root.join("rerun"));
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(orchestrator.num_test_cases(), 6);
    assert_eq!(outcome.artifact, root.join("rerun/ItemsRerunTest.json"));

    let csv = fs::read_to_string(config.testcases_csv_path()).unwrap();
    assert_eq!(csv.lines().count(), 1 + 6);
}

#[tokio::test]
#[serial]
async fn test_missing_suite_fails_the_run() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp);
    let config = config(&root);

    let mut orchestrator = PipelineOrchestrator::new(
        PipelineSettings::from_config(&config),
        collaborators(&root.join("absent.json"), &config, Box::new(VerdictHarness)),
    );
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Generation { .. }));
    assert_eq!(orchestrator.state(), PipelineState::Failed);
    assert!(!root.join("generated").exists());
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn test_crashing_harness_still_reports() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp);
    let suite = root.join("suite.json");
    write_suite(&suite);
    let config = config(&root);
    let harness = CommandHarness::new(Some("sh -c 'echo boom >&2; exit 3'")).unwrap();

    let mut orchestrator = PipelineOrchestrator::new(
        PipelineSettings::from_config(&config),
        collaborators(&suite, &config, Box::new(harness)),
    );
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(orchestrator.state(), PipelineState::Done);
    assert!(outcome.summary.is_none());
    let err = outcome.execution_error.unwrap();
    assert!(err.to_string().contains("boom"));
    assert!(config.coverage_data_dir().join("coverage-summary.json").exists());
}

#[tokio::test]
#[serial]
async fn test_supplied_cases_skip_generation() {
    let temp = TempDir::new().unwrap();
    let root = root(&temp);
    let config = config(&root);

    let mut orchestrator = PipelineOrchestrator::new(
        PipelineSettings::from_config(&config),
        collaborators(&root.join("absent.json"), &config, Box::new(VerdictHarness)),
    );
    let cases = vec![TestCase::new("only", "listItems", "get", "/items")];
    let outcome = orchestrator.run_with(cases).await.unwrap();

    assert_eq!(outcome.test_cases, 1);
    assert_eq!(orchestrator.num_test_cases(), 0);
    assert!(!config.nominal_faulty_csv_path().exists());
}
