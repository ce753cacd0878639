//! The generate → write → build → execute → report pipeline

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, warn};

use apiprobe_config::Config;
use apiprobe_utils::error::PipelineError;
use apiprobe_utils::logging::{log_stage_complete, log_stage_error, log_stage_start, stage_span};
use apiprobe_utils::report_sink;
use apiprobe_utils::timer::StageTimer;
use apiprobe_utils::types::TestStep;

use crate::collaborators::{
    BuiltUnit, ExecutionSummary, ReportRenderer, ResultObserver, StatsRenderer, TestCaseGenerator,
    TestHarness, TestWriter, UnitBuilder,
};
use crate::coverage::CoverageMeter;
use crate::state::PipelineState;
use crate::stats;
use crate::test_case::TestCase;

/// Values the pipeline reads from configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub target_dir: Utf8PathBuf,
    pub test_class_name: String,
    pub package_name: String,
    pub csv_stats: bool,
    pub input_coverage: bool,
    pub output_coverage: bool,
    pub testcases_csv: Utf8PathBuf,
    pub nominal_faulty_csv: Utf8PathBuf,
    /// Published through the report sink before execution
    pub results_dir: Utf8PathBuf,
    pub harness_timeout: Duration,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_dir: config.target_dir(),
            test_class_name: config.test_class_name().to_string(),
            package_name: config.package_name().to_string(),
            csv_stats: config.csv_stats_enabled(),
            input_coverage: config.input_coverage_enabled(),
            output_coverage: config.output_coverage_enabled(),
            testcases_csv: config.testcases_csv_path(),
            nominal_faulty_csv: config.nominal_faulty_csv_path(),
            results_dir: config.results_dir(),
            harness_timeout: config.harness_timeout(),
        }
    }

    fn coverage_enabled(&self) -> bool {
        self.input_coverage || self.output_coverage
    }
}

/// The stage implementations of one orchestrator
pub struct Collaborators {
    pub generator: Box<dyn TestCaseGenerator>,
    pub writer: Box<dyn TestWriter>,
    pub builder: Box<dyn UnitBuilder>,
    pub harness: Box<dyn TestHarness>,
    pub observer: Box<dyn ResultObserver>,
    pub report_renderer: Box<dyn ReportRenderer>,
    pub stats_renderer: Box<dyn StatsRenderer>,
}

/// What a completed run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Test cases handled by this run
    pub test_cases: usize,
    pub artifact: Utf8PathBuf,
    pub unit: String,
    /// `None` when the harness failed or timed out
    pub summary: Option<ExecutionSummary>,
    pub execution_error: Option<PipelineError>,
    pub report_errors: Vec<PipelineError>,
}

/// Drives one test suite through every stage
///
/// Counters and the coverage accumulator survive across runs of the same
/// instance. A fatal stage error ends that call only; the next `run` starts
/// again from the beginning.
pub struct PipelineOrchestrator {
    settings: PipelineSettings,
    collaborators: Collaborators,
    coverage: CoverageMeter,
    timer: Arc<StageTimer>,
    num_test_cases: usize,
    state: PipelineState,
}

impl PipelineOrchestrator {
    /// Uses the process-wide [`StageTimer`]
    #[must_use]
    pub fn new(settings: PipelineSettings, collaborators: Collaborators) -> Self {
        Self {
            settings,
            collaborators,
            coverage: CoverageMeter::new(),
            timer: StageTimer::global(),
            num_test_cases: 0,
            state: PipelineState::Idle,
        }
    }

    #[must_use]
    pub fn with_timer(mut self, timer: Arc<StageTimer>) -> Self {
        self.timer = timer;
        self
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    #[must_use]
    pub fn target_dir(&self) -> &Utf8Path {
        &self.settings.target_dir
    }

    pub fn set_target_dir(&mut self, target_dir: impl Into<Utf8PathBuf>) {
        self.settings.target_dir = target_dir.into();
    }

    #[must_use]
    pub fn test_class_name(&self) -> &str {
        &self.settings.test_class_name
    }

    pub fn set_test_class_name(&mut self, name: impl Into<String>) {
        self.settings.test_class_name = name.into();
    }

    /// Test cases generated by `run` since construction or the last reset
    #[must_use]
    pub fn num_test_cases(&self) -> usize {
        self.num_test_cases
    }

    pub fn reset_num_test_cases(&mut self) {
        self.num_test_cases = 0;
    }

    #[must_use]
    pub fn coverage(&self) -> &CoverageMeter {
        &self.coverage
    }

    #[must_use]
    pub fn timer(&self) -> &StageTimer {
        &self.timer
    }

    /// `{package}.{class}`
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!(
            "{}.{}",
            self.settings.package_name, self.settings.test_class_name
        )
    }

    /// `{targetDir}/{testClassName}`
    #[must_use]
    pub fn artifact_path(&self) -> Utf8PathBuf {
        self.settings.target_dir.join(&self.settings.test_class_name)
    }

    /// Generate a suite and take it through every stage
    ///
    /// # Errors
    /// Returns the fatal generation, write or build error; the state is then
    /// `Failed`. Harness and report problems are returned in the outcome.
    pub async fn run(&mut self) -> Result<PipelineOutcome, PipelineError> {
        let unit = self.unit_name();
        let span = stage_span(&unit, "run");
        async {
            self.transition(PipelineState::Generating);
            let cases = match self.generate(&unit) {
                Ok(cases) => cases,
                Err(e) => return Err(self.fail(e)),
            };
            self.record_suite(&cases);
            self.drive(cases, true).await
        }
        .instrument(span)
        .await
    }

    /// Take externally supplied test cases through every stage but generation
    ///
    /// The cumulative test-case count is left unchanged.
    ///
    /// # Errors
    /// See [`PipelineOrchestrator::run`].
    pub async fn run_with(&mut self, cases: Vec<TestCase>) -> Result<PipelineOutcome, PipelineError> {
        let unit = self.unit_name();
        let span = stage_span(&unit, "run");
        async {
            self.record_suite(&cases);
            self.drive(cases, false).await
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &mut self,
        cases: Vec<TestCase>,
        generated: bool,
    ) -> Result<PipelineOutcome, PipelineError> {
        let unit = self.unit_name();

        self.transition(PipelineState::Writing);
        let artifact = match self.write(&unit, &cases) {
            Ok(path) => path,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(PipelineState::Building);
        let built = match self.build(&unit, &artifact).await {
            Ok(built) => built,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(PipelineState::Executing);
        let (summary, execution_error) = match self.execute(&built).await {
            Ok(summary) => (Some(summary), None),
            Err(e) => (None, Some(e)),
        };
        if generated {
            self.export_nominal_faulty();
        }

        self.transition(PipelineState::Reporting);
        let report_errors = self.report(summary.as_ref()).await;

        self.transition(PipelineState::Done);
        Ok(PipelineOutcome {
            test_cases: cases.len(),
            artifact,
            unit,
            summary,
            execution_error,
            report_errors,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid pipeline transition {} -> {next}",
            self.state
        );
        debug!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        let stage = self.state;
        self.transition(PipelineState::Failed);
        warn!(stage = %stage, error = %error, "Pipeline run aborted");
        error
    }

    fn generate(&mut self, unit: &str) -> Result<Vec<TestCase>, PipelineError> {
        log_stage_start(unit, "generating");
        let generator = &mut self.collaborators.generator;
        generator.reset_current_counts();

        self.timer.start_counting(TestStep::TestSuiteGeneration);
        let result = generator.generate();
        let elapsed = self
            .timer
            .stop_counting(TestStep::TestSuiteGeneration)
            .unwrap_or_default();

        match result {
            Ok(cases) => {
                self.num_test_cases += cases.len();
                log_stage_complete(unit, "generating", elapsed.as_millis());
                info!(
                    generated = cases.len(),
                    total = self.num_test_cases,
                    "Generated test cases"
                );
                Ok(cases)
            }
            Err(e) => {
                log_stage_error(unit, "generating", &e.to_string(), elapsed.as_millis());
                Err(e)
            }
        }
    }

    /// Statistics side effects of a new suite; never fatal
    fn record_suite(&mut self, cases: &[TestCase]) {
        if self.settings.csv_stats {
            match stats::append_test_cases(&self.settings.testcases_csv, cases) {
                Ok(rows) => debug!(path = %self.settings.testcases_csv, rows, "Exported test cases"),
                Err(e) => warn!(error = %e, "Failed to export test cases to CSV"),
            }
        }
        if self.settings.coverage_enabled() {
            self.coverage.add_test_suite(cases);
        }
    }

    fn write(&self, unit: &str, cases: &[TestCase]) -> Result<Utf8PathBuf, PipelineError> {
        let destination = self.artifact_path();
        log_stage_start(unit, "writing");
        info!(cases = cases.len(), destination = %destination, "Writing test cases");

        self.timer.start_counting(TestStep::TestSuiteWriting);
        let result = self.collaborators.writer.write(cases, &destination);
        let elapsed = self
            .timer
            .stop_counting(TestStep::TestSuiteWriting)
            .unwrap_or_default();

        match &result {
            Ok(_) => log_stage_complete(unit, "writing", elapsed.as_millis()),
            Err(e) => log_stage_error(unit, "writing", &e.to_string(), elapsed.as_millis()),
        }
        result
    }

    async fn build(&self, unit: &str, artifact: &Utf8Path) -> Result<BuiltUnit, PipelineError> {
        log_stage_start(unit, "building");
        self.timer.start_counting(TestStep::TestSuiteBuilding);
        let result = self.collaborators.builder.build(artifact, unit).await;
        let elapsed = self
            .timer
            .stop_counting(TestStep::TestSuiteBuilding)
            .unwrap_or_default();

        match &result {
            Ok(_) => log_stage_complete(unit, "building", elapsed.as_millis()),
            Err(e) => log_stage_error(unit, "building", &e.to_string(), elapsed.as_millis()),
        }
        result
    }

    /// Run the harness under the configured timeout
    ///
    /// Errors are logged here and handed back for the outcome; they never
    /// fail the run.
    async fn execute(&mut self, built: &BuiltUnit) -> Result<ExecutionSummary, PipelineError> {
        let unit = built.name.as_str();
        let limit = self.settings.harness_timeout;
        report_sink::set_results_dir(&self.settings.results_dir);
        log_stage_start(unit, "executing");

        self.timer.start_counting(TestStep::TestSuiteExecution);
        let result = tokio::time::timeout(
            limit,
            self.collaborators
                .harness
                .execute(built, self.collaborators.observer.as_mut()),
        )
        .await;
        let elapsed = self
            .timer
            .stop_counting(TestStep::TestSuiteExecution)
            .unwrap_or_default();

        let result = result.unwrap_or_else(|_| {
            Err(PipelineError::ExecutionTimeout {
                unit: unit.to_string(),
                timeout_seconds: limit.as_secs(),
            })
        });
        match &result {
            Ok(summary) => {
                log_stage_complete(unit, "executing", elapsed.as_millis());
                info!(
                    run = summary.total,
                    successful = summary.successful(),
                    failures = summary.failed,
                    ignored = summary.ignored,
                    seconds = elapsed.as_secs(),
                    "Test execution finished"
                );
            }
            Err(e) => log_stage_error(unit, "executing", &e.to_string(), elapsed.as_millis()),
        }
        result
    }

    fn export_nominal_faulty(&self) {
        let generator = &self.collaborators.generator;
        let (nominal, faulty) = (generator.nominal_count(), generator.faulty_count());
        info!(nominal, faulty, "Generated nominal and faulty test cases");
        if !self.settings.csv_stats {
            return;
        }
        if let Err(e) = stats::append_nominal_faulty(
            &self.settings.nominal_faulty_csv,
            &self.settings.test_class_name,
            nominal,
            faulty,
        ) {
            warn!(error = %e, "Failed to export nominal/faulty counts");
        }
    }

    /// Both renderers always run; their errors are collected, not raised
    async fn report(&self, summary: Option<&ExecutionSummary>) -> Vec<PipelineError> {
        let mut errors = Vec::new();

        let renderer = &self.collaborators.report_renderer;
        info!(renderer = renderer.name(), "Generating test report");
        if let Err(e) = renderer.render(summary).await {
            warn!(error = %e, "Test report generation failed");
            errors.push(e);
        }

        let renderer = &self.collaborators.stats_renderer;
        info!(renderer = renderer.name(), "Generating coverage report");
        if let Err(e) = renderer.render(&self.coverage, &self.timer) {
            warn!(error = %e, "Coverage report generation failed");
            errors.push(e);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CaseOutcome, CaseStatus};
    use async_trait::async_trait;
    use serial_test::serial;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    type Events = Arc<Mutex<Vec<String>>>;

    fn push(events: &Events, event: impl Into<String>) {
        events.lock().unwrap().push(event.into());
    }

    struct FixedGenerator {
        events: Events,
        cases: Vec<TestCase>,
        fail: bool,
        nominal: usize,
        faulty: usize,
    }

    impl TestCaseGenerator for FixedGenerator {
        fn reset_current_counts(&mut self) {
            self.nominal = 0;
            self.faulty = 0;
        }

        fn generate(&mut self) -> Result<Vec<TestCase>, PipelineError> {
            push(&self.events, "generate");
            if self.fail {
                return Err(PipelineError::Generation {
                    reason: "no operations selected".to_string(),
                });
            }
            self.faulty += self.cases.iter().filter(|c| c.faulty).count();
            self.nominal += self.cases.iter().filter(|c| !c.faulty).count();
            Ok(self.cases.clone())
        }

        fn nominal_count(&self) -> usize {
            self.nominal
        }

        fn faulty_count(&self) -> usize {
            self.faulty
        }
    }

    struct RecordingWriter {
        events: Events,
        fail: bool,
    }

    impl TestWriter for RecordingWriter {
        fn write(
            &self,
            cases: &[TestCase],
            destination: &Utf8Path,
        ) -> Result<Utf8PathBuf, PipelineError> {
            push(&self.events, format!("write {destination} {}", cases.len()));
            if self.fail {
                return Err(PipelineError::Write {
                    path: destination.to_string(),
                    reason: "disk full".to_string(),
                });
            }
            Ok(destination.to_path_buf())
        }
    }

    /// Fails the first `failures` builds
    struct FlakyBuilder {
        events: Events,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl UnitBuilder for FlakyBuilder {
        async fn build(
            &self,
            artifact: &Utf8Path,
            unit_name: &str,
        ) -> Result<BuiltUnit, PipelineError> {
            push(&self.events, format!("build {unit_name}"));
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(PipelineError::Build {
                    unit: unit_name.to_string(),
                    reason: "syntax error".to_string(),
                });
            }
            Ok(BuiltUnit {
                name: unit_name.to_string(),
                artifact: artifact.to_path_buf(),
            })
        }
    }

    #[derive(Clone, Copy)]
    enum HarnessMode {
        Pass,
        Crash,
        Hang,
    }

    struct ScriptedHarness {
        events: Events,
        mode: HarnessMode,
    }

    #[async_trait]
    impl TestHarness for ScriptedHarness {
        async fn execute(
            &self,
            unit: &BuiltUnit,
            observer: &mut dyn ResultObserver,
        ) -> Result<ExecutionSummary, PipelineError> {
            let sink = report_sink::results_dir().map(|d| d.to_string()).unwrap_or_default();
            push(&self.events, format!("execute {} {sink}", unit.name));
            match self.mode {
                HarnessMode::Pass => {
                    observer.on_case_finished(&CaseOutcome {
                        name: "case-1".to_string(),
                        status: CaseStatus::Failed,
                        duration_ms: 3,
                        message: Some("expected 200, got 500".to_string()),
                    });
                    Ok(ExecutionSummary {
                        total: 2,
                        failed: 1,
                        ignored: 0,
                        report_location: None,
                    })
                }
                HarnessMode::Crash => Err(PipelineError::Execution {
                    unit: unit.name.clone(),
                    reason: "runner crashed".to_string(),
                }),
                HarnessMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    unreachable!("harness timeout should have fired")
                }
            }
        }
    }

    struct CountingObserver {
        events: Events,
    }

    impl ResultObserver for CountingObserver {
        fn on_case_finished(&mut self, outcome: &CaseOutcome) {
            push(&self.events, format!("observed {}", outcome.name));
        }
    }

    struct MockReport {
        events: Events,
        fail: bool,
    }

    #[async_trait]
    impl ReportRenderer for MockReport {
        fn name(&self) -> &str {
            "mock-report"
        }

        async fn render(&self, summary: Option<&ExecutionSummary>) -> Result<(), PipelineError> {
            push(&self.events, format!("report {}", summary.is_some()));
            if self.fail {
                return Err(PipelineError::Report {
                    renderer: self.name().to_string(),
                    reason: "template missing".to_string(),
                });
            }
            Ok(())
        }
    }

    struct MockStats {
        events: Events,
        fail: bool,
    }

    impl StatsRenderer for MockStats {
        fn name(&self) -> &str {
            "mock-stats"
        }

        fn render(&self, coverage: &CoverageMeter, _timer: &StageTimer) -> Result<(), PipelineError> {
            push(&self.events, format!("stats {}", coverage.test_cases()));
            if self.fail {
                return Err(PipelineError::Report {
                    renderer: self.name().to_string(),
                    reason: "disk full".to_string(),
                });
            }
            Ok(())
        }
    }

    struct Fixture {
        _temp: TempDir,
        root: Utf8PathBuf,
        events: Events,
        generator_fails: bool,
        writer_fails: bool,
        build_failures: usize,
        harness: HarnessMode,
        report_fails: bool,
        csv_stats: bool,
        coverage: bool,
        harness_timeout: Duration,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
            Self {
                _temp: temp,
                root,
                events: Arc::default(),
                generator_fails: false,
                writer_fails: false,
                build_failures: 0,
                harness: HarnessMode::Pass,
                report_fails: false,
                csv_stats: false,
                coverage: false,
                harness_timeout: Duration::from_secs(5),
            }
        }

        fn cases() -> Vec<TestCase> {
            vec![
                TestCase::new("1", "getItem", "get", "/items/{id}").with_path_param("id", "4"),
                TestCase::new("2", "getItem", "get", "/items/{id}")
                    .with_path_param("id", "abc")
                    .faulty("id is not an integer"),
            ]
        }

        fn settings(&self) -> PipelineSettings {
            PipelineSettings {
                target_dir: self.root.join("generated"),
                test_class_name: "ItemsTest".to_string(),
                package_name: "probe".to_string(),
                csv_stats: self.csv_stats,
                input_coverage: self.coverage,
                output_coverage: false,
                testcases_csv: self.root.join("data/test-cases.csv"),
                nominal_faulty_csv: self.root.join("data/nominal-faulty.csv"),
                results_dir: self.root.join("results"),
                harness_timeout: self.harness_timeout,
            }
        }

        fn orchestrator(&self) -> PipelineOrchestrator {
            let events = &self.events;
            let collaborators = Collaborators {
                generator: Box::new(FixedGenerator {
                    events: Arc::clone(events),
                    cases: Self::cases(),
                    fail: self.generator_fails,
                    nominal: 0,
                    faulty: 0,
                }),
                writer: Box::new(RecordingWriter {
                    events: Arc::clone(events),
                    fail: self.writer_fails,
                }),
                builder: Box::new(FlakyBuilder {
                    events: Arc::clone(events),
                    failures: AtomicUsize::new(self.build_failures),
                }),
                harness: Box::new(ScriptedHarness {
                    events: Arc::clone(events),
                    mode: self.harness,
                }),
                observer: Box::new(CountingObserver {
                    events: Arc::clone(events),
                }),
                report_renderer: Box::new(MockReport {
                    events: Arc::clone(events),
                    fail: self.report_fails,
                }),
                stats_renderer: Box::new(MockStats {
                    events: Arc::clone(events),
                    fail: self.report_fails,
                }),
            };
            PipelineOrchestrator::new(self.settings(), collaborators)
                .with_timer(Arc::new(StageTimer::new()))
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_full_run_visits_every_stage_in_order() {
        let fixture = Fixture::new();
        let mut orchestrator = fixture.orchestrator();
        assert_eq!(orchestrator.state(), PipelineState::Idle);

        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.state(), PipelineState::Done);
        let root = &fixture.root;
        assert_eq!(
            fixture.events(),
            [
                "generate".to_string(),
                format!("write {root}/generated/ItemsTest 2"),
                "build probe.ItemsTest".to_string(),
                format!("execute probe.ItemsTest {root}/results"),
                "observed case-1".to_string(),
                "report true".to_string(),
                "stats 0".to_string(),
            ]
        );
        assert_eq!(outcome.unit, "probe.ItemsTest");
        assert_eq!(outcome.summary.as_ref().map(ExecutionSummary::successful), Some(1));
        assert!(outcome.execution_error.is_none());
        assert_eq!(orchestrator.num_test_cases(), 2);

        let timer = orchestrator.timer();
        assert_eq!(timer.samples(TestStep::TestSuiteGeneration).len(), 1);
        assert_eq!(timer.samples(TestStep::TestSuiteExecution).len(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_statistics_disabled_writes_no_csv() {
        let fixture = Fixture::new();
        let mut orchestrator = fixture.orchestrator();

        orchestrator.run().await.unwrap();

        assert!(!fixture.root.join("data/test-cases.csv").exists());
        assert!(!fixture.root.join("data/nominal-faulty.csv").exists());
        assert!(orchestrator.coverage().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_statistics_enabled_exports_cases_and_counts() {
        let mut fixture = Fixture::new();
        fixture.csv_stats = true;
        fixture.coverage = true;
        let mut orchestrator = fixture.orchestrator();

        orchestrator.run().await.unwrap();

        let cases = std::fs::read_to_string(fixture.root.join("data/test-cases.csv")).unwrap();
        assert_eq!(cases.lines().count(), 3);
        let counts =
            std::fs::read_to_string(fixture.root.join("data/nominal-faulty.csv")).unwrap();
        assert_eq!(counts, "testClassName,nominal,faulty\nItemsTest,1,1\n");
        assert_eq!(orchestrator.coverage().test_cases(), 2);
        assert!(fixture.events().contains(&"stats 2".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn test_generation_failure_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.generator_fails = true;
        let mut orchestrator = fixture.orchestrator();

        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::Generation { .. }));
        assert_eq!(orchestrator.state(), PipelineState::Failed);
        assert_eq!(fixture.events(), ["generate"]);
    }

    #[tokio::test]
    #[serial]
    async fn test_write_failure_stops_before_build() {
        let mut fixture = Fixture::new();
        fixture.writer_fails = true;
        let mut orchestrator = fixture.orchestrator();

        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::Write { .. }));
        assert_eq!(orchestrator.state(), PipelineState::Failed);
        assert!(!fixture.events().iter().any(|e| e.starts_with("build")));
    }

    #[tokio::test]
    #[serial]
    async fn test_build_failure_is_fatal_and_instance_stays_usable() {
        let mut fixture = Fixture::new();
        fixture.build_failures = 1;
        let mut orchestrator = fixture.orchestrator();

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Build { .. }));
        assert_eq!(orchestrator.state(), PipelineState::Failed);
        assert!(!fixture.events().iter().any(|e| e.starts_with("execute")));
        assert!(!fixture.events().iter().any(|e| e.starts_with("report")));

        orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.state(), PipelineState::Done);
        assert_eq!(orchestrator.num_test_cases(), 4);
    }

    #[tokio::test]
    #[serial]
    async fn test_harness_failure_still_reports() {
        let mut fixture = Fixture::new();
        fixture.harness = HarnessMode::Crash;
        let mut orchestrator = fixture.orchestrator();

        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.state(), PipelineState::Done);
        assert!(outcome.summary.is_none());
        assert!(matches!(
            outcome.execution_error,
            Some(PipelineError::Execution { .. })
        ));
        let events = fixture.events();
        assert!(events.contains(&"report false".to_string()));
        assert!(events.contains(&"stats 0".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn test_harness_timeout_is_not_fatal() {
        let mut fixture = Fixture::new();
        fixture.harness = HarnessMode::Hang;
        fixture.harness_timeout = Duration::from_millis(50);
        let mut orchestrator = fixture.orchestrator();

        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.state(), PipelineState::Done);
        let err = outcome.execution_error.unwrap();
        assert!(matches!(err, PipelineError::ExecutionTimeout { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    #[serial]
    async fn test_renderer_failures_are_independent() {
        let mut fixture = Fixture::new();
        fixture.report_fails = true;
        let mut orchestrator = fixture.orchestrator();

        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.state(), PipelineState::Done);
        assert_eq!(outcome.report_errors.len(), 2);
        let events = fixture.events();
        assert!(events.contains(&"report true".to_string()));
        assert!(events.contains(&"stats 0".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn test_counts_accumulate_until_reset() {
        let fixture = Fixture::new();
        let mut orchestrator = fixture.orchestrator();

        orchestrator.run().await.unwrap();
        orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.num_test_cases(), 4);

        orchestrator.reset_num_test_cases();
        assert_eq!(orchestrator.num_test_cases(), 0);
        orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.num_test_cases(), 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_run_with_skips_generation() {
        let mut fixture = Fixture::new();
        fixture.csv_stats = true;
        fixture.coverage = true;
        let mut orchestrator = fixture.orchestrator();

        let supplied = vec![TestCase::new("x", "listItems", "get", "/items")];
        let outcome = orchestrator.run_with(supplied).await.unwrap();

        assert_eq!(outcome.test_cases, 1);
        assert_eq!(orchestrator.state(), PipelineState::Done);
        assert_eq!(orchestrator.num_test_cases(), 0);
        assert!(!fixture.events().contains(&"generate".to_string()));
        assert_eq!(orchestrator.coverage().test_cases(), 1);
        assert!(fixture.root.join("data/test-cases.csv").exists());
        assert!(!fixture.root.join("data/nominal-faulty.csv").exists());
    }

    #[tokio::test]
    #[serial]
    async fn test_retargeting_between_runs() {
        let fixture = Fixture::new();
        let mut orchestrator = fixture.orchestrator();

        orchestrator.run().await.unwrap();
        orchestrator.set_target_dir(fixture.root.join("second"));
        orchestrator.set_test_class_name("ItemsTestB");
        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(outcome.artifact, fixture.root.join("second/ItemsTestB"));
        assert_eq!(outcome.unit, "probe.ItemsTestB");
        assert!(fixture.events().contains(&"build probe.ItemsTestB".to_string()));
    }
}
