//! Command handlers for the apiprobe CLI
//!
//! Each handler returns `anyhow::Result`; typed failures are wrapped in
//! [`ApiProbeError`] so `run()` can map them to exit codes.

use anyhow::Result;
use camino::Utf8Path;
use std::str::FromStr;

use apiprobe_grounding::{GroundingAdapter, PredicateQueryBuilder, SparqlEndpoint};
use apiprobe_openapi::load_spec;
use apiprobe_orchestrator::{
    Collaborators, CommandBuilder, CommandHarness, CommandReportRenderer, CoverageStatsRenderer,
    JsonSuiteWriter, PipelineOrchestrator, PipelineOutcome, PipelineSettings,
    ResultsDirectoryObserver, SuiteFileGenerator,
};
use apiprobe_testconf::{ConfigRuleEngine, Filter, io as testconf_io};
use apiprobe_utils::error::{GroundingError, PipelineError};

use crate::{ApiProbeError, Config};

/// Parse `--filter` values; no filters selects every operation
pub(crate) fn parse_filters(raw: &[String]) -> Result<Vec<Filter>, ApiProbeError> {
    if raw.is_empty() {
        return Ok(vec![Filter::all()]);
    }
    raw.iter()
        .map(|s| Filter::from_str(s).map_err(ApiProbeError::from))
        .collect()
}

/// Generate a default test configuration document
///
/// Unlike [`ConfigRuleEngine::generate`], a failed write is an error here:
/// the document is the only product of this command.
pub fn execute_generate_config(spec: &Utf8Path, out: &Utf8Path, filters: &[String]) -> Result<()> {
    let filters = parse_filters(filters)?;
    let api = load_spec(spec).map_err(ApiProbeError::from)?;

    let doc = ConfigRuleEngine::new()
        .build(&api, &filters)
        .map_err(ApiProbeError::from)?;
    testconf_io::save(&doc, out).map_err(ApiProbeError::from)?;

    println!(
        "✓ Generated test configuration for '{}': {} path(s), {} operation(s)",
        api.title,
        doc.test_paths().len(),
        doc.operations().count()
    );
    println!("  Written to {out}");
    Ok(())
}

/// Ground the semantic parameters of a stored test configuration
pub async fn execute_ground(spec: &Utf8Path, conf: &Utf8Path, config: &Config) -> Result<()> {
    let api = load_spec(spec).map_err(ApiProbeError::from)?;
    let mut doc = testconf_io::load(conf).map_err(ApiProbeError::from)?;

    let endpoint = SparqlEndpoint::new(config.grounding_endpoint(), config.query_timeout())
        .map_err(ApiProbeError::from)?;
    let adapter = GroundingAdapter::new(
        Box::new(PredicateQueryBuilder::new(config.result_limit())),
        Box::new(endpoint),
        config.query_timeout(),
        config.grounding_output_dir(),
    );

    let report = adapter.ground(&mut doc, &api.title).await;
    testconf_io::save(&doc, conf).map_err(ApiProbeError::from)?;

    if report.outcomes.is_empty() {
        println!("✓ No semantic parameters to ground in {conf}");
        return Ok(());
    }

    println!(
        "✓ Grounded {}/{} semantic parameter(s) against {}",
        report.grounded(),
        report.outcomes.len(),
        config.grounding_endpoint()
    );
    for outcome in report.outcomes.iter().filter(|o| o.error.is_some()) {
        println!(
            "⚠ {}.{}: {}",
            outcome.operation_id,
            outcome.parameter,
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    if report.failed() == report.outcomes.len() {
        return Err(ApiProbeError::from(GroundingError::Query {
            endpoint: config.grounding_endpoint().to_string(),
            reason: "every grounding query failed".to_string(),
        })
        .into());
    }
    Ok(())
}

/// Assemble the command-driven collaborators from configuration
pub(crate) fn default_collaborators(
    suite: &Utf8Path,
    config: &Config,
) -> Result<Collaborators, PipelineError> {
    let mut stats = CoverageStatsRenderer::new(config.test_class_name(), config.coverage_data_dir());
    if config.csv_stats_enabled() {
        stats = stats.with_time_csv(config.time_csv_path());
    }

    Ok(Collaborators {
        generator: Box::new(SuiteFileGenerator::new(suite)),
        writer: Box::new(JsonSuiteWriter::new()),
        builder: Box::new(CommandBuilder::new(
            config.execution.build_command.as_deref(),
            config.harness_timeout(),
        )?),
        harness: Box::new(CommandHarness::new(config.execution.harness_command.as_deref())?),
        observer: Box::new(ResultsDirectoryObserver::new()),
        report_renderer: Box::new(CommandReportRenderer::new(
            config.reports.report_command.as_deref(),
            config.results_dir(),
            config.report_dir(),
            config.harness_timeout(),
        )?),
        stats_renderer: Box::new(stats),
    })
}

/// Take a stored suite through the test pipeline
pub async fn execute_run(suite: &Utf8Path, config: &Config) -> Result<()> {
    let collaborators = default_collaborators(suite, config).map_err(ApiProbeError::from)?;
    let mut orchestrator =
        PipelineOrchestrator::new(PipelineSettings::from_config(config), collaborators);

    let outcome = orchestrator.run().await.map_err(ApiProbeError::from)?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    println!(
        "✓ {}: {} test case(s) written to {}",
        outcome.unit, outcome.test_cases, outcome.artifact
    );
    match (&outcome.summary, &outcome.execution_error) {
        (Some(summary), _) => println!(
            "  Executed {}: {} passed, {} failed, {} ignored",
            summary.total,
            summary.successful(),
            summary.failed,
            summary.ignored
        ),
        (None, Some(err)) => println!("⚠ Execution did not complete: {err}"),
        (None, None) => {}
    }
    for err in &outcome.report_errors {
        println!("⚠ {err}");
    }
}

/// Print the effective configuration with the source of each value
pub fn execute_config(config: &Config) {
    println!("Effective configuration:");
    for (key, (value, source)) in config.effective_config() {
        println!("  {key} = {value} ({source})");
    }
}
