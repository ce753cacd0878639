use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use apiprobe_utils::types::ConfigSource;

/// Default harness timeout in seconds
pub const DEFAULT_HARNESS_TIMEOUT_SECS: u64 = 600;

/// Default knowledge-base query timeout in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Default SPARQL endpoint used for grounding
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://dbpedia.org/sparql";

/// Configuration for apiprobe operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Respects the `APIPROBE_HOME` environment variable
/// - Searches for `.apiprobe/config.toml` upward from current directory
/// - Applies built-in defaults for unspecified values
///
/// # Source Attribution
///
/// Each configuration value tracks its source (`cli`, `config`, `programmatic`, or `default`).
///
/// # Configuration File Format
///
/// ```toml
/// [run]
/// target_dir = "target/apiprobe/generated"
/// test_class_name = "PetstoreTest"
/// package_name = "petstore"
/// experiment_name = "nightly"
///
/// [stats]
/// enable_csv_stats = true
/// enable_input_coverage = true
///
/// [reports]
/// results_dir = "target/apiprobe/results"
/// report_command = "allure generate {results_dir} -o {report_dir} --clean"
///
/// [execution]
/// build_command = "cargo build --manifest-path {artifact_dir}/Cargo.toml"
/// harness_command = "probe-harness --suite {artifact} --results {results_dir}"
/// harness_timeout_secs = 600
///
/// [grounding]
/// endpoint = "https://dbpedia.org/sparql"
/// query_timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where and under which names generated artifacts are written.
    pub run: RunConfig,
    /// Statistics and coverage collection.
    pub stats: StatsConfig,
    /// Result and report directories.
    pub reports: ReportsConfig,
    /// Build and harness commands.
    pub execution: ExecutionConfig,
    /// Knowledge-base grounding.
    pub grounding: GroundingConfig,
    /// Source attribution for each setting.
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[run]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    pub target_dir: Option<Utf8PathBuf>,
    pub test_class_name: Option<String>,
    pub package_name: Option<String>,
    pub experiment_name: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_dir: Some(Utf8PathBuf::from("target/apiprobe/generated")),
            test_class_name: Some("ApiProbeTest".to_string()),
            package_name: Some("apiprobe".to_string()),
            experiment_name: Some("default".to_string()),
        }
    }
}

/// `[stats]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    pub enable_csv_stats: Option<bool>,
    pub enable_input_coverage: Option<bool>,
    pub enable_output_coverage: Option<bool>,
    pub test_data_dir: Option<Utf8PathBuf>,
    pub coverage_data_dir: Option<Utf8PathBuf>,
    pub testcases_file: Option<String>,
    pub nominal_faulty_file: Option<String>,
    pub time_file: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable_csv_stats: Some(false),
            enable_input_coverage: Some(false),
            enable_output_coverage: Some(false),
            test_data_dir: Some(Utf8PathBuf::from("target/apiprobe/test-data")),
            coverage_data_dir: Some(Utf8PathBuf::from("target/apiprobe/coverage-data")),
            testcases_file: Some("test-cases.csv".to_string()),
            nominal_faulty_file: Some("nominal-faulty.csv".to_string()),
            time_file: Some("time.csv".to_string()),
        }
    }
}

/// `[reports]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    pub results_dir: Option<Utf8PathBuf>,
    pub report_dir: Option<Utf8PathBuf>,
    /// Command line run after execution; `{results_dir}` and `{report_dir}` are substituted.
    pub report_command: Option<String>,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            results_dir: Some(Utf8PathBuf::from("target/apiprobe/results")),
            report_dir: Some(Utf8PathBuf::from("target/apiprobe/reports")),
            report_command: None,
        }
    }
}

/// `[execution]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// Command used to compile/load the artifact; when unset the artifact is loaded as-is.
    pub build_command: Option<String>,
    /// Command that runs the built unit and prints a JSON summary on stdout.
    pub harness_command: Option<String>,
    pub harness_timeout_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            build_command: None,
            harness_command: None,
            harness_timeout_secs: Some(DEFAULT_HARNESS_TIMEOUT_SECS),
        }
    }
}

/// `[grounding]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroundingConfig {
    pub endpoint: Option<String>,
    pub query_timeout_secs: Option<u64>,
    pub output_dir: Option<Utf8PathBuf>,
    /// LIMIT applied to generated SPARQL queries.
    pub result_limit: Option<u32>,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_SPARQL_ENDPOINT.to_string()),
            query_timeout_secs: Some(DEFAULT_QUERY_TIMEOUT_SECS),
            output_dir: Some(Utf8PathBuf::from("target/apiprobe/grounding")),
            result_limit: Some(100),
        }
    }
}

/// CLI overrides fed into discovery
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<std::path::PathBuf>,
    pub verbose: Option<bool>,
    pub target_dir: Option<Utf8PathBuf>,
    pub test_class_name: Option<String>,
    pub package_name: Option<String>,
    pub experiment_name: Option<String>,
    pub enable_csv_stats: Option<bool>,
    pub harness_timeout_secs: Option<u64>,
    pub endpoint: Option<String>,
    pub grounding_output_dir: Option<Utf8PathBuf>,
}
