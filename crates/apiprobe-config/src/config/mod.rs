//! Configuration management for apiprobe
//!
//! Hierarchical configuration with discovery and precedence: CLI > file > defaults.
//! Every `Option` field is filled by the section defaults, so the accessors on
//! [`Config`] only fall back for values a caller explicitly cleared.

mod builder;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use discovery::{CONFIG_DIR_NAME, HOME_ENV_VAR};
pub use model::*;
pub use apiprobe_utils::types::ConfigSource;

use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;

impl Config {
    /// Keys tracked in `source_attribution`
    pub const KEYS: &'static [&'static str] = &[
        "target_dir",
        "test_class_name",
        "package_name",
        "experiment_name",
        "enable_csv_stats",
        "enable_input_coverage",
        "enable_output_coverage",
        "test_data_dir",
        "coverage_data_dir",
        "testcases_file",
        "nominal_faulty_file",
        "time_file",
        "results_dir",
        "report_dir",
        "report_command",
        "build_command",
        "harness_command",
        "harness_timeout_secs",
        "endpoint",
        "query_timeout_secs",
        "grounding_output_dir",
        "result_limit",
    ];

    #[must_use]
    pub fn target_dir(&self) -> Utf8PathBuf {
        self.run
            .target_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/generated"))
    }

    #[must_use]
    pub fn test_class_name(&self) -> &str {
        self.run.test_class_name.as_deref().unwrap_or("ApiProbeTest")
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        self.run.package_name.as_deref().unwrap_or("apiprobe")
    }

    #[must_use]
    pub fn experiment_name(&self) -> &str {
        self.run.experiment_name.as_deref().unwrap_or("default")
    }

    #[must_use]
    pub fn csv_stats_enabled(&self) -> bool {
        self.stats.enable_csv_stats.unwrap_or(false)
    }

    #[must_use]
    pub fn input_coverage_enabled(&self) -> bool {
        self.stats.enable_input_coverage.unwrap_or(false)
    }

    #[must_use]
    pub fn output_coverage_enabled(&self) -> bool {
        self.stats.enable_output_coverage.unwrap_or(false)
    }

    /// Directory holding per-experiment test data
    #[must_use]
    pub fn test_data_dir(&self) -> Utf8PathBuf {
        let base = self
            .stats
            .test_data_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/test-data"));
        base.join(self.experiment_name())
    }

    /// Directory holding per-experiment coverage data
    #[must_use]
    pub fn coverage_data_dir(&self) -> Utf8PathBuf {
        let base = self
            .stats
            .coverage_data_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/coverage-data"));
        base.join(self.experiment_name())
    }

    /// CSV file receiving one row per generated test case
    #[must_use]
    pub fn testcases_csv_path(&self) -> Utf8PathBuf {
        self.test_data_dir()
            .join(self.stats.testcases_file.as_deref().unwrap_or("test-cases.csv"))
    }

    /// CSV file receiving nominal/faulty counts per run
    #[must_use]
    pub fn nominal_faulty_csv_path(&self) -> Utf8PathBuf {
        self.test_data_dir().join(
            self.stats
                .nominal_faulty_file
                .as_deref()
                .unwrap_or("nominal-faulty.csv"),
        )
    }

    /// CSV file receiving stage timings
    #[must_use]
    pub fn time_csv_path(&self) -> Utf8PathBuf {
        self.test_data_dir()
            .join(self.stats.time_file.as_deref().unwrap_or("time.csv"))
    }

    #[must_use]
    pub fn results_dir(&self) -> Utf8PathBuf {
        self.reports
            .results_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/results"))
            .join(self.experiment_name())
    }

    #[must_use]
    pub fn report_dir(&self) -> Utf8PathBuf {
        self.reports
            .report_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/reports"))
            .join(self.experiment_name())
    }

    #[must_use]
    pub fn harness_timeout(&self) -> Duration {
        Duration::from_secs(
            self.execution
                .harness_timeout_secs
                .unwrap_or(DEFAULT_HARNESS_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn grounding_endpoint(&self) -> &str {
        self.grounding
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SPARQL_ENDPOINT)
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(
            self.grounding
                .query_timeout_secs
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn grounding_output_dir(&self) -> Utf8PathBuf {
        self.grounding
            .output_dir
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from("target/apiprobe/grounding"))
    }

    #[must_use]
    pub fn result_limit(&self) -> u32 {
        self.grounding.result_limit.unwrap_or(100)
    }

    /// Path of the configuration directory for a project root
    #[must_use]
    pub fn config_dir_for(root: &Utf8Path) -> Utf8PathBuf {
        root.join(CONFIG_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_utils::error::{ApiProbeError, ConfigError};
    use apiprobe_utils::exit_codes::ExitCode;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(root: &std::path::Path, content: &str) {
        let dir = root.join(CONFIG_DIR_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), content).unwrap();
    }

    #[test]
    #[serial]
    fn test_defaults_without_config_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();

        assert_eq!(config.test_class_name(), "ApiProbeTest");
        assert!(!config.csv_stats_enabled());
        assert_eq!(config.harness_timeout(), Duration::from_secs(600));
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
        assert_eq!(
            config.source_attribution.get("test_class_name"),
            Some(&ConfigSource::Default)
        );
    }

    #[test]
    #[serial]
    fn test_file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(
            temp.path(),
            r#"
[run]
test_class_name = "PetstoreTest"
experiment_name = "nightly"

[stats]
enable_csv_stats = true

[execution]
harness_timeout_secs = 42
"#,
        );

        let config = Config::discover_from(temp.path(), &CliArgs::default()).unwrap();

        assert_eq!(config.test_class_name(), "PetstoreTest");
        assert!(config.csv_stats_enabled());
        assert_eq!(config.harness_timeout(), Duration::from_secs(42));
        assert_eq!(
            config.testcases_csv_path(),
            Utf8PathBuf::from("target/apiprobe/test-data/nightly/test-cases.csv")
        );
        assert_eq!(
            config.source_attribution.get("enable_csv_stats"),
            Some(&ConfigSource::Config)
        );
    }

    #[test]
    #[serial]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[run]\ntest_class_name = \"FromFile\"\n");

        let cli = CliArgs {
            test_class_name: Some("FromCli".to_string()),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp.path(), &cli).unwrap();

        assert_eq!(config.test_class_name(), "FromCli");
        assert_eq!(
            config.source_attribution.get("test_class_name"),
            Some(&ConfigSource::Cli)
        );
    }

    #[test]
    #[serial]
    fn test_discovery_walks_upward_and_stops_at_repo_root() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let nested = repo.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();
        write_config(&repo, "[run]\npackage_name = \"found\"\n");

        let found = Config::discover_config_file_from(&nested).unwrap();
        assert_eq!(found, Some(repo.join(CONFIG_DIR_NAME).join("config.toml")));

        // A config above the repository root is not picked up
        let outer = TempDir::new().unwrap();
        write_config(outer.path(), "[run]\npackage_name = \"outer\"\n");
        let inner = outer.path().join("inner");
        fs::create_dir_all(inner.join(".git")).unwrap();
        assert_eq!(Config::discover_config_file_from(&inner).unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_unknown_section_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write_config(temp.path(), "[bogus]\nvalue = 1\n");

        let err = Config::discover_from(temp.path(), &CliArgs::default()).unwrap_err();
        let typed = err.downcast_ref::<ApiProbeError>().unwrap();
        assert!(matches!(
            typed,
            ApiProbeError::Config(ConfigError::InvalidFile { .. })
        ));
        assert_eq!(typed.to_exit_code(), ExitCode::CLI_ARGS);
        assert!(typed.to_string().contains("bogus"));
    }

    #[test]
    #[serial]
    fn test_explicit_missing_config_path_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let cli = CliArgs {
            config_path: Some(temp.path().join("missing.toml")),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp.path(), &cli).unwrap();
        assert_eq!(config.package_name(), "apiprobe");
    }
}
