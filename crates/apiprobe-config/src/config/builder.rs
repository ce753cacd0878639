use camino::Utf8PathBuf;
use std::time::Duration;

use apiprobe_utils::error::ApiProbeError;

use super::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding apiprobe without relying on environment
    /// variables or config files.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use apiprobe_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .target_dir("generated")
    ///     .test_class_name("PetstoreTest")
    ///     .harness_timeout(Duration::from_secs(120))
    ///     .build()
    ///     .expect("Failed to build config");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// All values set via the builder are attributed to `ConfigSource::Programmatic`;
/// everything else keeps its built-in default.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a builder with every value at its default
    #[must_use]
    pub fn new() -> Self {
        let mut config = Config::default();
        for key in Config::KEYS {
            config
                .source_attribution
                .insert((*key).to_string(), ConfigSource::Default);
        }
        Self { config }
    }

    fn mark(&mut self, key: &str) {
        self.config
            .source_attribution
            .insert(key.to_string(), ConfigSource::Programmatic);
    }

    #[must_use]
    pub fn target_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.run.target_dir = Some(path.into());
        self.mark("target_dir");
        self
    }

    #[must_use]
    pub fn test_class_name(mut self, name: impl Into<String>) -> Self {
        self.config.run.test_class_name = Some(name.into());
        self.mark("test_class_name");
        self
    }

    #[must_use]
    pub fn package_name(mut self, name: impl Into<String>) -> Self {
        self.config.run.package_name = Some(name.into());
        self.mark("package_name");
        self
    }

    #[must_use]
    pub fn experiment_name(mut self, name: impl Into<String>) -> Self {
        self.config.run.experiment_name = Some(name.into());
        self.mark("experiment_name");
        self
    }

    /// Enable or disable CSV statistics export
    #[must_use]
    pub fn csv_stats(mut self, enabled: bool) -> Self {
        self.config.stats.enable_csv_stats = Some(enabled);
        self.mark("enable_csv_stats");
        self
    }

    #[must_use]
    pub fn input_coverage(mut self, enabled: bool) -> Self {
        self.config.stats.enable_input_coverage = Some(enabled);
        self.mark("enable_input_coverage");
        self
    }

    #[must_use]
    pub fn output_coverage(mut self, enabled: bool) -> Self {
        self.config.stats.enable_output_coverage = Some(enabled);
        self.mark("enable_output_coverage");
        self
    }

    /// Base directory for test data; the experiment name is appended
    #[must_use]
    pub fn test_data_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.stats.test_data_dir = Some(path.into());
        self.mark("test_data_dir");
        self
    }

    /// Base directory for coverage data; the experiment name is appended
    #[must_use]
    pub fn coverage_data_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.stats.coverage_data_dir = Some(path.into());
        self.mark("coverage_data_dir");
        self
    }

    #[must_use]
    pub fn results_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.reports.results_dir = Some(path.into());
        self.mark("results_dir");
        self
    }

    #[must_use]
    pub fn report_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.reports.report_dir = Some(path.into());
        self.mark("report_dir");
        self
    }

    #[must_use]
    pub fn report_command(mut self, command: impl Into<String>) -> Self {
        self.config.reports.report_command = Some(command.into());
        self.mark("report_command");
        self
    }

    #[must_use]
    pub fn build_command(mut self, command: impl Into<String>) -> Self {
        self.config.execution.build_command = Some(command.into());
        self.mark("build_command");
        self
    }

    #[must_use]
    pub fn harness_command(mut self, command: impl Into<String>) -> Self {
        self.config.execution.harness_command = Some(command.into());
        self.mark("harness_command");
        self
    }

    /// Set the harness timeout. Sub-second precision is truncated.
    #[must_use]
    pub fn harness_timeout(mut self, timeout: Duration) -> Self {
        self.config.execution.harness_timeout_secs = Some(timeout.as_secs());
        self.mark("harness_timeout_secs");
        self
    }

    #[must_use]
    pub fn grounding_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.grounding.endpoint = Some(endpoint.into());
        self.mark("endpoint");
        self
    }

    #[must_use]
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config.grounding.query_timeout_secs = Some(timeout.as_secs());
        self.mark("query_timeout_secs");
        self
    }

    #[must_use]
    pub fn grounding_output_dir(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config.grounding.output_dir = Some(path.into());
        self.mark("grounding_output_dir");
        self
    }

    #[must_use]
    pub fn result_limit(mut self, limit: u32) -> Self {
        self.config.grounding.result_limit = Some(limit);
        self.mark("result_limit");
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    /// Returns `ApiProbeError::Config` when a value fails validation.
    pub fn build(self) -> Result<Config, ApiProbeError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
