use anyhow::{Context, Result};
use apiprobe_utils::error::{ApiProbeError, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use super::{
    CliArgs, Config, ConfigSource, ExecutionConfig, GroundingConfig, ReportsConfig, RunConfig,
    StatsConfig,
};

/// Name of the per-project configuration directory
pub const CONFIG_DIR_NAME: &str = ".apiprobe";

/// Environment variable pointing at a configuration directory
pub const HOME_ENV_VAR: &str = "APIPROBE_HOME";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    run: Option<RunConfig>,
    stats: Option<StatsConfig>,
    reports: Option<ReportsConfig>,
    execution: Option<ExecutionConfig>,
    grounding: Option<GroundingConfig>,
}

/// Replace `slot` with `value` when present and record where it came from
fn overlay<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(v) = value {
        *slot = Some(v);
        attribution.insert(key.to_string(), source);
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    ///
    /// # Errors
    /// Returns an error if the working directory is unavailable, the config file
    /// cannot be parsed, or the merged configuration fails validation.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    ///
    /// # Errors
    /// See [`Config::discover`].
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut config = Config::default();
        for key in Self::KEYS {
            config
                .source_attribution
                .insert((*key).to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit_path) => Some(explicit_path.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config);
        }

        config.apply_cli(cli_args);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let src = ConfigSource::Config;
        let attr = &mut self.source_attribution;

        if let Some(run) = file.run {
            overlay(&mut self.run.target_dir, run.target_dir, "target_dir", src, attr);
            overlay(
                &mut self.run.test_class_name,
                run.test_class_name,
                "test_class_name",
                src,
                attr,
            );
            overlay(&mut self.run.package_name, run.package_name, "package_name", src, attr);
            overlay(
                &mut self.run.experiment_name,
                run.experiment_name,
                "experiment_name",
                src,
                attr,
            );
        }

        if let Some(stats) = file.stats {
            let s = &mut self.stats;
            overlay(&mut s.enable_csv_stats, stats.enable_csv_stats, "enable_csv_stats", src, attr);
            overlay(
                &mut s.enable_input_coverage,
                stats.enable_input_coverage,
                "enable_input_coverage",
                src,
                attr,
            );
            overlay(
                &mut s.enable_output_coverage,
                stats.enable_output_coverage,
                "enable_output_coverage",
                src,
                attr,
            );
            overlay(&mut s.test_data_dir, stats.test_data_dir, "test_data_dir", src, attr);
            overlay(
                &mut s.coverage_data_dir,
                stats.coverage_data_dir,
                "coverage_data_dir",
                src,
                attr,
            );
            overlay(&mut s.testcases_file, stats.testcases_file, "testcases_file", src, attr);
            overlay(
                &mut s.nominal_faulty_file,
                stats.nominal_faulty_file,
                "nominal_faulty_file",
                src,
                attr,
            );
            overlay(&mut s.time_file, stats.time_file, "time_file", src, attr);
        }

        if let Some(reports) = file.reports {
            let r = &mut self.reports;
            overlay(&mut r.results_dir, reports.results_dir, "results_dir", src, attr);
            overlay(&mut r.report_dir, reports.report_dir, "report_dir", src, attr);
            overlay(&mut r.report_command, reports.report_command, "report_command", src, attr);
        }

        if let Some(execution) = file.execution {
            let e = &mut self.execution;
            overlay(&mut e.build_command, execution.build_command, "build_command", src, attr);
            overlay(
                &mut e.harness_command,
                execution.harness_command,
                "harness_command",
                src,
                attr,
            );
            overlay(
                &mut e.harness_timeout_secs,
                execution.harness_timeout_secs,
                "harness_timeout_secs",
                src,
                attr,
            );
        }

        if let Some(grounding) = file.grounding {
            let g = &mut self.grounding;
            overlay(&mut g.endpoint, grounding.endpoint, "endpoint", src, attr);
            overlay(
                &mut g.query_timeout_secs,
                grounding.query_timeout_secs,
                "query_timeout_secs",
                src,
                attr,
            );
            overlay(&mut g.output_dir, grounding.output_dir, "grounding_output_dir", src, attr);
            overlay(&mut g.result_limit, grounding.result_limit, "result_limit", src, attr);
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        let src = ConfigSource::Cli;
        let attr = &mut self.source_attribution;

        overlay(&mut self.run.target_dir, cli.target_dir.clone(), "target_dir", src, attr);
        overlay(
            &mut self.run.test_class_name,
            cli.test_class_name.clone(),
            "test_class_name",
            src,
            attr,
        );
        overlay(
            &mut self.run.package_name,
            cli.package_name.clone(),
            "package_name",
            src,
            attr,
        );
        overlay(
            &mut self.run.experiment_name,
            cli.experiment_name.clone(),
            "experiment_name",
            src,
            attr,
        );
        overlay(
            &mut self.stats.enable_csv_stats,
            cli.enable_csv_stats,
            "enable_csv_stats",
            src,
            attr,
        );
        overlay(
            &mut self.execution.harness_timeout_secs,
            cli.harness_timeout_secs,
            "harness_timeout_secs",
            src,
            attr,
        );
        overlay(&mut self.grounding.endpoint, cli.endpoint.clone(), "endpoint", src, attr);
        overlay(
            &mut self.grounding.output_dir,
            cli.grounding_output_dir.clone(),
            "grounding_output_dir",
            src,
            attr,
        );
    }

    /// Discover a config file starting from a specific directory
    ///
    /// `APIPROBE_HOME` wins when set. Otherwise searches upward for
    /// `.apiprobe/config.toml`, stopping at a repository root.
    ///
    /// # Errors
    /// Currently infallible; kept fallible for parity with [`Config::discover`].
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        if let Ok(home) = env::var(HOME_ENV_VAR)
            && !home.is_empty()
        {
            let candidate = PathBuf::from(home).join("config.toml");
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }

        let mut current_dir = start_dir;
        loop {
            let config_path = current_dir.join(CONFIG_DIR_NAME).join("config.toml");
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TomlConfig::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&content).map_err(|e| {
            anyhow::Error::from(ApiProbeError::Config(ConfigError::InvalidFile {
                path: path.display().to_string(),
                reason: e.message().to_string(),
            }))
        })
    }
}
