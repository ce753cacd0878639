//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and the subcommand enum.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// apiprobe - black-box test generation and execution for OpenAPI services
#[derive(Parser, Debug)]
#[command(name = "apiprobe")]
#[command(about = "Generate, ground and run black-box test suites for OpenAPI services")]
#[command(long_about = r#"
apiprobe turns an OpenAPI description into a declarative test configuration,
grounds semantic parameters against a knowledge base, and drives generated
test suites through writing, building, execution and reporting.

EXAMPLES:
  # Generate a default test configuration for every operation
  apiprobe generate-config --spec openapi.yaml --out testconf.yaml

  # Only GET and DELETE on one path
  apiprobe generate-config --spec openapi.yaml --out testconf.yaml --filter '/items/{id}:get,delete'

  # Fill semantic parameters from DBpedia
  apiprobe ground --spec openapi.yaml --conf testconf.yaml

  # Run a stored test suite through the pipeline
  apiprobe run --suite suite.json --class-name ItemsTest --package probe

  # Show the effective configuration and where each value came from
  apiprobe config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .apiprobe/config.toml
  (or $APIPROBE_HOME/config.toml). Use --config to specify an explicit path.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Experiment name used to namespace statistics and results
    #[arg(long, global = true)]
    pub experiment: Option<String>,

    /// Export test cases, counts and timings to CSV
    #[arg(long, global = true)]
    pub csv_stats: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a default test configuration from an API description
    ///
    /// Every selected operation gets one generator per parameter. Query and
    /// path parameters whose type has no generator abort generation.
    GenerateConfig {
        /// OpenAPI/Swagger document (YAML or JSON)
        #[arg(long)]
        spec: Utf8PathBuf,

        /// Destination of the YAML test configuration
        #[arg(long)]
        out: Utf8PathBuf,

        /// PATH:METHOD[,METHOD...] selector; repeat for several (default: everything)
        #[arg(long = "filter", value_name = "FILTER")]
        filters: Vec<String>,
    },

    /// Ground semantic parameters of a test configuration in place
    Ground {
        /// OpenAPI/Swagger document the configuration was generated from
        #[arg(long)]
        spec: Utf8PathBuf,

        /// Test configuration to update
        #[arg(long)]
        conf: Utf8PathBuf,

        /// SPARQL endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Directory receiving per-parameter value files
        #[arg(long)]
        out_dir: Option<Utf8PathBuf>,
    },

    /// Take a JSON test suite through write, build, execute and report
    Run {
        /// JSON suite replayed as the generated test cases
        #[arg(long)]
        suite: Utf8PathBuf,

        /// Directory receiving the generated artifact
        #[arg(long)]
        target_dir: Option<Utf8PathBuf>,

        /// Name of the generated test class
        #[arg(long)]
        class_name: Option<String>,

        /// Package of the generated test class
        #[arg(long)]
        package: Option<String>,

        /// Harness timeout in seconds
        #[arg(long)]
        harness_timeout: Option<u64>,
    },

    /// Show the effective configuration and the source of each value
    Config,
}

impl Commands {
    /// Operation name used in error reports
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenerateConfig { .. } => "generate-config",
            Self::Ground { .. } => "ground",
            Self::Run { .. } => "run",
            Self::Config => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_filters() {
        let cli = Cli::parse_from([
            "apiprobe",
            "generate-config",
            "--spec",
            "api.yaml",
            "--out",
            "conf.yaml",
            "--filter",
            "/items:get",
            "--filter",
            "*:post",
        ]);
        match cli.command {
            Commands::GenerateConfig { filters, .. } => {
                assert_eq!(filters, ["/items:get", "*:post"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["apiprobe", "run", "--suite", "s.json", "--verbose", "--csv-stats"]);
        assert!(cli.verbose);
        assert!(cli.csv_stats);
        assert_eq!(cli.command.name(), "run");
    }
}
