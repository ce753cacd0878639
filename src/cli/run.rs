//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use tracing::debug;

use super::args::{Cli, Commands};
use super::commands;
use super::report::contextual_report;
use crate::{ApiProbeError, CliArgs, Config, ExitCode};
use apiprobe_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// This function handles ALL output including errors. On error it prints a
/// contextual report and returns the exit code; `main` only exits with it.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("⚠ Failed to initialise logging: {e}");
    }

    let cli_args = cli_args_for(&cli);

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", contextual_report(&err, "config"));
            return Err(exit_code_for(&err, ExitCode::CLI_ARGS));
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = cli.command.name();
    debug!(operation, config_file = ?cli.config, "Dispatching command");
    let command = cli.command;
    let result = rt.block_on(async {
        match command {
            Commands::GenerateConfig { spec, out, filters } => {
                commands::execute_generate_config(&spec, &out, &filters)
            }
            Commands::Ground { spec, conf, .. } => {
                commands::execute_ground(&spec, &conf, &config).await
            }
            Commands::Run { suite, .. } => commands::execute_run(&suite, &config).await,
            Commands::Config => {
                commands::execute_config(&config);
                Ok(())
            }
        }
    });

    if let Err(err) = result {
        eprintln!("{}", contextual_report(&err, operation));
        return Err(exit_code_for(&err, ExitCode::INTERNAL));
    }
    Ok(())
}

/// Overrides collected from global and subcommand flags
fn cli_args_for(cli: &Cli) -> CliArgs {
    let mut args = CliArgs {
        config_path: cli.config.clone(),
        verbose: Some(cli.verbose),
        experiment_name: cli.experiment.clone(),
        enable_csv_stats: cli.csv_stats.then_some(true),
        ..CliArgs::default()
    };

    match &cli.command {
        Commands::Ground {
            endpoint, out_dir, ..
        } => {
            args.endpoint = endpoint.clone();
            args.grounding_output_dir = out_dir.clone();
        }
        Commands::Run {
            target_dir,
            class_name,
            package,
            harness_timeout,
            ..
        } => {
            args.target_dir = target_dir.clone();
            args.test_class_name = class_name.clone();
            args.package_name = package.clone();
            args.harness_timeout_secs = *harness_timeout;
        }
        Commands::GenerateConfig { .. } | Commands::Config => {}
    }
    args
}

/// Typed errors carry their own exit code; anything else gets `fallback`
fn exit_code_for(err: &anyhow::Error, fallback: ExitCode) -> ExitCode {
    err.downcast_ref::<ApiProbeError>()
        .map_or(fallback, ApiProbeError::to_exit_code)
}
