//! Logging and observability infrastructure for apiprobe
//!
//! This module provides tracing initialization plus structured helpers for
//! pipeline stage start/complete/error events.

use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize tracing subscriber for structured logging
///
/// Sets up tracing with either compact (default) or verbose format.
/// `RUST_LOG` takes precedence over both defaults.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("apiprobe=debug,info")
            } else {
                EnvFilter::try_new("apiprobe=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span for one pipeline stage
pub fn stage_span(unit: &str, stage: &str) -> tracing::Span {
    span!(Level::INFO, "pipeline_stage", unit = %unit, stage = %stage)
}

/// Log stage start with structured fields
pub fn log_stage_start(unit: &str, stage: &str) {
    info!(unit = %unit, stage = %stage, "Starting stage");
}

/// Log stage completion with duration
pub fn log_stage_complete(unit: &str, stage: &str, duration_ms: u128) {
    info!(
        unit = %unit,
        stage = %stage,
        duration_ms = %duration_ms,
        "Stage completed"
    );
}

/// Log stage error with context
pub fn log_stage_error(unit: &str, stage: &str, error: &str, duration_ms: u128) {
    error!(
        unit = %unit,
        stage = %stage,
        duration_ms = %duration_ms,
        error = %error,
        "Stage failed"
    );
}
