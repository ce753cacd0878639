//! Error output for the CLI

use crate::ApiProbeError;

/// Render `err` for the terminal
///
/// Typed errors get their user-facing message, context and suggestions.
/// Anything else is printed with its full cause chain.
pub(crate) fn contextual_report(err: &anyhow::Error, operation: &str) -> String {
    match err.downcast_ref::<ApiProbeError>() {
        Some(typed) => format!("✗ {operation} failed\n\n{}", typed.display_for_user()),
        None => format!("✗ Unexpected error during {operation}: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_utils::error::{ConfigError, PipelineError};

    #[test]
    fn test_typed_errors_include_suggestions() {
        let err = anyhow::Error::new(ApiProbeError::Config(ConfigError::InvalidFile {
            path: ".apiprobe/config.toml".to_string(),
            reason: "unknown field `bogus`".to_string(),
        }));
        let report = contextual_report(&err, "config");
        assert!(report.starts_with("✗ config failed"));
        assert!(report.contains("bogus"));
        assert!(report.contains("Suggestions:"));
    }

    #[test]
    fn test_untyped_errors_show_cause_chain() {
        let err = anyhow::anyhow!("disk full").context("Failed to save suite");
        let report = contextual_report(&err, "run");
        assert!(report.contains("Failed to save suite: disk full"));
    }

    #[test]
    fn test_pipeline_errors_are_typed() {
        let err = anyhow::Error::new(ApiProbeError::from(PipelineError::Generation {
            reason: "suite missing".to_string(),
        }));
        assert!(contextual_report(&err, "run").contains("suite missing"));
    }
}
