//! Typed errors shared by every apiprobe crate
//!
//! Each domain enum implements [`UserFriendlyError`]; [`ApiProbeError`] wraps
//! them and maps to a CLI [`ExitCode`](crate::exit_codes::ExitCode).

use std::fmt;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `ApiProbeError` is the primary error type returned by apiprobe library operations.
/// It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Runner configuration file or CLI argument errors |
/// | `TestConf` | Test configuration generation and loading errors |
/// | `Pipeline` | Fatal pipeline stage failures (generate, write, build) |
/// | `Grounding` | Knowledge-base query failures |
/// | `Sink` | Best-effort output sinks (CSV, reports) |
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Unsupported parameter type in query or path |
/// | 4 | Artifact or document write failure |
/// | 5 | Build (compile/load) failure |
/// | 6 | Grounding failure |
/// | 1 | Other errors |
///
/// Library code returns `ApiProbeError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum ApiProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Test configuration error: {0}")]
    TestConf(#[from] TestConfError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Grounding error: {0}")]
    Grounding(#[from] GroundingError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    TestConfiguration,
    PipelineExecution,
    Grounding,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::TestConfiguration => write!(f, "Test Configuration"),
            Self::PipelineExecution => write!(f, "Pipeline Execution"),
            Self::Grounding => write!(f, "Grounding"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "Configuration files must be valid TOML with [run], [stats], [reports], [execution] and [grounding] sections.".to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the TOML syntax and section names".to_string(),
                "Run 'apiprobe config' without the file to see the accepted keys".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "test_class_name" | "package_name" => vec![
                    "Use letters, digits and underscores only, starting with a letter".to_string(),
                ],
                "harness_timeout_secs" | "query_timeout_secs" => {
                    vec!["Use a positive number of seconds".to_string()]
                }
                _ => vec!["Check the documentation for valid values".to_string()],
            },
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Errors raised while building, loading or persisting a test configuration document
#[derive(Error, Debug)]
pub enum TestConfError {
    #[error("The parameter type {resolved_type} is not allowed in query or path (parameter '{parameter}' in {location})")]
    UnsupportedParameterType {
        parameter: String,
        location: String,
        resolved_type: String,
    },

    #[error("Failed to load API specification {path}: {reason}")]
    SpecLoad { path: String, reason: String },

    #[error("Failed to parse test configuration {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to persist test configuration {path}: {reason}")]
    Persist { path: String, reason: String },

    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
}

impl UserFriendlyError for TestConfError {
    fn user_message(&self) -> String {
        match self {
            Self::UnsupportedParameterType {
                parameter,
                location,
                resolved_type,
            } => format!(
                "Parameter '{parameter}' ({location}) has type '{resolved_type}', which has no input generator"
            ),
            Self::SpecLoad { path, reason } => {
                format!("Could not read the API specification at {path}: {reason}")
            }
            Self::Parse { path, reason } => {
                format!("Could not read the test configuration at {path}: {reason}")
            }
            Self::Persist { path, reason } => {
                format!("Could not write the test configuration to {path}: {reason}")
            }
            Self::InvalidFilter { filter, reason } => {
                format!("Filter '{filter}' is not valid: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::UnsupportedParameterType { .. } => Some(
                "Query and path parameters must be string, number, integer, boolean, an enumeration, or an array of those.".to_string(),
            ),
            Self::InvalidFilter { .. } => Some(
                "Filters use the form PATH:METHOD[,METHOD...] where PATH may be '*' for every path.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnsupportedParameterType { .. } => vec![
                "Exclude the operation with a --filter".to_string(),
                "Declare a primitive type or an enum for the parameter".to_string(),
            ],
            Self::SpecLoad { .. } => vec![
                "Check that the file exists and is valid YAML or JSON".to_string(),
            ],
            Self::Parse { .. } => vec![
                "Regenerate the configuration with 'apiprobe generate-config'".to_string(),
            ],
            Self::Persist { .. } => vec![
                "Check write permissions for the destination directory".to_string(),
            ],
            Self::InvalidFilter { .. } => vec![
                "Example: --filter '/items/{id}:get,delete'".to_string(),
                "Example: --filter '*:get'".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::TestConfiguration
    }
}

/// Errors raised by pipeline stages
///
/// `Generation`, `Write` and `Build` are fatal for a run. `Execution`,
/// `ExecutionTimeout` and `Report` are logged by the orchestrator and do not
/// change the terminal state.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Test case generation failed: {reason}")]
    Generation { reason: String },

    #[error("Failed to write test artifact {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to build test unit {unit}: {reason}")]
    Build { unit: String, reason: String },

    #[error("Harness failed while executing {unit}: {reason}")]
    Execution { unit: String, reason: String },

    #[error("Harness timed out after {timeout_seconds}s while executing {unit}")]
    ExecutionTimeout { unit: String, timeout_seconds: u64 },

    #[error("Report renderer '{renderer}' failed: {reason}")]
    Report { renderer: String, reason: String },
}

impl PipelineError {
    /// Whether this error ends the current run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Generation { .. } | Self::Write { .. } | Self::Build { .. }
        )
    }
}

impl UserFriendlyError for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::Generation { reason } => format!("Could not generate test cases: {reason}"),
            Self::Write { path, reason } => {
                format!("Could not write the test artifact '{path}': {reason}")
            }
            Self::Build { unit, reason } => format!("Could not build '{unit}': {reason}"),
            Self::Execution { unit, reason } => {
                format!("The test harness failed while running '{unit}': {reason}")
            }
            Self::ExecutionTimeout {
                unit,
                timeout_seconds,
            } => format!("Running '{unit}' exceeded the {timeout_seconds}s harness timeout"),
            Self::Report { renderer, reason } => {
                format!("Report generation with '{renderer}' failed: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Build { .. } => Some(
                "The generated artifact is built with [execution].build_command before it runs.".to_string(),
            ),
            Self::ExecutionTimeout { .. } => Some(
                "The harness call is bounded by [execution].harness_timeout_secs.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Generation { .. } => vec!["Check the test suite input file".to_string()],
            Self::Write { .. } => vec![
                "Check write permissions for the target directory".to_string(),
                "Use --target-dir to write elsewhere".to_string(),
            ],
            Self::Build { .. } => vec![
                "Run the build command manually to see its output".to_string(),
                "Run with --verbose for more details".to_string(),
            ],
            Self::Execution { .. } => {
                vec!["Check that the harness command prints a JSON summary".to_string()]
            }
            Self::ExecutionTimeout { .. } => {
                vec!["Increase [execution].harness_timeout_secs".to_string()]
            }
            Self::Report { .. } => vec!["Check [reports].report_command".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::PipelineExecution
    }
}

/// Knowledge-base grounding errors
///
/// These are recovered per parameter: the failing parameter keeps an empty
/// value set and grounding continues.
#[derive(Error, Debug)]
pub enum GroundingError {
    #[error("Cannot build query for parameter '{parameter}' of {operation}: {reason}")]
    QueryBuild {
        operation: String,
        parameter: String,
        reason: String,
    },

    #[error("Query against {endpoint} failed: {reason}")]
    Query { endpoint: String, reason: String },

    #[error("Query against {endpoint} timed out after {timeout_seconds}s")]
    Timeout {
        endpoint: String,
        timeout_seconds: u64,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl UserFriendlyError for GroundingError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Semantic parameters get their values from a SPARQL endpoint configured in [grounding].".to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::QueryBuild { .. } => vec![
                "Add a 'predicates' generator parameter listing predicate IRIs".to_string(),
            ],
            Self::Query { .. } | Self::InvalidResponse { .. } => {
                vec!["Check the endpoint URL with --endpoint".to_string()]
            }
            Self::Timeout { .. } => {
                vec!["Increase [grounding].query_timeout_secs".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Grounding
    }
}

/// Best-effort sink failures (CSV exports, grounding value files)
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write sink {path}: {reason}")]
    Write { path: String, reason: String },
}

impl UserFriendlyError for SinkError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        None
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["Check write permissions for the statistics directories".to_string()]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

impl UserFriendlyError for ApiProbeError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::TestConf(e) => e.user_message(),
            Self::Pipeline(e) => e.user_message(),
            Self::Grounding(e) => e.user_message(),
            Self::Sink(e) => e.user_message(),
            Self::Io(e) => format!("File system operation failed: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::TestConf(e) => e.context(),
            Self::Pipeline(e) => e.context(),
            Self::Grounding(e) => e.context(),
            Self::Sink(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::TestConf(e) => e.suggestions(),
            Self::Pipeline(e) => e.suggestions(),
            Self::Grounding(e) => e.suggestions(),
            Self::Sink(e) => e.suggestions(),
            Self::Io(_) => vec!["Check file permissions and available disk space".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::TestConf(e) => e.category(),
            Self::Pipeline(e) => e.category(),
            Self::Grounding(e) => e.category(),
            Self::Sink(e) => e.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl ApiProbeError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apiprobe_utils::error::{ApiProbeError, ConfigError};
    ///
    /// let err = ApiProbeError::Config(ConfigError::InvalidValue {
    ///     key: "package_name".to_string(),
    ///     value: "must be a dotted identifier".to_string(),
    /// });
    /// let message = err.display_for_user();
    /// assert!(message.contains("package_name"));
    /// assert!(message.contains("Suggestions:"));
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apiprobe_utils::error::{ApiProbeError, PipelineError};
    /// use apiprobe_utils::exit_codes::ExitCode;
    ///
    /// let err = ApiProbeError::Pipeline(PipelineError::Build {
    ///     unit: "probe.ItemsTest".to_string(),
    ///     reason: "exit status 1".to_string(),
    /// });
    /// assert_eq!(err.to_exit_code(), ExitCode::BUILD_FAILURE);
    /// ```
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::TestConf(err) => match err {
                TestConfError::UnsupportedParameterType { .. } => {
                    ExitCode::UNSUPPORTED_PARAMETER
                }
                TestConfError::InvalidFilter { .. } => ExitCode::CLI_ARGS,
                TestConfError::Persist { .. } => ExitCode::WRITE_FAILURE,
                TestConfError::SpecLoad { .. } | TestConfError::Parse { .. } => {
                    ExitCode::INTERNAL
                }
            },
            Self::Pipeline(err) => match err {
                PipelineError::Write { .. } => ExitCode::WRITE_FAILURE,
                PipelineError::Build { .. } => ExitCode::BUILD_FAILURE,
                _ => ExitCode::INTERNAL,
            },
            Self::Grounding(_) => ExitCode::GROUNDING_FAILURE,
            Self::Sink(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn test_unsupported_parameter_maps_to_dedicated_exit_code() {
        let err = ApiProbeError::from(TestConfError::UnsupportedParameterType {
            parameter: "filter".to_string(),
            location: "query".to_string(),
            resolved_type: "object".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::UNSUPPORTED_PARAMETER);
        assert!(err.to_string().contains("object"));
        assert_eq!(err.category(), ErrorCategory::TestConfiguration);
    }

    #[test]
    fn test_fatal_pipeline_errors() {
        assert!(
            PipelineError::Write {
                path: "a".into(),
                reason: "b".into()
            }
            .is_fatal()
        );
        assert!(
            PipelineError::Build {
                unit: "a".into(),
                reason: "b".into()
            }
            .is_fatal()
        );
        assert!(
            !PipelineError::ExecutionTimeout {
                unit: "a".into(),
                timeout_seconds: 3
            }
            .is_fatal()
        );
        assert!(
            !PipelineError::Report {
                renderer: "a".into(),
                reason: "b".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_display_for_user_includes_context_and_suggestions() {
        let err = ApiProbeError::from(PipelineError::ExecutionTimeout {
            unit: "probe.ItemsTest".to_string(),
            timeout_seconds: 30,
        });
        let message = err.display_for_user();
        assert!(message.starts_with("Error: "));
        assert!(message.contains("Context:"));
        assert!(message.contains("harness_timeout_secs"));
    }

    #[test]
    fn test_config_errors_map_to_cli_args() {
        let err = ApiProbeError::from(ConfigError::InvalidValue {
            key: "package_name".to_string(),
            value: "1bad".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
        assert!(!err.suggestions().is_empty());
    }
}
