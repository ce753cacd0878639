use serde::{Deserialize, Serialize};

/// Named stages measured by the [`StageTimer`](crate::timer::StageTimer).
///
/// `TestStep` identifies the portion of a pipeline run a duration belongs to.
/// The string form is the snake_case name used in timing CSV exports and logs.
///
/// # Example
///
/// ```rust
/// use apiprobe_utils::types::TestStep;
///
/// assert_eq!(TestStep::TestSuiteExecution.as_str(), "test_suite_execution");
/// assert_eq!("test_suite_building".parse::<TestStep>().unwrap(), TestStep::TestSuiteBuilding);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TestStep {
    /// Test-case generation.
    TestSuiteGeneration,
    /// Serializing test cases to the generated artifact.
    TestSuiteWriting,
    /// Compiling and loading the generated artifact.
    TestSuiteBuilding,
    /// Running the built unit through the harness.
    TestSuiteExecution,
}

impl TestStep {
    /// Canonical snake_case name of the step.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TestSuiteGeneration => "test_suite_generation",
            Self::TestSuiteWriting => "test_suite_writing",
            Self::TestSuiteBuilding => "test_suite_building",
            Self::TestSuiteExecution => "test_suite_execution",
        }
    }
}

/// Source of a configuration value.
///
/// Indicates where a configuration value originated from in the precedence chain:
/// CLI arguments > config file > programmatic overrides > built-in defaults.
///
/// # Serialization
///
/// Serializes to lowercase strings: `"cli"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Config => write!(f, "config"),
            Self::Programmatic => write!(f, "programmatic"),
            Self::Default => write!(f, "default"),
        }
    }
}
