//! Test pipeline orchestration for apiprobe
//!
//! [`PipelineOrchestrator`] takes a test suite through generation, artifact
//! writing, building, execution and reporting. Every stage is delegated to a
//! collaborator trait from [`collaborators`]; this crate also ships default
//! implementations that replay JSON suites and drive configured commands:
//!
//! - [`SuiteFileGenerator`] / [`JsonSuiteWriter`]: JSON test suites
//! - [`CommandBuilder`] / [`CommandHarness`]: subprocess build and execution
//! - [`ResultsDirectoryObserver`]: per-case records in the report sink
//! - [`CommandReportRenderer`] / [`CoverageStatsRenderer`]: reports
//!
//! Fatal stages (generation, writing, building) end a run with an error.
//! Harness and report failures are logged and returned in the
//! [`PipelineOutcome`], and the run still completes.

pub mod collaborators;
pub mod command;
mod coverage;
mod observer;
mod orchestrator;
mod process;
mod report;
mod state;
pub mod stats;
mod suite;
mod test_case;

pub use collaborators::{
    BuiltUnit, CaseOutcome, CaseStatus, ExecutionSummary, ReportRenderer, ResultObserver,
    StatsRenderer, TestCaseGenerator, TestHarness, TestWriter, UnitBuilder,
};
pub use coverage::CoverageMeter;
pub use observer::ResultsDirectoryObserver;
pub use orchestrator::{Collaborators, PipelineOrchestrator, PipelineOutcome, PipelineSettings};
pub use process::{CommandBuilder, CommandHarness};
pub use report::{CommandReportRenderer, CoverageStatsRenderer};
pub use state::PipelineState;
pub use suite::{JsonSuiteWriter, SuiteFileGenerator, TestSuiteFile};
pub use test_case::TestCase;
