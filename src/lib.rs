//! apiprobe - black-box test generation and execution for OpenAPI services
//!
//! apiprobe can be used as a CLI or embedded as a library.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Default test configuration for every operation
//! apiprobe generate-config --spec openapi.yaml --out testconf.yaml
//!
//! # Fill semantic parameters from a SPARQL endpoint
//! apiprobe ground --spec openapi.yaml --conf testconf.yaml
//!
//! # Take a stored suite through write, build, execute and report
//! apiprobe run --suite suite.json --class-name ItemsTest
//! ```
//!
//! # Workspace layout
//!
//! - [`apiprobe_openapi`]: API description loading
//! - [`apiprobe_testconf`]: test configuration model and the default rule engine
//! - [`apiprobe_grounding`]: knowledge-base grounding of semantic parameters
//! - [`apiprobe_orchestrator`]: the test pipeline and its collaborators
//! - [`apiprobe_config`]: layered runner configuration
//! - [`apiprobe_utils`]: errors, exit codes, logging, timing and shared sinks
//!
//! # Exit Codes
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | 0 | SUCCESS | Completed successfully |
//! | 1 | INTERNAL | General failure |
//! | 2 | CLI_ARGS | Invalid arguments or configuration |
//! | 3 | UNSUPPORTED_PARAMETER | A query/path parameter has no generator |
//! | 4 | WRITE_FAILURE | An artifact or document could not be written |
//! | 5 | BUILD_FAILURE | The generated artifact could not be built |
//! | 6 | GROUNDING_FAILURE | Grounding could not reach the knowledge base |

pub mod cli;

pub use apiprobe_config::{CliArgs, Config, ConfigSource};
pub use apiprobe_grounding::{GroundingAdapter, GroundingReport};
pub use apiprobe_openapi::{ApiSpec, load_spec};
pub use apiprobe_orchestrator::{
    Collaborators, PipelineOrchestrator, PipelineOutcome, PipelineSettings, TestCase,
};
pub use apiprobe_testconf::{ConfigRuleEngine, Filter, TestConfigurationDocument};
pub use apiprobe_utils::error::{ApiProbeError, UserFriendlyError};
pub use apiprobe_utils::exit_codes::ExitCode;
pub use apiprobe_utils::timer::StageTimer;
pub use apiprobe_utils::types::TestStep;
