//! Exit code constants for apiprobe.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `UNSUPPORTED_PARAMETER` | A query/path parameter has no generator rule |
//! | 4 | `WRITE_FAILURE` | The generated artifact or document could not be written |
//! | 5 | `BUILD_FAILURE` | The generated artifact failed to compile or load |
//! | 6 | `GROUNDING_FAILURE` | The knowledge base could not be used at all |

/// Exit codes matching the documented exit code table.
///
/// # Example
///
/// ```rust
/// use apiprobe_utils::exit_codes::ExitCode;
///
/// let code = ExitCode::BUILD_FAILURE;
/// assert_eq!(code.as_i32(), 5);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// A query or path parameter resolved to a type with no generator rule
    pub const UNSUPPORTED_PARAMETER: ExitCode = ExitCode(3);

    /// Writing the generated artifact or configuration document failed
    pub const WRITE_FAILURE: ExitCode = ExitCode(4);

    /// The generated artifact failed to compile or load
    pub const BUILD_FAILURE: ExitCode = ExitCode(5);

    /// Grounding could not run
    pub const GROUNDING_FAILURE: ExitCode = ExitCode(6);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
