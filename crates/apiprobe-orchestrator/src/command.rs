//! Configured command lines executed without a shell
//!
//! Command strings from configuration are split into argv with shell-style
//! quoting rules, placeholders are substituted per argument, and the program
//! is resolved on `PATH` before spawning. No shell ever sees the string.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Captured result of one command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Last few stderr lines, for error messages
    #[must_use]
    pub fn stderr_tail(&self) -> String {
        let lines: Vec<&str> = self.stderr.lines().collect();
        let start = lines.len().saturating_sub(5);
        lines[start..].join("\n")
    }
}

/// An argv-style command parsed from a configuration string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Split `line` into program and arguments
    ///
    /// # Errors
    /// Returns a description when quoting is unbalanced or the line is blank.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = shell_words::split(line)
            .map_err(|e| format!("cannot parse command '{line}': {e}"))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| "command is empty".to_string())?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Replace every `{key}` in program and arguments
    #[must_use]
    pub fn substitute(&self, vars: &[(&str, &str)]) -> Self {
        let apply = |s: &str| {
            vars.iter().fold(s.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        };
        Self {
            program: apply(&self.program),
            args: self.args.iter().map(|a| apply(a)).collect(),
        }
    }

    /// Locate the program, honouring explicit paths
    ///
    /// # Errors
    /// Returns a description when the program is not on `PATH`.
    pub fn resolve_program(&self) -> Result<PathBuf, String> {
        if self.program.contains(['/', '\\']) {
            return Ok(PathBuf::from(&self.program));
        }
        which::which(&self.program)
            .map_err(|e| format!("'{}' not found on PATH: {e}", self.program))
    }

    /// Spawn, wait and capture output
    ///
    /// The child is killed if the returned future is dropped, so an outer
    /// `tokio::time::timeout` also stops the process.
    ///
    /// # Errors
    /// Returns a description when the program cannot be resolved or spawned.
    pub async fn run(&self) -> Result<CommandOutput, String> {
        let program = self.resolve_program()?;
        let output = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {e}", program.display()))?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// [`CommandLine::run`] bounded by `limit`
    ///
    /// # Errors
    /// Returns a description on spawn failure or when `limit` elapses.
    pub async fn run_with_timeout(&self, limit: Duration) -> Result<CommandOutput, String> {
        match tokio::time::timeout(limit, self.run()).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "'{}' did not finish within {}s",
                self.program,
                limit.as_secs()
            )),
        }
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut words = vec![self.program.as_str()];
        words.extend(self.args.iter().map(String::as_str));
        write!(f, "{}", shell_words::join(words))
    }
}
