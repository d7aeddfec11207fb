//! Runs an accepted command through the user's shell.
//!
//! The command text is handed to `sh -c` verbatim. Both output streams are
//! captured and then echoed to the operator; nothing about the command's
//! meaning is inspected.

use crate::error::{Result, ShellError};
use colored::Colorize;
use std::io::Write;
use std::process::{Command, Output};
use tracing::{error, info};

/// Captured streams of a successful run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait for running a shell command line.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command_line: &str) -> std::io::Result<Output>;
}

/// Default process runner using `sh -c`.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, command_line: &str) -> std::io::Result<Output> {
        Command::new("sh").arg("-c").arg(command_line).output()
    }
}

pub struct Executor {
    runner: Box<dyn ProcessRunner>,
}

impl Executor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemProcessRunner))
    }

    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Executes `command_line` and reports its output to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Execution`] when the command exits
    /// unsuccessfully (after both streams have been shown), or
    /// [`ShellError::Io`] when the shell cannot be spawned.
    pub fn run<W: Write>(&self, command_line: &str, output: &mut W) -> Result<ExecutionOutput> {
        info!("Executing command: {}", command_line);
        let result = self.runner.run(command_line)?;
        Self::handle_output(&result, output)
    }

    fn handle_output<W: Write>(result: &Output, output: &mut W) -> Result<ExecutionOutput> {
        let stdout = String::from_utf8_lossy(&result.stdout).to_string();
        let stderr = String::from_utf8_lossy(&result.stderr).to_string();

        if result.status.success() {
            if !stdout.is_empty() {
                writeln!(output, "\n{}", "Command Output:".green().bold())?;
                write!(output, "{}", stdout)?;
            }
            if !stderr.is_empty() {
                writeln!(output, "\n{}", "Command Error Output:".yellow().bold())?;
                write!(output, "{}", stderr)?;
            }
            info!("Command executed successfully");
            Ok(ExecutionOutput { stdout, stderr })
        } else {
            let err = ShellError::Execution {
                code: result.status.code(),
                stdout,
                stderr,
            };
            error!("Command execution failed: {}", err);
            Self::report_failure(&err, output)?;
            Err(err)
        }
    }

    fn report_failure<W: Write>(err: &ShellError, output: &mut W) -> Result<()> {
        writeln!(output, "\n{}", err.to_string().red().bold())?;
        if let ShellError::Execution { stdout, stderr, .. } = err {
            if !stdout.is_empty() {
                writeln!(output, "{}", "Output:".bold())?;
                write!(output, "{}", stdout)?;
            }
            if !stderr.is_empty() {
                writeln!(output, "{}", "Error output:".red())?;
                write!(output, "{}", stderr)?;
            }
        }
        Ok(())
    }
}

/// Wraps `text` in single quotes so a POSIX shell takes it literally.
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}
