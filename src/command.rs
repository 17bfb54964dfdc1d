//! External command execution.
//!
//! The engine shells out twice: `npm ls --all --json` for the installed
//! dependency tree and `npm pkg get name version` for the instrumented
//! package's identity. Both go through [`CommandBridge`] so tests can supply
//! canned output.

use std::path::Path;
use std::process::{Command, Stdio};

/// Errors raised while launching a command.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a whitespace-separated command line in a working directory.
pub trait CommandBridge: Send + Sync {
    fn run(&self, command: &str, cwd: &Path) -> Result<CommandOutput, CommandError>;
}

/// [`CommandBridge`] backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandBridge;

impl CommandBridge for ProcessCommandBridge {
    fn run(&self, command: &str, cwd: &Path) -> Result<CommandOutput, CommandError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(CommandError::Empty)?;

        tracing::debug!(command, cwd = %cwd.display(), "running command");
        let output = Command::new(program)
            .args(parts)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| CommandError::Spawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command() {
        let err = ProcessCommandBridge.run("   ", Path::new(".")).unwrap_err();
        assert!(matches!(err, CommandError::Empty));
    }

    #[test]
    fn test_missing_program() {
        let err = ProcessCommandBridge
            .run("usagescope-definitely-not-a-program --flag", Path::new("."))
            .unwrap_err();
        assert!(err.to_string().contains("usagescope-definitely-not-a-program"));
    }

    #[test]
    fn test_output_success() {
        assert!(CommandOutput::default().success());
        let failed = CommandOutput {
            exit_code: 1,
            ..CommandOutput::default()
        };
        assert!(!failed.success());
    }
}
