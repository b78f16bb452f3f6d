//! Captured execution of external commands.

use std::path::Path;
use std::process::Command;

use crate::error::{ReleaseError, Result};

/// Result of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful outcome with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            succeeded: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed outcome with the given stderr
    pub fn failure(stderr: impl Into<String>) -> Self {
        CommandOutput {
            succeeded: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Converts a failed outcome into a [`ReleaseError::Tool`] for `command`.
    pub fn into_result(self, command: &str) -> Result<CommandOutput> {
        if self.succeeded {
            Ok(self)
        } else {
            Err(ReleaseError::tool(command, self.stderr.trim_end()))
        }
    }
}

/// Runs `argv` in `cwd` and captures its output.
///
/// A non-zero exit is reported through [`CommandOutput::succeeded`]; only a
/// failure to spawn the program is an error.
pub fn run(argv: &[String], cwd: &Path) -> Result<CommandOutput> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ReleaseError::config("empty command"))?;

    tracing::debug!(command = %argv.join(" "), cwd = %cwd.display(), "running command");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| ReleaseError::tool(argv.join(" "), e.to_string()))?;

    let result = CommandOutput {
        succeeded: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    tracing::debug!(
        command = %argv.join(" "),
        status = ?output.status.code(),
        "command finished"
    );

    Ok(result)
}

/// Convenience wrapper around [`run`] for string literals.
pub fn run_args(program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
    let argv: Vec<String> = std::iter::once(program)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect();
    run(&argv, cwd)
}
