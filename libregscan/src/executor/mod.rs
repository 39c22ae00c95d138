//! External command execution.
//!
//! Everything the pipeline does outside the process (tooling checks, the
//! provider authentication request, engine logins, pulls) goes through the
//! [`CommandExecutor`] trait so that it can be replaced in tests.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;


/// Prefix used to run engine commands with elevated privileges.
pub const SUDO_PREFIX: &str = "sudo ";

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code. `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Standard error, decoded lossily as UTF-8.
    pub stderr: String,
}

impl CommandOutput {
    /// Creates an output with the given exit code and stdout.
    pub fn new(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Returns true when the command exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Iterates over stdout line by line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines()
    }
}

/// Runs shell command lines and reports their exit code and output.
///
/// A non-zero exit code is not an error: callers decide what a failure
/// means for their scope. `Err` is reserved for commands that could not be
/// started at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Executes `command` and waits for it to finish.
    async fn execute(&self, command: &str) -> Result<CommandOutput>;

    /// Executes `command` and reports whether it exited with code 0.
    ///
    /// Spawn failures count as unsuccessful.
    async fn is_successful(&self, command: &str) -> bool {
        match self.execute(command).await {
            Ok(output) => output.success(),
            Err(e) => {
                debug!(command, error = %e, "command could not be executed");
                false
            }
        }
    }
}

/// Executor backed by the platform shell.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        debug!(command = %redact(command), "executing command");

        let output = Self::shell_command(command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ScanError::command_with_source(
                    format!("Failed to start command: {}", redact(command)),
                    e,
                )
            })?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(exit_code = result.exit_code, "command finished");
        Ok(result)
    }
}

/// Prepends the privilege-elevation prefix when requested on Unix hosts.
///
/// # Examples
///
/// ```
/// use libregscan::executor::with_privilege;
///
/// let cmd = with_privilege("docker pull alpine:3", false);
/// assert_eq!(cmd, "docker pull alpine:3");
/// ```
pub fn with_privilege(command: &str, use_sudo: bool) -> String {
    if use_sudo && cfg!(unix) {
        format!("{}{}", SUDO_PREFIX, command)
    } else {
        command.to_string()
    }
}

/// Masks the value following `-p`/`--password` so secrets never reach logs.
///
/// # Examples
///
/// ```
/// use libregscan::executor::redact;
///
/// let line = "docker login -u AWS -p s3cr3t https://111.dkr.ecr.us-east-1.amazonaws.com";
/// assert_eq!(
///     redact(line),
///     "docker login -u AWS -p ***** https://111.dkr.ecr.us-east-1.amazonaws.com"
/// );
/// ```
pub fn redact(command: &str) -> String {
    let mut hide_next = false;
    command
        .split_whitespace()
        .map(|token| {
            if hide_next {
                hide_next = false;
                "*****"
            } else {
                hide_next = token == "-p" || token == "--password";
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
