//! Local container engine.
//!
//! Thin wrapper over the `docker` CLI for the three engine operations the
//! pull workflow needs: presence check, pull and removal.

use crate::error::{Result, ScanError};
use crate::executor::{CommandExecutor, with_privilege};
use crate::reference::Reference;
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(test)]
mod tests;

/// Engine CLI binary.
pub const ENGINE_BINARY: &str = "docker";

pub struct ContainerEngine {
    executor: Arc<dyn CommandExecutor>,
    use_sudo: bool,
}

impl ContainerEngine {
    pub fn new(executor: Arc<dyn CommandExecutor>, use_sudo: bool) -> Self {
        Self { executor, use_sudo }
    }

    /// Returns true when `reference` is already present locally.
    pub async fn image_exists(&self, reference: &str) -> bool {
        let Ok(reference) = validated(reference) else {
            return false;
        };
        let command = self.command(&format!("images -q {}", reference));
        match self.executor.execute(&command).await {
            Ok(output) => output.success() && !output.stdout.trim().is_empty(),
            Err(e) => {
                debug!(reference, error = %e, "could not query local images");
                false
            }
        }
    }

    /// Pulls `reference` into the local engine.
    pub async fn pull(&self, reference: &str) -> Result<()> {
        let reference = validated(reference)?;
        info!(reference, "pulling image");
        self.run(&format!("pull {}", reference)).await
    }

    /// Removes `reference` from the local engine.
    pub async fn remove(&self, reference: &str) -> Result<()> {
        let reference = validated(reference)?;
        info!(reference, "removing image");
        self.run(&format!("rmi {}", reference)).await
    }

    async fn run(&self, arguments: &str) -> Result<()> {
        let command = self.command(arguments);
        let output = self.executor.execute(&command).await?;
        if output.success() {
            Ok(())
        } else {
            Err(ScanError::command(
                format!("{} {}: {}", ENGINE_BINARY, arguments, output.stderr.trim()),
                Some(output.exit_code),
            ))
        }
    }

    fn command(&self, arguments: &str) -> String {
        with_privilege(&format!("{} {}", ENGINE_BINARY, arguments), self.use_sudo)
    }
}

/// Parses `reference` so that only well-formed image references reach the
/// shell. The original text is passed on unchanged.
fn validated(reference: &str) -> Result<&str> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(ScanError::validation(format!(
            "Invalid image reference '{}'",
            reference
        )));
    }
    trimmed.parse::<Reference>()?;
    Ok(trimmed)
}
