//! Registry manager.
//!
//! Owns the backends enabled by configuration and runs each operation over
//! all of them in turn. When remote scanning is disabled the manager holds
//! no backends, so every operation does nothing.

use crate::auth::LoginReport;
use crate::backend::{EcrBackend, PullSummary, RegistryBackend, RemoteRegistry};
use crate::config::Config;
use crate::enumerator::Enumeration;
use crate::error::{Result, ScanError};
use crate::executor::{CommandExecutor, SystemExecutor};
use std::sync::Arc;
use tracing::{debug, error, info, warn};


/// Result of one operation on one backend.
#[derive(Debug)]
pub struct BackendOutcome<T> {
    pub backend: &'static str,
    pub outcome: T,
}

pub struct RegistryManager {
    backends: Vec<RegistryBackend>,
}

impl RegistryManager {
    /// Creates the manager with commands run through the system shell.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_executor(config, Arc::new(SystemExecutor::new()))
    }

    /// Creates the manager with an explicit command executor.
    pub fn with_executor(config: &Config, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let remote = &config.remote;
        if !remote.enabled {
            debug!("remote registry scanning is disabled");
            return Ok(Self::with_backends(Vec::new()));
        }

        let mut backends = Vec::new();
        if remote.ecr.enabled {
            backends.push(RegistryBackend::Ecr(EcrBackend::from_config(
                remote, executor,
            )?));
        }

        if backends.is_empty() {
            warn!("remote registry scanning is enabled but no backend is configured");
        }
        Ok(Self::with_backends(backends))
    }

    pub fn with_backends(backends: Vec<RegistryBackend>) -> Self {
        Self { backends }
    }

    /// True when at least one backend is active.
    pub fn is_active(&self) -> bool {
        !self.backends.is_empty()
    }

    pub fn backends(&self) -> &[RegistryBackend] {
        &self.backends
    }

    pub fn backends_mut(&mut self) -> &mut [RegistryBackend] {
        &mut self.backends
    }

    /// Reports whether each backend's tooling is installed.
    pub async fn check_tooling(&self) -> Vec<BackendOutcome<bool>> {
        let mut outcomes = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            outcomes.push(BackendOutcome {
                backend: backend.name(),
                outcome: backend.is_tooling_available().await,
            });
        }
        outcomes
    }

    /// Logs every backend in. A backend whose tooling is missing is
    /// reported as [`ScanError::ToolingMissing`] and not contacted.
    pub async fn login_all(&mut self) -> Vec<BackendOutcome<Result<LoginReport>>> {
        let mut outcomes = Vec::with_capacity(self.backends.len());
        for backend in &mut self.backends {
            let outcome = match require_tooling(backend).await {
                Ok(()) => Ok(backend.login_report().await),
                Err(e) => Err(e),
            };
            outcomes.push(BackendOutcome {
                backend: backend.name(),
                outcome,
            });
        }
        outcomes
    }

    /// Enumerates every backend. A backend whose tooling is missing is
    /// reported as [`ScanError::ToolingMissing`] and not enumerated.
    pub async fn enumerate_all(&mut self) -> Vec<BackendOutcome<Result<Enumeration>>> {
        let mut outcomes = Vec::with_capacity(self.backends.len());
        for backend in &mut self.backends {
            let outcome = match require_tooling(backend).await {
                Ok(()) => Ok(backend.enumerate_with_report().await),
                Err(e) => Err(e),
            };
            outcomes.push(BackendOutcome {
                backend: backend.name(),
                outcome,
            });
        }
        outcomes
    }

    /// Pulls images from every backend, one backend after the other.
    pub async fn pull_all(&mut self) -> Vec<BackendOutcome<Result<PullSummary>>> {
        let mut outcomes = Vec::with_capacity(self.backends.len());
        for backend in &mut self.backends {
            info!(backend = backend.name(), "pulling remote images");
            outcomes.push(BackendOutcome {
                backend: backend.name(),
                outcome: backend.pull().await,
            });
        }
        outcomes
    }

    /// Removes everything pulled so far and returns the total removed.
    pub async fn remove_all_pulled(&mut self) -> usize {
        let mut removed = 0;
        for backend in &mut self.backends {
            removed += backend.remove().await;
        }
        removed
    }
}

async fn require_tooling(backend: &RegistryBackend) -> Result<()> {
    if backend.is_tooling_available().await {
        return Ok(());
    }
    error!(backend = backend.name(), "provider tooling is not available, skipping backend");
    Err(ScanError::tooling_missing(backend.tooling()))
}
