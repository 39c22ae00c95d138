//! Registry backends.
//!
//! A backend is one integration with a registry provider. Every backend
//! exposes the same capability surface, [`RemoteRegistry`]; the set of
//! providers is closed and modelled by [`RegistryBackend`], which is chosen
//! once from configuration.

use crate::auth::{AuthenticationSession, LoginReport};
use crate::config::Remote;
use crate::engine::ContainerEngine;
use crate::enumerator::{Enumeration, ImageEnumerator};
use crate::error::{Result, ScanError};
use crate::executor::CommandExecutor;
use crate::filter::ImageFilter;
use crate::model::ImageIdentity;
use crate::reference::Reference;
use crate::service::{AwsCliService, RegistryService};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(test)]
mod tests;

/// Command used to check that the provider CLI is installed.
pub const ECR_TOOLING_CHECK: &str = "aws --version";

/// Outcome of one backend pull run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    /// Images found by enumeration.
    pub found: usize,
    /// Images left after filtering and the image limit.
    pub selected: usize,
    pub pulled: usize,
    /// Images without a pull reference or already present locally.
    pub skipped: usize,
    pub failed: usize,
}

/// Capability surface of a registry provider integration.
#[async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// Short provider name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Provider CLI the backend drives.
    fn tooling(&self) -> &'static str;

    /// Checks that the provider tooling is installed.
    async fn is_tooling_available(&self) -> bool;

    /// Logs the local engine into the provider's registries.
    async fn login_report(&mut self) -> LoginReport;

    async fn login(&mut self) -> bool {
        self.login_report().await.succeeded()
    }

    /// Enumerates images and reports failed scopes.
    async fn enumerate_with_report(&mut self) -> Enumeration;

    async fn enumerate(&mut self) -> HashSet<ImageIdentity> {
        self.enumerate_with_report().await.images
    }

    /// Composes the pull reference of an enumerated image, or returns an
    /// empty string when it is not known.
    fn full_pull_reference(&self, identity: &ImageIdentity) -> String;

    /// Pulls the selected images into the local engine.
    ///
    /// Fails only when the provider tooling is missing.
    async fn pull(&mut self) -> Result<PullSummary>;

    /// Removes every image pulled by this backend and returns how many were
    /// removed.
    async fn remove(&mut self) -> usize;
}

/// Amazon ECR.
pub struct EcrBackend {
    executor: Arc<dyn CommandExecutor>,
    session: AuthenticationSession,
    enumerator: ImageEnumerator,
    engine: ContainerEngine,
    filter: ImageFilter,
    max_images: usize,
    force: bool,
    pulled: Vec<String>,
}

impl EcrBackend {
    /// Creates the backend with the `aws` CLI as provider service.
    pub fn from_config(remote: &Remote, executor: Arc<dyn CommandExecutor>) -> Result<Self> {
        let service = Arc::new(AwsCliService::new(executor.clone()));
        Self::with_service(remote, executor, service)
    }

    /// Creates the backend over an explicit provider service.
    ///
    /// Fails when a pull pattern is not a valid regex.
    pub fn with_service(
        remote: &Remote,
        executor: Arc<dyn CommandExecutor>,
        service: Arc<dyn RegistryService>,
    ) -> Result<Self> {
        let registry_ids = remote.ecr.registry_ids.clone();
        Ok(Self {
            session: AuthenticationSession::new(
                executor.clone(),
                registry_ids.clone(),
                remote.login_sudo,
            ),
            enumerator: ImageEnumerator::new(service, registry_ids),
            engine: ContainerEngine::new(executor.clone(), remote.login_sudo),
            filter: ImageFilter::from_config(&remote.pull)?,
            max_images: remote.pull.max_images,
            force: remote.pull.force,
            pulled: Vec::new(),
            executor,
        })
    }

    /// References pulled since the last removal.
    pub fn pulled(&self) -> &[String] {
        &self.pulled
    }

    /// Applies the filter and the image limit in a stable order.
    fn select(&self, images: HashSet<ImageIdentity>) -> Vec<ImageIdentity> {
        let mut selected: Vec<ImageIdentity> =
            images.into_iter().filter(|i| self.filter.matches(i)).collect();
        selected.sort_by(|a, b| {
            (&a.registry_id, &a.repository, &a.primary_tag, &a.provider_digest).cmp(&(
                &b.registry_id,
                &b.repository,
                &b.primary_tag,
                &b.provider_digest,
            ))
        });
        if self.max_images > 0 {
            selected.truncate(self.max_images);
        }
        selected
    }
}

#[async_trait]
impl RemoteRegistry for EcrBackend {
    fn name(&self) -> &'static str {
        "ecr"
    }

    fn tooling(&self) -> &'static str {
        "aws"
    }

    async fn is_tooling_available(&self) -> bool {
        self.executor.is_successful(ECR_TOOLING_CHECK).await
    }

    async fn login_report(&mut self) -> LoginReport {
        let report = self.session.login_report().await;
        self.enumerator
            .set_default_registry_id(self.session.default_registry_id().map(str::to_string));
        report
    }

    async fn enumerate_with_report(&mut self) -> Enumeration {
        self.enumerator.enumerate_with_report().await
    }

    fn full_pull_reference(&self, identity: &ImageIdentity) -> String {
        self.enumerator.full_pull_reference(identity)
    }

    async fn pull(&mut self) -> Result<PullSummary> {
        if !self.is_tooling_available().await {
            error!(backend = self.name(), "aws CLI is not available, skipping backend");
            return Err(ScanError::tooling_missing(self.tooling()));
        }

        if let Err(e) = self.login_report().await.ensure_succeeded() {
            warn!(backend = self.name(), error = %e, "login failed, pulls will likely fail");
        }

        let images = self.enumerate().await;
        let mut summary = PullSummary {
            found: images.len(),
            ..PullSummary::default()
        };

        let selected = self.select(images);
        summary.selected = selected.len();

        for image in &selected {
            let reference = self.full_pull_reference(image);
            if reference.is_empty() {
                info!(image = %image.label(), "no pull reference, skipping");
                summary.skipped += 1;
                continue;
            }

            if let Err(e) = reference.parse::<Reference>() {
                warn!(reference = %reference, error = %e, "invalid pull reference");
                summary.failed += 1;
                continue;
            }

            if !self.force && self.engine.image_exists(&reference).await {
                info!(reference = %reference, "image already present locally, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.engine.pull(&reference).await {
                Ok(()) => {
                    summary.pulled += 1;
                    self.pulled.push(reference);
                }
                Err(e) => {
                    warn!(reference = %reference, error = %e, "pull failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            backend = self.name(),
            found = summary.found,
            selected = summary.selected,
            pulled = summary.pulled,
            skipped = summary.skipped,
            failed = summary.failed,
            "pull finished"
        );
        Ok(summary)
    }

    async fn remove(&mut self) -> usize {
        let mut removed = 0;
        for reference in std::mem::take(&mut self.pulled) {
            match self.engine.remove(&reference).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(reference = %reference, error = %e, "remove failed"),
            }
        }
        removed
    }
}

/// The closed set of supported providers.
pub enum RegistryBackend {
    Ecr(EcrBackend),
}

impl RegistryBackend {
    fn inner(&self) -> &dyn RemoteRegistry {
        match self {
            RegistryBackend::Ecr(backend) => backend,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RemoteRegistry {
        match self {
            RegistryBackend::Ecr(backend) => backend,
        }
    }
}

#[async_trait]
impl RemoteRegistry for RegistryBackend {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn tooling(&self) -> &'static str {
        self.inner().tooling()
    }

    async fn is_tooling_available(&self) -> bool {
        self.inner().is_tooling_available().await
    }

    async fn login_report(&mut self) -> LoginReport {
        self.inner_mut().login_report().await
    }

    async fn enumerate_with_report(&mut self) -> Enumeration {
        self.inner_mut().enumerate_with_report().await
    }

    fn full_pull_reference(&self, identity: &ImageIdentity) -> String {
        self.inner().full_pull_reference(identity)
    }

    async fn pull(&mut self) -> Result<PullSummary> {
        self.inner_mut().pull().await
    }

    async fn remove(&mut self) -> usize {
        self.inner_mut().remove().await
    }
}
