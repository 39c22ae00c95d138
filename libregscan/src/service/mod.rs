//! Registry provider service.
//!
//! [`RegistryService`] is the seam to the provider's repository listing,
//! image listing and batch image lookup. [`AwsCliService`] implements it for
//! Amazon ECR on top of the `aws` CLI, which handles credentials, regions
//! and pagination for us.

use crate::error::{Result, ScanError};
use crate::executor::CommandExecutor;
use crate::model::{BatchGetImageOutput, ImageDetail, ImageIdentifier, RegistryId, Repository};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;


/// Provider calls used by the enumeration pipeline.
#[async_trait]
pub trait RegistryService: Send + Sync {
    /// Lists every repository in `registry`.
    async fn describe_repositories(&self, registry: &RegistryId) -> Result<Vec<Repository>>;

    /// Lists image details of `repository` in `registry`.
    async fn describe_images(
        &self,
        registry: &RegistryId,
        repository: &str,
    ) -> Result<Vec<ImageDetail>>;

    /// Fetches images (with manifests) for the given identifiers.
    ///
    /// Per-image failures are reported in the output, not as `Err`.
    async fn batch_get_image(
        &self,
        registry: &RegistryId,
        repository: &str,
        image_ids: &[ImageIdentifier],
    ) -> Result<BatchGetImageOutput>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeRepositoriesResponse {
    #[serde(default)]
    repositories: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeImagesResponse {
    #[serde(default)]
    image_details: Vec<ImageDetail>,
}

/// Amazon ECR through `aws ecr ... --output json`.
pub struct AwsCliService {
    executor: Arc<dyn CommandExecutor>,
}

impl AwsCliService {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    async fn run<T: DeserializeOwned>(&self, scope: &str, command: String) -> Result<T> {
        debug!(scope, command = %command, "calling provider");
        let output = self.executor.execute(&command).await?;

        if !output.success() {
            let detail = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            return Err(ScanError::provider(
                scope,
                format!("exit code {}: {}", output.exit_code, detail),
            ));
        }

        serde_json::from_str(&output.stdout).map_err(|e| {
            ScanError::provider_with_source(scope, "Failed to parse provider response", e)
        })
    }
}

#[async_trait]
impl RegistryService for AwsCliService {
    async fn describe_repositories(&self, registry: &RegistryId) -> Result<Vec<Repository>> {
        let scope = format!("registry {}", registry);
        let mut command = String::from("aws ecr describe-repositories");
        push_registry_arg(&mut command, registry, &scope)?;
        command.push_str(" --output json");

        let response: DescribeRepositoriesResponse = self.run(&scope, command).await?;
        Ok(response.repositories)
    }

    async fn describe_images(
        &self,
        registry: &RegistryId,
        repository: &str,
    ) -> Result<Vec<ImageDetail>> {
        let scope = format!("repository {} on registry {}", repository, registry);
        let mut command = format!(
            "aws ecr describe-images --repository-name {}",
            shell_safe(repository, &scope)?
        );
        push_registry_arg(&mut command, registry, &scope)?;
        command.push_str(" --output json");

        let response: DescribeImagesResponse = self.run(&scope, command).await?;
        Ok(response.image_details)
    }

    async fn batch_get_image(
        &self,
        registry: &RegistryId,
        repository: &str,
        image_ids: &[ImageIdentifier],
    ) -> Result<BatchGetImageOutput> {
        let scope = format!("images of {} on registry {}", repository, registry);
        let mut command = format!(
            "aws ecr batch-get-image --repository-name {}",
            shell_safe(repository, &scope)?
        );
        push_registry_arg(&mut command, registry, &scope)?;

        command.push_str(" --image-ids");
        for id in image_ids {
            let mut parts = Vec::new();
            if let Some(digest) = id.image_digest.as_deref().filter(|d| !d.trim().is_empty()) {
                parts.push(format!("imageDigest={}", shell_safe(digest, &scope)?));
            }
            if let Some(tag) = id.image_tag.as_deref().filter(|t| !t.trim().is_empty()) {
                parts.push(format!("imageTag={}", shell_safe(tag, &scope)?));
            }
            if !parts.is_empty() {
                command.push(' ');
                command.push_str(&parts.join(","));
            }
        }
        command.push_str(" --output json");

        self.run(&scope, command).await
    }
}

fn push_registry_arg(command: &mut String, registry: &RegistryId, scope: &str) -> Result<()> {
    if let Some(id) = registry.as_account() {
        command.push_str(" --registry-id ");
        command.push_str(shell_safe(id, scope)?);
    }
    Ok(())
}

/// Rejects values that would need shell quoting.
///
/// Registry ids, repository names, tags and digests never contain such
/// characters when they come from the provider.
fn shell_safe<'a>(value: &'a str, scope: &str) -> Result<&'a str> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._-/:@".contains(c));
    if ok {
        Ok(value)
    } else {
        Err(ScanError::provider(
            scope,
            format!("refusing to pass unsafe value '{}' to the provider CLI", value),
        ))
    }
}
