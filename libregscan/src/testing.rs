//! Test doubles for the executor and provider seams.

use crate::digest::ProviderDigest;
use crate::error::{Result, ScanError};
use crate::executor::{CommandExecutor, CommandOutput};
use crate::model::{
    BatchGetImageOutput, Image, ImageDetail, ImageFailure, ImageIdentifier, RegistryId,
    Repository,
};
use crate::service::RegistryService;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Executor answering by longest matching command prefix and recording calls.
pub struct MockExecutor {
    rules: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, prefix: &str, exit_code: i32, stdout: &str) -> Self {
        self.rules
            .push((prefix.to_string(), CommandOutput::new(exit_code, stdout)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.to_string());
        let matched = self
            .rules
            .iter()
            .filter(|(prefix, _)| command.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len());
        match matched {
            Some((_, output)) => Ok(output.clone()),
            None => Ok(CommandOutput::new(127, "")),
        }
    }
}

/// Scripted provider keyed by registry display name and repository name.
#[derive(Default)]
pub struct MockService {
    repositories: HashMap<String, Vec<Repository>>,
    failing_registries: HashSet<String>,
    details: HashMap<(String, String), Vec<ImageDetail>>,
    failing_repositories: HashSet<String>,
    manifests: HashMap<String, (Option<String>, String)>,
    missing_images: HashSet<String>,
    pub batch_calls: Mutex<Vec<(String, String, Vec<ImageIdentifier>)>>,
    pub describe_images_calls: Mutex<Vec<String>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository named `name` to `registry` ("default" for the default one).
    pub fn repository(mut self, registry: &str, name: &str, uri: &str) -> Self {
        self.repositories
            .entry(registry.to_string())
            .or_default()
            .push(Repository {
                repository_name: name.to_string(),
                repository_uri: uri.to_string(),
                registry_id: None,
            });
        self
    }

    pub fn failing_registry(mut self, registry: &str) -> Self {
        self.failing_registries.insert(registry.to_string());
        self
    }

    pub fn failing_repository(mut self, name: &str) -> Self {
        self.failing_repositories.insert(name.to_string());
        self
    }

    /// Adds an image to `repository`, as listed when scanning `scope`.
    ///
    /// `owner` is the account id the provider reports for the image.
    #[allow(clippy::too_many_arguments)]
    pub fn image(
        mut self,
        scope: &str,
        owner: &str,
        repository: &str,
        digest: &str,
        tags: &[&str],
        echoed_tag: Option<&str>,
        manifest: &str,
    ) -> Self {
        self.details
            .entry((scope.to_string(), repository.to_string()))
            .or_default()
            .push(ImageDetail {
                registry_id: owner.to_string(),
                repository_name: repository.to_string(),
                image_digest: ProviderDigest::new(digest),
                image_tags: tags.iter().map(|t| t.to_string()).collect(),
                image_pushed_at: None,
                image_size_in_bytes: Some(1024),
            });
        self.manifests.insert(
            digest.to_string(),
            (echoed_tag.map(str::to_string), manifest.to_string()),
        );
        self
    }

    /// Makes the batch lookup report `digest` as a per-image failure.
    pub fn missing_image(mut self, digest: &str) -> Self {
        self.missing_images.insert(digest.to_string());
        self
    }
}

#[async_trait]
impl RegistryService for MockService {
    async fn describe_repositories(&self, registry: &RegistryId) -> Result<Vec<Repository>> {
        let key = registry.to_string();
        if self.failing_registries.contains(&key) {
            return Err(ScanError::provider(
                format!("registry {}", key),
                "RegistryNotFound",
            ));
        }
        Ok(self.repositories.get(&key).cloned().unwrap_or_default())
    }

    async fn describe_images(
        &self,
        registry: &RegistryId,
        repository: &str,
    ) -> Result<Vec<ImageDetail>> {
        self.describe_images_calls
            .lock()
            .unwrap()
            .push(repository.to_string());
        if self.failing_repositories.contains(repository) {
            return Err(ScanError::provider(
                format!("repository {}", repository),
                "AccessDenied",
            ));
        }
        Ok(self
            .details
            .get(&(registry.to_string(), repository.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn batch_get_image(
        &self,
        registry: &RegistryId,
        repository: &str,
        image_ids: &[ImageIdentifier],
    ) -> Result<BatchGetImageOutput> {
        self.batch_calls.lock().unwrap().push((
            registry.to_string(),
            repository.to_string(),
            image_ids.to_vec(),
        ));

        let mut output = BatchGetImageOutput::default();
        for id in image_ids {
            let digest = id.image_digest.clone().unwrap_or_default();
            if self.missing_images.contains(&digest) {
                output.failures.push(ImageFailure {
                    image_id: id.clone(),
                    failure_code: Some("ImageNotFound".to_string()),
                    failure_reason: Some("Requested image not found".to_string()),
                });
                continue;
            }
            if let Some((tag, manifest)) = self.manifests.get(&digest) {
                output.images.push(Image {
                    registry_id: registry.as_account().unwrap_or_default().to_string(),
                    repository_name: repository.to_string(),
                    image_id: ImageIdentifier {
                        image_digest: Some(digest.clone()),
                        image_tag: tag.clone(),
                    },
                    image_manifest: manifest.clone(),
                });
            }
        }
        Ok(output)
    }
}

/// Builds a Docker v2 manifest whose config digest is `config_hex`.
pub fn manifest_with_config(config_hex: &str) -> String {
    format!(
        r#"{{"schemaVersion":2,"mediaType":"application/vnd.docker.distribution.manifest.v2+json","config":{{"mediaType":"application/vnd.docker.container.image.v1+json","size":1469,"digest":"sha256:{}"}},"layers":[{{"mediaType":"application/vnd.docker.image.rootfs.diff.tar.gzip","size":2811478,"digest":"sha256:95871a41108917a5c23932b5bc425cbd6bd3db6c232b5f413d6ef4d6e658d95e"}}]}}"#,
        config_hex
    )
}

/// A 64-character hex string made of `c` repeated.
pub fn hex_of(c: char) -> String {
    std::iter::repeat_n(c, 64).collect()
}

/// Provider whose answers change between enumeration runs.
///
/// Serves `runs[0]` until [`SequencedService::advance`] is called, then the
/// next one; the last run keeps being served.
pub struct SequencedService {
    runs: Vec<MockService>,
    current: AtomicUsize,
}

impl SequencedService {
    pub fn new(runs: Vec<MockService>) -> Self {
        Self {
            runs,
            current: AtomicUsize::new(0),
        }
    }

    pub fn advance(&self) {
        let last = self.runs.len().saturating_sub(1);
        let next = (self.current.load(Ordering::SeqCst) + 1).min(last);
        self.current.store(next, Ordering::SeqCst);
    }

    fn run(&self) -> &MockService {
        &self.runs[self.current.load(Ordering::SeqCst)]
    }
}

#[async_trait]
impl RegistryService for SequencedService {
    async fn describe_repositories(&self, registry: &RegistryId) -> Result<Vec<Repository>> {
        self.run().describe_repositories(registry).await
    }

    async fn describe_images(
        &self,
        registry: &RegistryId,
        repository: &str,
    ) -> Result<Vec<ImageDetail>> {
        self.run().describe_images(registry, repository).await
    }

    async fn batch_get_image(
        &self,
        registry: &RegistryId,
        repository: &str,
        image_ids: &[ImageIdentifier],
    ) -> Result<BatchGetImageOutput> {
        self.run().batch_get_image(registry, repository, image_ids).await
    }
}
