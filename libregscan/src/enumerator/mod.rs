//! Remote image enumeration.
//!
//! The enumerator walks registries, then repositories, then images, and
//! unifies what the provider reports about each image into an
//! [`ImageIdentity`]. While walking it rebuilds the [`LookupTables`] that
//! pull-reference composition reads afterwards.
//!
//! Failures never abort the walk. A registry, repository or image that
//! cannot be read contributes nothing and is recorded as a [`ScopeFailure`].

use crate::config::is_wildcard_registry_id;
use crate::digest::CanonicalDigest;
use crate::error::ScanError;
use crate::manifest::extract_digest;
use crate::model::{Image, ImageDetail, ImageIdentifier, ImageIdentity, LookupTables, RegistryId};
use crate::reference::compose_pull_reference;
use crate::service::RegistryService;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};


/// The unit of work a failure is confined to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureScope {
    Registry(RegistryId),
    Repository {
        registry: RegistryId,
        repository: String,
    },
    Image {
        registry: RegistryId,
        repository: String,
        image: String,
    },
}

impl fmt::Display for FailureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureScope::Registry(registry) => write!(f, "registry {}", registry),
            FailureScope::Repository {
                registry,
                repository,
            } => write!(f, "repository {} on registry {}", repository, registry),
            FailureScope::Image {
                registry,
                repository,
                image,
            } => write!(f, "image {} in {} on registry {}", image, repository, registry),
        }
    }
}

/// A scope that contributed no data, and why.
#[derive(Debug)]
pub struct ScopeFailure {
    pub scope: FailureScope,
    pub error: ScanError,
}

/// Result of one enumeration run.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub images: HashSet<ImageIdentity>,
    pub failures: Vec<ScopeFailure>,
}

impl Enumeration {
    fn fail(&mut self, scope: FailureScope, error: ScanError) {
        warn!(scope = %scope, error = %error, "skipping scope");
        self.failures.push(ScopeFailure { scope, error });
    }
}

/// Maps configured registry ids to the registries an enumeration visits.
///
/// An empty list, a list of blank ids only, or any wildcard id collapses to
/// the default registry. Otherwise ids are kept in order without duplicates.
///
/// # Examples
///
/// ```
/// use libregscan::enumerator::resolve_registry_scope;
/// use libregscan::model::RegistryId;
///
/// assert_eq!(resolve_registry_scope(&[]), vec![RegistryId::Default]);
/// assert_eq!(
///     resolve_registry_scope(&["111111111111".to_string(), "*".to_string()]),
///     vec![RegistryId::Default]
/// );
/// ```
pub fn resolve_registry_scope(registry_ids: &[String]) -> Vec<RegistryId> {
    let collapses = registry_ids.iter().all(|id| id.trim().is_empty())
        || registry_ids.iter().any(|id| is_wildcard_registry_id(id));
    if collapses {
        return vec![RegistryId::Default];
    }

    let mut scope = Vec::new();
    for id in registry_ids {
        let registry = RegistryId::from_config(id);
        if !scope.contains(&registry) {
            scope.push(registry);
        }
    }
    scope
}

/// Walks the configured registries and collects their images.
pub struct ImageEnumerator {
    service: Arc<dyn RegistryService>,
    registry_ids: Vec<String>,
    tables: LookupTables,
    default_registry_id: Option<String>,
}

impl ImageEnumerator {
    pub fn new(service: Arc<dyn RegistryService>, registry_ids: Vec<String>) -> Self {
        Self {
            service,
            registry_ids,
            tables: LookupTables::new(),
            default_registry_id: None,
        }
    }

    /// Names the default registry in log messages once login has resolved it.
    pub fn set_default_registry_id(&mut self, id: Option<String>) {
        self.default_registry_id = id;
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    /// Enumerates every reachable image.
    pub async fn enumerate(&mut self) -> HashSet<ImageIdentity> {
        self.enumerate_with_report().await.images
    }

    /// Enumerates every reachable image and reports the scopes that failed.
    ///
    /// The lookup tables are cleared first, so after this returns they
    /// describe exactly this run.
    pub async fn enumerate_with_report(&mut self) -> Enumeration {
        self.tables.clear();
        let mut run = Enumeration::default();

        for registry in resolve_registry_scope(&self.registry_ids) {
            let repositories = match self.service.describe_repositories(&registry).await {
                Ok(repositories) => repositories,
                Err(e) => {
                    run.fail(FailureScope::Registry(self.labelled(&registry)), e);
                    continue;
                }
            };
            debug!(registry = %self.labelled(&registry), count = repositories.len(), "listed repositories");

            for repository in &repositories {
                self.tables
                    .record_repository(&repository.repository_name, &repository.repository_uri);
            }

            for repository in &repositories {
                self.enumerate_repository(&registry, &repository.repository_name, &mut run)
                    .await;
            }
        }

        info!(
            images = run.images.len(),
            repositories = self.tables.repository_count(),
            failures = run.failures.len(),
            "enumeration finished"
        );
        run
    }

    async fn enumerate_repository(
        &mut self,
        registry: &RegistryId,
        repository: &str,
        run: &mut Enumeration,
    ) {
        if repository.trim().is_empty() {
            debug!(registry = %registry, "skipping repository with blank name");
            return;
        }

        let details = match self.service.describe_images(registry, repository).await {
            Ok(details) => details,
            Err(e) => {
                let scope = FailureScope::Repository {
                    registry: self.labelled(registry),
                    repository: repository.to_string(),
                };
                run.fail(scope, e);
                return;
            }
        };

        for detail in details {
            self.enumerate_image(registry, repository, detail, run).await;
        }
    }

    async fn enumerate_image(
        &mut self,
        registry: &RegistryId,
        repository: &str,
        detail: ImageDetail,
        run: &mut Enumeration,
    ) {
        let image_scope = || FailureScope::Image {
            registry: self.labelled(registry),
            repository: repository.to_string(),
            image: detail.image_digest.to_string(),
        };

        let id = ImageIdentifier::by_digest(detail.image_digest.as_str());
        if !id.is_resolvable() {
            run.fail(
                image_scope(),
                ScanError::validation("image has neither tag nor digest"),
            );
            return;
        }

        // Images are looked up in the registry that owns them
        let owner = if detail.registry_id.trim().is_empty() {
            registry.clone()
        } else {
            RegistryId::Account(detail.registry_id.clone())
        };

        let output = match self
            .service
            .batch_get_image(&owner, repository, std::slice::from_ref(&id))
            .await
        {
            Ok(output) => output,
            Err(e) => {
                run.fail(image_scope(), e);
                return;
            }
        };

        for failure in &output.failures {
            run.fail(
                image_scope(),
                ScanError::provider(image_scope().to_string(), failure.to_string()),
            );
        }

        for image in output.images {
            let identity = self.unify(registry, &detail, image);
            if let (Some(digest), Some(tag)) = (&identity.canonical_digest, &identity.primary_tag) {
                self.tables.record_tag(digest, tag);
            }
            run.images.replace(identity);
        }
    }

    /// Builds the identity of `image` from its detail record and manifest.
    fn unify(&self, registry: &RegistryId, detail: &ImageDetail, image: Image) -> ImageIdentity {
        let canonical_digest = parse_canonical(&image.image_manifest);
        if !detail.image_digest.matches_manifest(&image.image_manifest) {
            debug!(
                digest = %detail.image_digest,
                "provider digest does not match the manifest bytes"
            );
        }

        let primary_tag = image
            .image_id
            .image_tag
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| detail.image_tags.first().cloned());

        let registry_id = [image.registry_id.as_str(), detail.registry_id.as_str()]
            .into_iter()
            .find(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| registry.as_account().unwrap_or_default().to_string());

        let repository = if image.repository_name.trim().is_empty() {
            detail.repository_name.clone()
        } else {
            image.repository_name.clone()
        };

        ImageIdentity {
            registry_id,
            repository,
            provider_digest: detail.image_digest.clone(),
            tags: detail.image_tags.clone(),
            pushed_at: detail.image_pushed_at,
            size_bytes: detail.image_size_in_bytes,
            manifest: image.image_manifest,
            primary_tag,
            canonical_digest,
        }
    }

    /// Composes `<repository-uri>:<tag>` for an enumerated image.
    ///
    /// Returns an empty string when the repository URI or the tag of the
    /// image's canonical digest was not observed by the last enumeration.
    pub fn full_pull_reference(&self, identity: &ImageIdentity) -> String {
        let Some(uri) = self.tables.repository_uri(&identity.repository) else {
            return String::new();
        };
        let Some(tag) = identity
            .canonical_digest
            .as_ref()
            .and_then(|digest| self.tables.tag_for(digest))
        else {
            return String::new();
        };
        compose_pull_reference(uri, tag)
    }

    /// Replaces the default sentinel with the logged-in registry id, if known.
    fn labelled(&self, registry: &RegistryId) -> RegistryId {
        match (registry, &self.default_registry_id) {
            (RegistryId::Default, Some(id)) => RegistryId::Account(id.clone()),
            _ => registry.clone(),
        }
    }
}

fn parse_canonical(manifest: &str) -> Option<CanonicalDigest> {
    let hex = extract_digest(manifest);
    if hex.is_empty() {
        return None;
    }
    hex.parse::<CanonicalDigest>()
        .inspect_err(|e| debug!(error = %e, "manifest digest is not a valid sha256"))
        .ok()
}
