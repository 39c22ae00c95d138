//! Registry authentication.
//!
//! Logging in is a two step affair: the provider CLI is asked for engine
//! login commands (one per registry in scope), and each of those commands is
//! then run against the local container engine. One accepted registry is
//! enough for the session to count as logged in.

use crate::config::is_wildcard_registry_id;
use crate::error::{Result, ScanError};
use crate::executor::{CommandExecutor, redact, with_privilege};
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Provider request that prints one engine login command per registry.
pub const ECR_GET_LOGIN: &str = "aws ecr get-login --no-include-email";

/// Lines starting with this marker are engine login commands.
pub const ENGINE_LOGIN_MARKER: &str = "docker login";

/// Which registries a login request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginScope {
    /// The default registry of the logged-in account.
    Default,
    /// Exactly one configured registry; it becomes the default registry id.
    Single(String),
    /// Several registries in one request; none of them is the default.
    Multiple(Vec<String>),
}

impl LoginScope {
    /// Derives the scope from the configured registry ids.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::auth::LoginScope;
    ///
    /// assert_eq!(LoginScope::from_config(&[]), LoginScope::Default);
    /// assert_eq!(
    ///     LoginScope::from_config(&["111111111111".to_string()]),
    ///     LoginScope::Single("111111111111".to_string())
    /// );
    /// ```
    pub fn from_config(registry_ids: &[String]) -> Self {
        match registry_ids {
            [] => LoginScope::Default,
            [only] => {
                let only = only.trim();
                if only.is_empty() || is_wildcard_registry_id(only) {
                    LoginScope::Default
                } else {
                    LoginScope::Single(only.to_string())
                }
            }
            many => LoginScope::Multiple(
                many.iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty() && !is_wildcard_registry_id(id))
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    /// Builds the provider authentication request.
    pub fn command(&self) -> String {
        let ids: Vec<&str> = match self {
            LoginScope::Default => Vec::new(),
            LoginScope::Single(id) => vec![id.as_str()],
            LoginScope::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        };

        if ids.is_empty() {
            ECR_GET_LOGIN.to_string()
        } else {
            format!("{} --registry-ids {}", ECR_GET_LOGIN, ids.join(" "))
        }
    }

    /// The id recorded as default after a successful login, if any.
    pub fn default_candidate(&self) -> Option<&str> {
        match self {
            LoginScope::Single(id) => Some(id),
            _ => None,
        }
    }
}

/// Outcome of one engine login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLogin {
    /// Last token of the login command, the registry endpoint.
    pub registry: String,
    pub success: bool,
}

/// Everything that happened during a login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginReport {
    /// Whether the provider answered the authentication request.
    pub request_succeeded: bool,
    pub logins: Vec<RegistryLogin>,
    pub malformed_lines: usize,
}

impl LoginReport {
    /// True when at least one registry accepted the login.
    pub fn succeeded(&self) -> bool {
        self.logins.iter().any(|l| l.success)
    }

    /// Turns an unsuccessful login into an authentication error.
    pub fn ensure_succeeded(&self) -> Result<()> {
        if self.succeeded() {
            return Ok(());
        }
        let message = if !self.request_succeeded {
            "authentication request failed".to_string()
        } else if self.logins.is_empty() {
            "no engine login command returned".to_string()
        } else {
            let registries: Vec<&str> = self.logins.iter().map(|l| l.registry.as_str()).collect();
            format!("login to registries [{}] failed", registries.join(", "))
        };
        Err(ScanError::authentication(message))
    }
}

/// Logs the local engine into the configured registries.
pub struct AuthenticationSession {
    executor: Arc<dyn CommandExecutor>,
    registry_ids: Vec<String>,
    use_sudo: bool,
    default_registry_id: Option<String>,
}

impl AuthenticationSession {
    pub fn new(executor: Arc<dyn CommandExecutor>, registry_ids: Vec<String>, use_sudo: bool) -> Self {
        Self {
            executor,
            registry_ids,
            use_sudo,
            default_registry_id: None,
        }
    }

    /// Registry id recorded by the last successful single-registry login.
    pub fn default_registry_id(&self) -> Option<&str> {
        self.default_registry_id.as_deref()
    }

    /// Logs in and reports whether at least one registry accepted.
    pub async fn login(&mut self) -> bool {
        self.login_report().await.succeeded()
    }

    /// Logs in and returns the per-registry outcome.
    pub async fn login_report(&mut self) -> LoginReport {
        self.default_registry_id = None;

        let scope = LoginScope::from_config(&self.registry_ids);
        if scope == LoginScope::Default {
            info!("no registry ids configured, logging in to the default registry");
        }

        let request = scope.command();
        let mut report = LoginReport::default();

        let response = match self.executor.execute(&request).await {
            Ok(output) if output.success() => output,
            Ok(output) => {
                warn!(registries = ?self.registry_ids, "login to registries failed");
                debug!(exit_code = output.exit_code, stderr = %output.stderr.trim(), "authentication request failed");
                return report;
            }
            Err(e) => {
                warn!(registries = ?self.registry_ids, error = %e, "login to registries failed");
                return report;
            }
        };
        report.request_succeeded = true;

        // A login line must name a registry after the marker itself.
        let marker_tokens = ENGINE_LOGIN_MARKER.split_whitespace().count();
        for line in response.lines().filter(|l| l.starts_with(ENGINE_LOGIN_MARKER)) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(registry) = tokens.last().filter(|_| tokens.len() > marker_tokens) else {
                info!(line = %redact(line), "invalid engine login command");
                report.malformed_lines += 1;
                continue;
            };

            let command = with_privilege(line, self.use_sudo);
            let success = self.executor.is_successful(&command).await;
            info!(registry = %registry, "login to registry: {}", if success { "OK" } else { "Failed" });

            report.logins.push(RegistryLogin {
                registry: registry.to_string(),
                success,
            });
        }

        if report.succeeded()
            && let Some(id) = scope.default_candidate()
        {
            self.default_registry_id = Some(id.to_string());
        }

        report
    }
}
