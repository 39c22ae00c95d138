//! Error types for regscan.
//!
//! Every failure in the scanning pipeline is terminal for its own scope only.
//! The variants here describe what went wrong so that callers can aggregate
//! partial failures instead of relying on log output.

use thiserror::Error;


/// Main error type for regscan operations
#[derive(Error, Debug)]
pub enum ScanError {
    /// The provider tooling (e.g. the `aws` CLI) is not installed or not on PATH
    #[error("Required tooling is not available: {tool}")]
    ToolingMissing { tool: String },

    /// An external command could not be run or exited unsuccessfully
    #[error("Command failed (exit code: {exit_code:?}): {message}")]
    Command {
        message: String,
        exit_code: Option<i32>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication against one or more registries failed
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// The registry provider service rejected a request or returned garbage
    #[error("Provider error ({scope}): {message}")]
    Provider {
        scope: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors (malformed manifest, invalid digest or reference)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, bad filter pattern)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for regscan operations
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Creates a new tooling-missing error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::tooling_missing("aws");
    /// assert!(matches!(err, ScanError::ToolingMissing { .. }));
    /// ```
    pub fn tooling_missing<S: Into<String>>(tool: S) -> Self {
        Self::ToolingMissing { tool: tool.into() }
    }

    /// Creates a new command error for a process that ran but failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::command("docker pull failed", Some(1));
    /// assert!(matches!(err, ScanError::Command { exit_code: Some(1), .. }));
    /// ```
    pub fn command<S: Into<String>>(message: S, exit_code: Option<i32>) -> Self {
        Self::Command {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Creates a new command error for a process that could not be spawned.
    pub fn command_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Command {
            message: message.into(),
            exit_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::authentication("no registry accepted the login");
    /// assert!(matches!(err, ScanError::Authentication { .. }));
    /// ```
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new provider error scoped to a registry, repository or image.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::provider("registry 111111111111", "RepositoryNotFoundException");
    /// assert!(err.to_string().contains("registry 111111111111"));
    /// ```
    pub fn provider<S: Into<String>, M: Into<String>>(scope: S, message: M) -> Self {
        Self::Provider {
            scope: scope.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new provider error with a source error.
    pub fn provider_with_source<S, M, E>(scope: S, message: M, source: E) -> Self
    where
        S: Into<String>,
        M: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Provider {
            scope: scope.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::validation("manifest has no config descriptor");
    /// assert!(matches!(err, ScanError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregscan::error::ScanError;
    ///
    /// let err = ScanError::config("invalid config file", Some("/etc/regscan.yaml"));
    /// assert!(matches!(err, ScanError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        ScanError::config_with_source("Failed to build configuration".to_string(), None, err)
    }
}
