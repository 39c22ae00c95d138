use crate::commands::build_manager;
use crate::context::AppContext;
use crate::format::{Formattable, OutputFormat, print_output};
use libregscan::{LoginReport, ScanError};
use libregscan::manager::BackendOutcome;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryLoginItem {
    pub registry: String,
    pub success: bool,
}

/// Login outcome of one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendLogin {
    pub backend: String,
    pub succeeded: bool,
    /// Set when the backend could not be contacted at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub request_succeeded: bool,
    pub registries: Vec<RegistryLoginItem>,
    pub malformed_lines: usize,
}

impl BackendLogin {
    pub fn new(backend: &str, report: &LoginReport) -> Self {
        Self {
            backend: backend.to_string(),
            succeeded: report.succeeded(),
            error: None,
            request_succeeded: report.request_succeeded,
            registries: report
                .logins
                .iter()
                .map(|l| RegistryLoginItem {
                    registry: l.registry.clone(),
                    success: l.success,
                })
                .collect(),
            malformed_lines: report.malformed_lines,
        }
    }

    pub fn from_outcome(backend: &str, outcome: &Result<LoginReport, ScanError>) -> Self {
        match outcome {
            Ok(report) => Self::new(backend, report),
            Err(e) => Self {
                backend: backend.to_string(),
                succeeded: false,
                error: Some(e.to_string()),
                request_succeeded: false,
                registries: Vec::new(),
                malformed_lines: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LoginOutput {
    pub backends: Vec<BackendLogin>,
}

impl Formattable for LoginOutput {
    fn format_pretty(&self) -> String {
        if self.backends.is_empty() {
            return "No backend enabled.".to_string();
        }

        let mut lines = Vec::new();
        for backend in &self.backends {
            if let Some(error) = &backend.error {
                lines.push(format!("{}: {}", backend.backend, error));
                continue;
            }
            if !backend.request_succeeded {
                lines.push(format!("{}: authentication request failed", backend.backend));
                continue;
            }
            lines.push(format!(
                "{}: {}",
                backend.backend,
                if backend.succeeded { "logged in" } else { "login failed" }
            ));
            for registry in &backend.registries {
                lines.push(format!(
                    "  {} {}",
                    registry.registry,
                    if registry.success { "OK" } else { "Failed" }
                ));
            }
            if backend.malformed_lines > 0 {
                lines.push(format!("  {} malformed login line(s) skipped", backend.malformed_lines));
            }
        }
        lines.join("\n")
    }
}

/// Handle the login command
pub async fn handle_login(ctx: &AppContext, format: OutputFormat) {
    let mut manager = build_manager(ctx);

    let spinner = ctx.formatter.spinner("Logging in to registries...");
    let outcomes: Vec<BackendOutcome<Result<LoginReport, ScanError>>> = manager.login_all().await;
    spinner.finish_and_clear();

    let output = LoginOutput {
        backends: outcomes
            .iter()
            .map(|o| BackendLogin::from_outcome(o.backend, &o.outcome))
            .collect(),
    };

    print_output(ctx.formatter.as_ref(), &output, format);
    if output.backends.iter().any(|b| !b.succeeded) {
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
