use crate::commands::build_manager;
use crate::context::AppContext;
use crate::format::{Formattable, OutputFormat, print_output};
use libregscan::manager::BackendOutcome;
use serde::Serialize;

/// Tooling availability of one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolingStatus {
    pub backend: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CheckReport {
    pub backends: Vec<ToolingStatus>,
}

impl CheckReport {
    pub fn from_outcomes(outcomes: Vec<BackendOutcome<bool>>) -> Self {
        Self {
            backends: outcomes
                .into_iter()
                .map(|o| ToolingStatus {
                    backend: o.backend.to_string(),
                    available: o.outcome,
                })
                .collect(),
        }
    }

    pub fn all_available(&self) -> bool {
        self.backends.iter().all(|b| b.available)
    }
}

impl Formattable for CheckReport {
    fn format_pretty(&self) -> String {
        if self.backends.is_empty() {
            return "No backend enabled.".to_string();
        }
        self.backends
            .iter()
            .map(|b| {
                let status = if b.available {
                    "tooling available"
                } else {
                    "tooling missing"
                };
                format!("{}: {}", b.backend, status)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Handle the check command
pub async fn handle_check(ctx: &AppContext, format: OutputFormat) {
    let manager = build_manager(ctx);
    let report = CheckReport::from_outcomes(manager.check_tooling().await);

    print_output(ctx.formatter.as_ref(), &report, format);
    if !report.all_available() {
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
