use crate::commands::build_manager;
use crate::context::AppContext;
use crate::format::{Formattable, OutputFormat, print_output};
use libregscan::manager::BackendOutcome;
use libregscan::{PullSummary, Result};
use serde::Serialize;

/// Pull outcome of one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendPull {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PullSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendPull {
    pub fn new(outcome: &BackendOutcome<Result<PullSummary>>) -> Self {
        let (summary, error) = match &outcome.outcome {
            Ok(summary) => (Some(*summary), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            backend: outcome.backend.to_string(),
            summary,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullReport {
    pub backends: Vec<BackendPull>,
    /// Images removed afterwards, when removal was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<usize>,
}

impl PullReport {
    pub fn has_errors(&self) -> bool {
        self.backends
            .iter()
            .any(|b| b.error.is_some() || b.summary.is_some_and(|s| s.failed > 0))
    }
}

impl Formattable for PullReport {
    fn format_pretty(&self) -> String {
        if self.backends.is_empty() {
            return "No backend enabled.".to_string();
        }

        let mut lines: Vec<String> = self
            .backends
            .iter()
            .map(|b| match (&b.summary, &b.error) {
                (Some(s), _) => format!(
                    "{}: {} found, {} selected, {} pulled, {} skipped, {} failed",
                    b.backend, s.found, s.selected, s.pulled, s.skipped, s.failed
                ),
                (None, Some(e)) => format!("{}: {}", b.backend, e),
                (None, None) => format!("{}: no result", b.backend),
            })
            .collect();

        if let Some(removed) = self.removed {
            lines.push(format!("{} pulled image(s) removed", removed));
        }
        lines.join("\n")
    }
}

/// Handle the pull command
pub async fn handle_pull(ctx: &AppContext, format: OutputFormat, remove: bool) {
    let mut manager = build_manager(ctx);

    let spinner = ctx.formatter.spinner("Pulling remote images...");
    let outcomes = manager.pull_all().await;
    spinner.finish_and_clear();

    let removed = if remove {
        Some(manager.remove_all_pulled().await)
    } else {
        None
    };

    let report = PullReport {
        backends: outcomes.iter().map(BackendPull::new).collect(),
        removed,
    };

    print_output(ctx.formatter.as_ref(), &report, format);
    if report.has_errors() {
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "pull_tests.rs"]
mod tests;
