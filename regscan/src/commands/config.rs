use crate::config;
use crate::context::AppContext;
use crate::format::{Formattable, OutputFormat, OutputFormatter, print_output};
use libregscan::Config;
use serde::Serialize;
use std::path::Path;

/// Effective configuration together with the file it came from
#[derive(Serialize)]
pub struct ConfigView<'a> {
    #[serde(skip)]
    pub path: &'a Path,
    #[serde(flatten)]
    pub config: &'a Config,
}

impl Formattable for ConfigView<'_> {
    fn format_pretty(&self) -> String {
        let body = serde_yaml::to_string(self.config)
            .unwrap_or_else(|e| format!("# failed to render configuration: {}\n", e));
        let source = if self.path.exists() {
            self.path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", self.path.display())
        };
        format!("# {}\n{}", source, body.trim_end())
    }
}

/// Handle the config init subcommand
pub fn handle_init(formatter: &dyn OutputFormatter, path: &Path, force: bool) {
    match config::init_config(path, force) {
        Ok(()) => formatter.success(&format!("Initialized config file at: {}", path.display())),
        Err(e) => {
            formatter.error(&e);
            std::process::exit(1);
        }
    }
}

/// Handle the config show subcommand
pub fn handle_show(ctx: &AppContext, format: OutputFormat) {
    let view = ConfigView {
        path: &ctx.config_path,
        config: &ctx.config,
    };
    print_output(ctx.formatter.as_ref(), &view, format);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
