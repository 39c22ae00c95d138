/// Tooling check
pub mod check;

/// Config command handlers
pub mod config;

/// Image listing
pub mod list;

/// Registry login
pub mod login;

/// Image retrieval
pub mod pull;

/// Version command handlers
pub mod version;

use crate::context::AppContext;
use libregscan::RegistryManager;
use tracing::debug;

/// Builds the registry manager, exiting when the configuration is unusable.
pub fn build_manager(ctx: &AppContext) -> RegistryManager {
    match RegistryManager::from_config(&ctx.config) {
        Ok(manager) => {
            debug!(
                backends = manager.backends().len(),
                config = %ctx.config_path.display(),
                "registry manager ready"
            );
            if !manager.is_active() {
                ctx.formatter.warning(&format!(
                    "Remote registry scanning is disabled or has no backend enabled (see {})",
                    ctx.config_path.display()
                ));
            }
            manager
        }
        Err(e) => {
            ctx.formatter.error(&e.to_string());
            std::process::exit(1);
        }
    }
}
