//! Reaction-role bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p reactrole-gateway
//! ```
//!
//! Configuration is loaded from `bot.toml` (or `$REACTROLE_CONFIG`) and
//! `REACTROLE__*` environment variables.

use reactrole_common::{try_init_tracing_with_config, AppConfig, AppResult, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(code = e.error_code(), error = %e, "Reaction-role bot failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = AppConfig::load()?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_logging(&config.logging)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        prefix = %config.bot.command_prefix,
        command_roles = config.bot.command_role_ids.len(),
        event_timeout_secs = config.bot.event_timeout_secs,
        "Configuration loaded"
    );

    reactrole_gateway::run(config).await
}
