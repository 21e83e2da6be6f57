//! ken-analyst - Workspace backend for SEC filing research

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ken_analyst=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ken-analyst v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    ken_analyst::cli::run()?;

    Ok(())
}
