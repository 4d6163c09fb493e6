pub mod config;
pub mod error;

pub use config::{Config, DatabaseConfig, ServerConfig, TobsConfig, ValidationResult, DATE_FORMAT};
pub use error::{ConfigError, DatabaseError, RusqliteErrorExt};

use anyhow::Result;

/// Initialize logging for the service.
///
/// Honors `RUST_LOG`, falling back to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Climate API core initialized");
    Ok(())
}
