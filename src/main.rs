use std::net::SocketAddr;

use anyhow::{Context, Result};
use climate_core::Config;
use climate_query::ReferenceWindow;
use climate_server::AppState;
use climate_store::Database;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    climate_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("Climate API failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let (config, _validation) = Config::load_validated()?;

    let db = Database::open(&config.database.path, config.database.query_timeout())
        .context("Failed to open weather database")?;
    db.verify_schema()
        .context("Weather database does not match the expected schema")?;

    {
        let session = db.session()?;
        match session.date_span()? {
            Some(span) => tracing::info!(
                "Dataset holds {} observations from {} to {}",
                session.observation_count()?,
                span.first,
                span.last
            ),
            None => tracing::warn!("Dataset holds no observations"),
        }
        tracing::info!("Dataset holds {} stations", session.stations()?.len());
    }

    let window = ReferenceWindow::new(
        config.tobs.station.clone(),
        config.tobs.reference_date()?,
        config.tobs.window_days,
    );
    tracing::info!(
        "Reference station {} window {}..={}",
        window.station,
        window.from,
        window.to
    );

    let addr = SocketAddr::new(config.server.ip()?, config.server.port);
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        signal_token.cancel();
    });

    climate_server::serve(AppState::new(db.clone(), window), addr, shutdown).await?;

    db.close()?;
    tracing::info!("Climate API stopped");
    Ok(())
}
