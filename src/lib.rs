pub mod api;
pub mod client;
pub mod config;
pub mod crypto;
pub mod db;
pub mod forms;
pub mod inference;
pub mod models;
pub mod symptom_checker;

#[cfg(test)]
pub(crate) mod test_support;

use tracing_subscriber::EnvFilter;

/// Startup failures of the portal server binary.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Database(#[from] db::DatabaseError),
    #[error("{0}")]
    Server(String),
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Run the portal API server until Ctrl-C.
pub async fn run() -> Result<(), RunError> {
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::PortalConfig::from_env()?;

    let ctx = api::ApiContext::new(config.database_path.clone());
    // A broken database fails startup with a typed error
    ctx.ensure_schema()?;
    tracing::info!(path = %config.database_path.display(), "Database ready");
    tracing::info!(
        portal = %config.endpoints.portal_api,
        images = %config.endpoints.image_inference,
        diabetes = %config.endpoints.diabetes,
        bbn = %config.endpoints.bbn,
        upload_timeout_secs = config.upload_timeout.as_secs(),
        "Service endpoints"
    );

    let mut server = api::start_portal_server_on(ctx, config.bind_addr)
        .await
        .map_err(RunError::Server)?;
    tracing::info!(addr = %server.session.server_addr, "Portal API listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
