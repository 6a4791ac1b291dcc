pub mod api;
pub mod config;
pub mod core_state;
pub mod form;
pub mod models;
pub mod pipeline;
pub mod prediction;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Start the application and serve until Ctrl-C.
///
/// Missing or broken artifacts are not fatal: the form is still served with
/// predictions disabled. Failing to bind the listen socket is.
pub async fn run() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();
    let addr = config.socket_addr();
    let core = Arc::new(core_state::CoreState::load(config));

    let mut server = api::start_server(core, addr).await.map_err(|e| {
        tracing::error!(%addr, "Failed to bind: {e}");
        e
    })?;
    tracing::info!(url = %format!("http://{}", server.session.server_addr), "Form available");

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
        Err(e) => {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }

    server.shutdown();
    server.stopped().await;
    Ok(())
}
