use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;
use workout_history::HistoryConfig;
use workout_history_server::{AppState, ServerConfig, build_router, telemetry};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_filter = telemetry::init_tracing();
    info!(%log_filter, "workout_history_server: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let history = HistoryConfig::from_env()?;
    let server = ServerConfig::from_env()?;
    info!(
        data_dir = %history.data_dir.display(),
        history_file = %history.history_file.display(),
        dat_file = %history.dat_file.display(),
        "history configuration"
    );

    let state = Arc::new(AppState::new(history, Some(handle)));
    let app = build_router(state, server.max_body_size);

    let addr = server.addr;
    info!(%addr, max_body_bytes = server.max_body_size, "starting HTTP server");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl+c: {e}");
            }
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
