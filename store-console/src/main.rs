use dotenvy::dotenv;
use service_core::observability::init_tracing;
use store_console::config::get_configuration;
use store_console::startup::{build_router, build_state};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "store-console",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    );

    store_console::services::metrics::init_metrics();

    if configuration.auth.username.is_none() || configuration.auth.password.is_none() {
        tracing::warn!("APP_AUTH__USERNAME / APP_AUTH__PASSWORD not set; login is disabled");
    }

    let state = build_state(&configuration)
        .map_err(|e| anyhow::anyhow!("Failed to build File Search client: {}", e))?;
    let app = build_router(state, &configuration.server);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting store-console on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
