use nutrition_dashboard::{AppConfig, AppState, CredentialDirectory, UpstreamClient, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    let credentials = CredentialDirectory::parse(&config.user_credentials);
    if credentials.is_empty() {
        warn!("no user credentials configured; every lookup will fail");
    }

    let client = UpstreamClient::new(&config.upstream_base_url, config.upstream_timeout)?;
    info!(
        upstream = %config.upstream_base_url,
        identities = credentials.len(),
        "upstream client ready"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, credentials, Arc::new(client));
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
