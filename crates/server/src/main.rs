//! LTDK server binary.

use ltdk_server::{backend_config_from_env, build_router, build_state, config::ServerConfig, frontend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ltdk_server=debug,ltdk_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let backend = backend_config_from_env()?;
    let state = build_state(&config, &backend).await?;

    let app = frontend::with_frontend_fallback(build_router(state), &config.frontend);

    tracing::info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
