//! Orbitmarks server entry point.
//!
//! Reads configuration from the environment (and `.env`), opens the SQLite
//! database and serves the REST API until Ctrl-C.

use orbitmarks::api;
use orbitmarks::app::App;
use orbitmarks::config::ServerConfig;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orbitmarks=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        database = %config.database_path.display(),
        session_ttl_secs = config.session_ttl_secs,
        "starting orbitmarks {}",
        env!("CARGO_PKG_VERSION")
    );

    let bind_addr = config.bind_addr;
    let app = App::new(config).map_err(|e| anyhow::anyhow!("failed to initialize: {}", e))?;

    let listener = TcpListener::bind(bind_addr).await?;
    api::serve(app, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
        }
        tracing::info!("shutting down");
    })
    .await?;

    Ok(())
}
