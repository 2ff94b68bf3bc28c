//! ResistAID API server
//!
//! Run with: cargo run -p resistaid-web

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use resistaid_web::config::Config;
use resistaid_web::router::build_router;
use resistaid_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ResistAID API server...");

    let config = Config::load()?;
    let addr = config.server.addr()?;
    let state = AppState::from_config(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
