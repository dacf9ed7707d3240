//! Pattern & Logic Challenge - Unified CLI
//!
//! Runs the REST game server or a terminal client.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use pattern_challenge::{
    AppConfig, GameOrchestrator, HttpBackend, LocalStore, StoreBackend, create_router,
    generate_session_id, terminal,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port, host } => run_server(config, host, port).await,
        Command::Play {
            server_url,
            db_path,
            session,
        } => run_play(config, server_url, db_path, session).await,
    }
}

/// Run the HTTP game server
#[instrument(skip(config))]
async fn run_server(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    config.server_mut().override_with(host, port);
    let store = config.store().open_store()?;
    let app = create_router(store);

    let addr = (config.server().host().as_str(), *config.server().port());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        host = %config.server().host(),
        port = config.server().port(),
        store = %config.store().backend(),
        "Server ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

/// Run the terminal client
#[instrument(skip(config))]
async fn run_play(
    config: AppConfig,
    server_url: Option<String>,
    db_path: Option<String>,
    session: Option<String>,
) -> Result<()> {
    // Keep the terminal readable; RUST_LOG still opts in to more.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let session_id = session.unwrap_or_else(|| generate_session_id(&mut rand::rng()));

    match server_url {
        Some(url) => {
            info!(%url, "Playing against server");
            let game = GameOrchestrator::start(HttpBackend::new(url), &session_id).await?;
            terminal::run(game).await
        }
        None => {
            let path = db_path.unwrap_or_else(|| config.store().db_path().clone());
            info!(%path, "Playing with local store");
            let backend = StoreBackend::new(LocalStore::open(path)?);
            let game = GameOrchestrator::start(backend, &session_id).await?;
            terminal::run(game).await
        }
    }
}
