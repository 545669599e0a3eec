// Basket Server daemon entry point

mod cli;

use anyhow::{Context, Result};
use basket_server::catalog::seed::CatalogSeed;
use basket_server::catalog::InMemoryCatalog;
use basket_server::config::BasketServerConfig;
use basket_server::http::{self, AppState};
use basket_server::session::{self, InMemorySessionStore, SessionStore};
use basket_server::{observability, signals};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Serve { config, verbose } => {
            observability::init(verbose)?;
            run_server(config).await
        }
        command => cli::commands::execute(command).await,
    }
}

async fn run_server(config_path: String) -> Result<()> {
    info!("Loading configuration from {}", config_path);
    let config = BasketServerConfig::load(&config_path)?;
    let addr = config.server.socket_addr()?;

    let catalog = match &config.catalog.seed_file {
        Some(path) => CatalogSeed::load(path)
            .with_context(|| format!("Failed to seed catalog from {}", path.display()))?
            .into_catalog(),
        None => InMemoryCatalog::new(),
    };
    info!(products = catalog.product_count(), "✓ Catalog ready");

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let shutdown = Arc::new(signals::Shutdown::new());
    let sweeper = session::spawn_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
        config.session.timeout_secs,
        shutdown.watcher(),
    );

    let state = Arc::new(AppState {
        catalog: Arc::new(catalog),
        sessions,
        session: config.session.clone(),
        basket: config.basket.clone(),
    });

    cli::success(&format!("Basket server ready on http://{}", addr));
    cli::info("Press Ctrl+C for graceful shutdown");

    let signal = signals::listen()?;
    let latch = shutdown.clone();
    http::serve(addr, state, async move {
        let reason = signal.await;
        info!(%reason, "🛑 Graceful shutdown initiated");
        latch.trigger(reason);
    })
    .await?;

    debug_assert!(shutdown.is_triggered());
    sweeper.await.context("Session sweeper panicked")?;

    info!("👋 Basket server stopped");
    Ok(())
}
