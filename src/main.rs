// src/main.rs
use std::process;
use std::time::Duration;

use axum_server::Handle;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use polls::{create_routes, db, services, AppResult, AppState, Config};

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load environment variables from .env file

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,polls=debug")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = Config::from_env()?;
    if config.uses_default_secret_key() && !config.debug {
        tracing::warn!("SECRET_KEY is not set, using the insecure development key");
    }

    let pool = db::create_pool(&config).await?;
    db::migrate(&pool).await?;

    if let Some(path) = &config.seed_fixture {
        services::load_fixture(&pool, path).await?;
    }

    let addr = config.bind_address;
    let app = create_routes(AppState::new(pool, config));

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    tracing::info!("listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
