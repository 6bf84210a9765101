use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_backend::api::router;
use todo_backend::config::Config;
use todo_backend::db::SqliteTodoStore;
use todo_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "todo_backend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let store = SqliteTodoStore::connect(&config.database_url, config.max_connections)
        .await
        .inspect_err(|e| error!("DB Error: {}", e))?;
    store
        .migrate()
        .await
        .inspect_err(|e| error!("DB Error: {}", e))?;
    let store = Arc::new(store);

    let app = router(AppState::new(store.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server Running at http://{}/", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("store closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
    }
}
