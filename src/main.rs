use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookstore::catalog::Catalog;
use bookstore::config;
use bookstore::search::SearchEngine;
use bookstore::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookstore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Bookstore build {}", env!("BUILD_TIME"));

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Load catalog / 加载图书目录
    let data_file = app_config.get_data_file();
    let catalog = Catalog::load_from_file(&data_file)?;

    let engine = SearchEngine::new(app_config.get_search_workers());
    tracing::info!("Search engine using {} workers", engine.workers());

    let state = Arc::new(AppState::new(catalog, engine));
    let app = bookstore::api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
