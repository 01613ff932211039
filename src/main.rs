use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use movie_recommender::{
    api::{create_router, AppState},
    artifacts,
    config::Config,
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Catalog and matrix are loaded once and shared read-only
    let (catalog, matrix) = artifacts::load(&config).context("Failed to load movie artifacts")?;
    let recommender = Recommender::new(Arc::new(catalog), Arc::new(matrix));
    tracing::info!(
        movies = recommender.catalog().len(),
        genres = recommender.vocabulary().len(),
        "Recommender ready"
    );

    let state = AppState::new(recommender).with_default_top_k(config.default_top_k);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
