use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_blend::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache, CacheWriterHandle},
    services::{
        providers::{PosterProvider, TmdbProvider},
        recommendations::RecommendationLimits,
        MovieCatalog,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_blend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = MovieCatalog::load(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;
    let catalog = Arc::new(catalog);

    let (posters, cache_handle) = init_posters(&config).await?;

    let limits = RecommendationLimits {
        default_top_n: config.default_top_n,
        max_top_n: config.max_top_n,
    };
    let app = create_router(AppState::new(catalog, posters, limits));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

/// Sets up the TMDB poster provider when a token is configured
///
/// A TMDB outage at startup only disables posters; recommendations still work.
async fn init_posters(
    config: &Config,
) -> anyhow::Result<(Option<Arc<dyn PosterProvider>>, Option<CacheWriterHandle>)> {
    let Some(token) = config.tmdb_token.clone() else {
        tracing::warn!("TMDB_TOKEN not set, posters disabled");
        return Ok((None, None));
    };

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, handle) = Cache::new(redis_client).await;

    match TmdbProvider::connect(
        cache,
        token,
        config.tmdb_api_url.clone(),
        config.tmdb_poster_size.clone(),
    )
    .await
    {
        Ok(provider) => {
            let provider: Arc<dyn PosterProvider> = Arc::new(provider);
            Ok((Some(provider), Some(handle)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get TMDB configuration, posters disabled");
            handle.shutdown().await;
            Ok((None, None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
