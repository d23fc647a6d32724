use std::sync::Arc;

use futures::future::join_all;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, MovieSummary, RecommendationItem, RecommendationResponse},
    services::{providers::PosterProvider, recommender::Recommender},
};

/// Limits applied to incoming recommendation requests
#[derive(Debug, Clone, Copy)]
pub struct RecommendationLimits {
    pub default_top_n: usize,
    pub max_top_n: usize,
}

/// Blends two seed movies and decorates the results with posters
///
/// The ranking runs on the blocking pool. Poster lookups happen afterwards and
/// are best effort: a failed lookup leaves `poster_url` empty.
pub async fn get_recommendations(
    recommender: Arc<Recommender>,
    posters: Option<Arc<dyn PosterProvider>>,
    limits: RecommendationLimits,
    seed_id1: MovieId,
    seed_id2: MovieId,
    top_n: Option<usize>,
) -> AppResult<RecommendationResponse> {
    let top_n = top_n.unwrap_or(limits.default_top_n);
    if top_n > limits.max_top_n {
        return Err(AppError::InvalidInput(format!(
            "top_n must be at most {}, got {}",
            limits.max_top_n, top_n
        )));
    }

    let engine = recommender.clone();
    let ranked = tokio::task::spawn_blocking(move || engine.recommend(seed_id1, seed_id2, top_n))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let catalog = recommender.catalog();
    let mut seeds = Vec::with_capacity(2);
    for id in [seed_id1, seed_id2] {
        let movie = catalog
            .movie(id)
            .ok_or_else(|| AppError::NotFound(format!("Movie ID {} not found", id)))?;
        seeds.push(MovieSummary::from(movie));
    }

    let mut ids: Vec<MovieId> = seeds.iter().map(|s| s.id).collect();
    ids.extend(ranked.iter().map(|r| r.id));
    let mut urls = lookup_posters(posters.as_deref(), &ids).await.into_iter();

    for seed in &mut seeds {
        seed.poster_url = urls.next().flatten();
    }
    let recommendations = ranked
        .into_iter()
        .zip(urls)
        .map(|(movie, poster_url)| RecommendationItem { movie, poster_url })
        .collect();

    Ok(RecommendationResponse {
        seeds,
        recommendations,
    })
}

/// Looks up posters concurrently, one slot per id in input order
pub async fn lookup_posters(
    provider: Option<&dyn PosterProvider>,
    ids: &[MovieId],
) -> Vec<Option<String>> {
    let Some(provider) = provider else {
        return vec![None; ids.len()];
    };

    let lookups = ids.iter().map(|&id| async move {
        match provider.poster_url(id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    movie_id = id,
                    provider = provider.name(),
                    error = %e,
                    "Poster lookup failed"
                );
                None
            }
        }
    });

    join_all(lookups).await
}
