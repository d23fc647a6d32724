use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{MovieId, MovieSummary, RecommendationRequest, RecommendationResponse},
    services::recommendations,
};

use super::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub movies: usize,
    pub catalog_loaded_at: chrono::DateTime<chrono::Utc>,
    pub posters_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
    /// Only return the first movie whose title is exactly `q`
    #[serde(default)]
    pub exact: bool,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let catalog = state.catalog();
    Json(HealthResponse {
        status: "healthy",
        movies: catalog.len(),
        catalog_loaded_at: catalog.loaded_at(),
        posters_enabled: state.posters.is_some(),
    })
}

/// Search movies by title, used to pick seeds
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let catalog = state.catalog();
    if params.exact {
        let found = catalog.find_by_title(&params.q).map(MovieSummary::from);
        return Ok(Json(found.into_iter().collect()));
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    let movies = catalog
        .search_titles(&params.q, limit)
        .into_iter()
        .map(MovieSummary::from)
        .collect();

    Ok(Json(movies))
}

/// Get a single movie with its poster
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<MovieSummary>> {
    let mut movie = state
        .catalog()
        .movie(id)
        .map(MovieSummary::from)
        .ok_or_else(|| AppError::NotFound(format!("Movie ID {} not found", id)))?;

    movie.poster_url = recommendations::lookup_posters(state.posters.as_deref(), &[id])
        .await
        .pop()
        .flatten();

    Ok(Json(movie))
}

/// Blend two seed movies into recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        seed_id1 = request.seed_id1,
        seed_id2 = request.seed_id2,
        top_n = ?request.top_n,
        "Processing recommendation request"
    );

    let response = recommendations::get_recommendations(
        state.recommender.clone(),
        state.posters.clone(),
        state.limits,
        request.seed_id1,
        request.seed_id2,
        request.top_n,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        count = response.recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(response))
}
