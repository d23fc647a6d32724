use serde::{Deserialize, Serialize};

pub mod movie;
pub mod tmdb;

pub use movie::{CatalogSnapshot, Movie, MovieEmbedding, MovieId, RecommendedMovie};
pub use tmdb::{TmdbConfiguration, TmdbImages, TmdbImagesConfig, TmdbPoster};

/// Movie as returned to the client, optionally with a poster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub vote_average: f64,
    pub genres: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            vote_average: movie.vote_average,
            genres: movie.genres.clone(),
            poster_url: None,
        }
    }
}

/// Request to blend two seed movies into recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub seed_id1: MovieId,
    pub seed_id2: MovieId,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// One recommended movie with its scores and an optional poster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationItem {
    #[serde(flatten)]
    pub movie: RecommendedMovie,
    pub poster_url: Option<String>,
}

/// Response with both seeds and the ranked recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub seeds: Vec<MovieSummary>,
    pub recommendations: Vec<RecommendationItem>,
}
