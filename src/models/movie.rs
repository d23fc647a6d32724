use serde::{Deserialize, Serialize};

/// External, stable movie identifier (TMDB id)
pub type MovieId = i64;

/// A movie record from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Free-text synopsis
    #[serde(default)]
    pub overview: String,
    pub vote_average: f64,
    /// Space-separated genre tags, e.g. "Action Science Fiction"
    #[serde(default)]
    pub genres: String,
}

impl Movie {
    /// Genre tags as an iterator of whitespace-separated tokens
    pub fn genre_tokens(&self) -> impl Iterator<Item = &str> {
        self.genres.split_whitespace()
    }
}

/// Pre-computed unit-length embedding for one movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieEmbedding {
    pub id: MovieId,
    pub vector: Vec<f32>,
}

/// On-disk catalog: movie records plus their embeddings, aligned by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub movies: Vec<Movie>,
    pub embeddings: Vec<MovieEmbedding>,
}

/// A recommended movie with the scores it was ranked by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    pub vote_average: f64,
    pub genres: String,
    /// Fraction of the combined seed genres this movie shares
    pub genre_score: f64,
    /// Minimum of the similarities to both seeds
    pub blended_score: f32,
}
