// ============================================================================
// TMDB API Types
// ============================================================================

use serde::Deserialize;

/// API response from GET /configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbConfiguration {
    #[serde(default)]
    pub images: Option<TmdbImagesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImagesConfig {
    pub secure_base_url: String,
    #[serde(default)]
    pub poster_sizes: Vec<String>,
}

/// API response from GET /movie/{id}/images
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbImages {
    #[serde(default)]
    pub posters: Vec<TmdbPoster>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPoster {
    pub file_path: String,
}
