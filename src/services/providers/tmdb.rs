//! TMDB poster provider
//!
//! API Flow:
//! 1. Configuration: /configuration → image base URL and available poster sizes (once, at startup)
//! 2. Posters: /movie/{id}/images → list of poster file paths, first one wins

use std::time::Duration;

use reqwest::{header::ACCEPT, Client as HttpClient, StatusCode};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MovieId, TmdbConfiguration, TmdbImages, TmdbImagesConfig},
    services::providers::PosterProvider,
};

const POSTER_CACHE_TTL: u64 = 604800; // 1 week
const CONFIG_TIMEOUT: Duration = Duration::from_secs(10);
const IMAGES_TIMEOUT: Duration = Duration::from_secs(5);
const IMAGE_LANGUAGE: &str = "en";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    token: String,
    api_url: String,
    image_base_url: String,
    poster_size: String,
    cache: Cache,
}

impl TmdbProvider {
    /// Creates the provider after fetching TMDB's image configuration
    pub async fn connect(
        cache: Cache,
        token: String,
        api_url: String,
        poster_size: String,
    ) -> AppResult<Self> {
        let http_client = HttpClient::new();
        let images = Self::fetch_configuration(&http_client, &token, &api_url).await?;

        if !images.poster_sizes.iter().any(|s| s == &poster_size) {
            tracing::warn!(
                poster_size = %poster_size,
                available = ?images.poster_sizes,
                "Configured poster size is not offered by TMDB"
            );
        }

        tracing::info!(
            image_base_url = %images.secure_base_url,
            poster_size = %poster_size,
            "TMDB configuration loaded"
        );

        Ok(Self {
            http_client,
            token,
            api_url,
            image_base_url: images.secure_base_url,
            poster_size,
            cache,
        })
    }

    async fn fetch_configuration(
        http_client: &HttpClient,
        token: &str,
        api_url: &str,
    ) -> AppResult<TmdbImagesConfig> {
        let url = format!("{}/configuration", api_url);
        let response = http_client
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .timeout(CONFIG_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB configuration returned status {}: {}",
                status, body
            )));
        }

        let config: TmdbConfiguration = response.json().await?;
        config.images.ok_or_else(|| {
            AppError::ExternalApi("TMDB configuration response missing images".to_string())
        })
    }

    async fn fetch_poster(&self, movie_id: MovieId) -> AppResult<Option<String>> {
        let url = format!("{}/movie/{}/images", self.api_url, movie_id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .query(&[("language", IMAGE_LANGUAGE)])
            .timeout(IMAGES_TIMEOUT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(movie_id, "TMDB has no such movie");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB images returned status {}: {}",
                status, body
            )));
        }

        let images: TmdbImages = response.json().await?;
        let poster = first_poster_url(&self.image_base_url, &self.poster_size, &images);

        tracing::debug!(
            movie_id,
            found = poster.is_some(),
            provider = "tmdb",
            "Poster fetched"
        );

        Ok(poster)
    }
}

/// `{base}{size}{file_path}` for the first listed poster
fn first_poster_url(base_url: &str, size: &str, images: &TmdbImages) -> Option<String> {
    images
        .posters
        .first()
        .map(|poster| format!("{}{}{}", base_url, size, poster.file_path))
}

#[async_trait::async_trait]
impl PosterProvider for TmdbProvider {
    async fn poster_url(&self, movie_id: MovieId) -> AppResult<Option<String>> {
        cached!(
            self.cache,
            CacheKey::Poster {
                movie_id,
                size: self.poster_size.clone(),
            },
            POSTER_CACHE_TTL,
            self.fetch_poster(movie_id)
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
