//! Poster lookup provider abstraction
//!
//! Posters are decoration on top of recommendations: a provider returning `None`
//! or an error never fails a recommendation request.

use crate::{error::AppResult, models::MovieId};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for poster/metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterProvider: Send + Sync {
    /// Fetch a display image URL for a movie
    ///
    /// `Ok(None)` means the provider has no poster for this movie.
    async fn poster_url(&self, movie_id: MovieId) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
