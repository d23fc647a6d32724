use std::sync::Arc;

use crate::services::{
    providers::PosterProvider, recommendations::RecommendationLimits, MovieCatalog, Recommender,
};

/// Shared application state
///
/// Everything here is built once at startup and read-only afterwards, so the
/// state is cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub posters: Option<Arc<dyn PosterProvider>>,
    pub limits: RecommendationLimits,
}

impl AppState {
    /// Creates the state around an already built catalog
    pub fn new(
        catalog: Arc<MovieCatalog>,
        posters: Option<Arc<dyn PosterProvider>>,
        limits: RecommendationLimits,
    ) -> Self {
        Self {
            recommender: Arc::new(Recommender::new(catalog)),
            posters,
            limits,
        }
    }

    pub fn catalog(&self) -> &MovieCatalog {
        self.recommender.catalog()
    }
}
