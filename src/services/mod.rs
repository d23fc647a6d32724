pub mod catalog;
pub mod providers;
pub mod recommendations;
pub mod recommender;
pub mod vector_index;

pub use catalog::{CatalogError, MovieCatalog};
pub use recommender::{RecommendError, Recommender};
pub use vector_index::{IndexError, VectorIndex};
