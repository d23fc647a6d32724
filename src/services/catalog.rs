use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    models::{CatalogSnapshot, Movie, MovieId},
    services::vector_index::{IndexError, VectorIndex},
};

const UNIT_NORM_TOLERANCE: f32 = 1e-3;

/// Error types raised while assembling the catalog at startup
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate movie id in catalog: {0}")]
    DuplicateMovieId(MovieId),
    #[error("Duplicate embedding for movie id: {0}")]
    DuplicateEmbedding(MovieId),
    #[error("Embedding references movie id {0} which is not in the catalog")]
    MissingMovie(MovieId),
    #[error("Failed to build vector index: {0}")]
    Index(#[from] IndexError),
}

/// Movie records, their embeddings and the id ↔ row mapping
///
/// Built once at startup and read-only afterwards; share it behind an `Arc`.
/// Row `i` of the index is the embedding of `movies[i]`.
#[derive(Debug)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
    id_to_row: HashMap<MovieId, usize>,
    index: VectorIndex,
    loaded_at: DateTime<Utc>,
}

impl MovieCatalog {
    /// Reads a JSON snapshot from disk and builds the catalog
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            movies = snapshot.movies.len(),
            embeddings = snapshot.embeddings.len(),
            "Catalog snapshot read"
        );

        Self::from_snapshot(snapshot)
    }

    /// Aligns movies with their embeddings and builds the vector index
    ///
    /// Every embedding must belong to a catalog movie. Movies without an embedding
    /// are left out of the index since they cannot be recommended.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(snapshot.movies.len());
        for movie in &snapshot.movies {
            if !seen.insert(movie.id) {
                return Err(CatalogError::DuplicateMovieId(movie.id));
            }
        }

        let mut vectors_by_id = HashMap::with_capacity(snapshot.embeddings.len());
        for embedding in snapshot.embeddings {
            if !seen.contains(&embedding.id) {
                return Err(CatalogError::MissingMovie(embedding.id));
            }
            if vectors_by_id.insert(embedding.id, embedding.vector).is_some() {
                return Err(CatalogError::DuplicateEmbedding(embedding.id));
            }
        }

        let total = snapshot.movies.len();
        let mut movies = Vec::with_capacity(vectors_by_id.len());
        let mut vectors = Vec::with_capacity(vectors_by_id.len());
        for movie in snapshot.movies {
            if let Some(vector) = vectors_by_id.remove(&movie.id) {
                movies.push(movie);
                vectors.push(vector);
            }
        }

        if movies.len() < total {
            tracing::warn!(
                skipped = total - movies.len(),
                "Movies without embeddings excluded from index"
            );
        }

        let off_norm = vectors
            .iter()
            .filter(|v| (l2_norm(v) - 1.0).abs() > UNIT_NORM_TOLERANCE)
            .count();
        if off_norm > 0 {
            tracing::warn!(count = off_norm, "Embeddings are not unit length");
        }

        let index = VectorIndex::build(&vectors)?;
        let id_to_row = movies
            .iter()
            .enumerate()
            .map(|(row, movie)| (movie.id, row))
            .collect();

        tracing::info!(
            movies = movies.len(),
            dim = index.dim(),
            "Vector index built"
        );

        Ok(Self {
            movies,
            id_to_row,
            index,
            loaded_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Row index for a movie id, if the movie was indexed
    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.id_to_row.get(&id).copied()
    }

    pub fn movie_at(&self, row: usize) -> Option<&Movie> {
        self.movies.get(row)
    }

    pub fn movie(&self, id: MovieId) -> Option<&Movie> {
        self.row_of(id).and_then(|row| self.movie_at(row))
    }

    /// First movie whose title matches exactly
    pub fn find_by_title(&self, title: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.title == title)
    }

    /// Case-insensitive substring search over titles, in catalog order
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        self.movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieEmbedding;

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            vote_average: 7.0,
            genres: "Drama".to_string(),
        }
    }

    fn embedding(id: MovieId, vector: [f32; 2]) -> MovieEmbedding {
        MovieEmbedding {
            id,
            vector: vector.to_vec(),
        }
    }

    #[test]
    fn test_from_snapshot_assigns_rows_in_movie_order() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(30, "C"), movie(10, "A"), movie(20, "B")],
            embeddings: vec![
                embedding(10, [1.0, 0.0]),
                embedding(20, [0.0, 1.0]),
                embedding(30, [0.6, 0.8]),
            ],
        };

        let catalog = MovieCatalog::from_snapshot(snapshot).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.row_of(30), Some(0));
        assert_eq!(catalog.row_of(10), Some(1));
        assert_eq!(catalog.row_of(20), Some(2));
        assert_eq!(catalog.index().vector(0), Some(&[0.6, 0.8][..]));
        assert_eq!(catalog.movie(20).unwrap().title, "B");
    }

    #[test]
    fn test_from_snapshot_skips_movies_without_embedding() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(1, "A"), movie(2, "B")],
            embeddings: vec![embedding(2, [1.0, 0.0])],
        };

        let catalog = MovieCatalog::from_snapshot(snapshot).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.row_of(1), None);
        assert_eq!(catalog.row_of(2), Some(0));
    }

    #[test]
    fn test_from_snapshot_missing_movie() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(1, "A")],
            embeddings: vec![embedding(1, [1.0, 0.0]), embedding(99, [0.0, 1.0])],
        };

        let result = MovieCatalog::from_snapshot(snapshot);
        assert!(matches!(result, Err(CatalogError::MissingMovie(99))));
    }

    #[test]
    fn test_from_snapshot_duplicate_movie() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(1, "A"), movie(1, "A again")],
            embeddings: vec![embedding(1, [1.0, 0.0])],
        };

        let result = MovieCatalog::from_snapshot(snapshot);
        assert!(matches!(result, Err(CatalogError::DuplicateMovieId(1))));
    }

    #[test]
    fn test_from_snapshot_duplicate_embedding() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(1, "A")],
            embeddings: vec![embedding(1, [1.0, 0.0]), embedding(1, [0.0, 1.0])],
        };

        let result = MovieCatalog::from_snapshot(snapshot);
        assert!(matches!(result, Err(CatalogError::DuplicateEmbedding(1))));
    }

    #[test]
    fn test_from_snapshot_empty() {
        let result = MovieCatalog::from_snapshot(CatalogSnapshot::default());
        assert!(matches!(
            result,
            Err(CatalogError::Index(IndexError::EmptyInput))
        ));
    }

    #[test]
    fn test_from_snapshot_dimension_mismatch() {
        let snapshot = CatalogSnapshot {
            movies: vec![movie(1, "A"), movie(2, "B")],
            embeddings: vec![
                embedding(1, [1.0, 0.0]),
                MovieEmbedding {
                    id: 2,
                    vector: vec![1.0, 0.0, 0.0],
                },
            ],
        };

        let result = MovieCatalog::from_snapshot(snapshot);
        assert!(matches!(
            result,
            Err(CatalogError::Index(IndexError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_search_titles_case_insensitive() {
        let snapshot = CatalogSnapshot {
            movies: vec![
                movie(1, "The Matrix"),
                movie(2, "The Matrix Reloaded"),
                movie(3, "Inception"),
            ],
            embeddings: vec![
                embedding(1, [1.0, 0.0]),
                embedding(2, [1.0, 0.0]),
                embedding(3, [0.0, 1.0]),
            ],
        };
        let catalog = MovieCatalog::from_snapshot(snapshot).unwrap();

        let ids: Vec<MovieId> = catalog
            .search_titles("  matrix", 10)
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(catalog.search_titles("the", 1).len(), 1);
        assert_eq!(catalog.find_by_title("Inception").unwrap().id, 3);
        assert!(catalog.find_by_title("inception").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("movie_blend_catalog_{}.json", std::process::id()));
        let json = r#"{
            "movies": [
                {"id": 603, "title": "The Matrix", "overview": "A hacker learns the truth.", "vote_average": 7.9, "genres": "Action Science Fiction"}
            ],
            "embeddings": [{"id": 603, "vector": [0.6, 0.8]}]
        }"#;
        std::fs::write(&path, json).unwrap();

        let catalog = MovieCatalog::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.movie(603).unwrap().genres, "Action Science Fiction");
    }

    #[test]
    fn test_load_missing_file() {
        let result = MovieCatalog::load("/nonexistent/catalog.json");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
