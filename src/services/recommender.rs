use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::{
    models::{MovieId, RecommendedMovie},
    services::{
        catalog::MovieCatalog,
        vector_index::{IndexError, Neighbor},
    },
};

/// Neighbors fetched per seed before merging; independent of `top_n`
pub const NEIGHBORS_PER_SEED: usize = 40;

const GENRE_EPSILON: f64 = 1e-9;

/// Error types for the recommendation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    #[error("Movie ID {0} not found")]
    UnknownMovieId(MovieId),
    #[error("Number of recommendations must be at least 1")]
    InvalidTopN,
    #[error("Row {0} has no movie record")]
    MissingRow(usize),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Blends two seed movies into a ranked list of recommendations
///
/// Each seed is searched independently, the two neighbor lists are merged and
/// every candidate is scored by the minimum of its similarities to the seeds,
/// so movies close to both seeds rank above movies close to only one.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<MovieCatalog>,
}

impl Recommender {
    pub fn new(catalog: Arc<MovieCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }

    /// Returns up to `top_n` movies blending `seed_id1` and `seed_id2`
    ///
    /// Seeds never appear in the output. Fewer than `top_n` entries are returned
    /// when the merged neighbor pool is smaller.
    pub fn recommend(
        &self,
        seed_id1: MovieId,
        seed_id2: MovieId,
        top_n: usize,
    ) -> Result<Vec<RecommendedMovie>, RecommendError> {
        if top_n == 0 {
            return Err(RecommendError::InvalidTopN);
        }

        // Both seeds resolve before any index query runs
        let [(idx1, emb1), (idx2, emb2)] = self.resolve_seeds(seed_id1, seed_id2)?;

        let catalog = &self.catalog;
        let index = catalog.index();
        let (hits1, hits2) = rayon::join(
            || index.search(emb1, NEIGHBORS_PER_SEED),
            || index.search(emb2, NEIGHBORS_PER_SEED),
        );
        let scores1 = score_map(&hits1?);
        let scores2 = score_map(&hits2?);

        let pool: HashSet<usize> = scores1.keys().chain(scores2.keys()).copied().collect();
        let pool_size = pool.len();

        let mut ranked: Vec<(usize, f32)> = pool
            .into_iter()
            .filter(|&row| row != idx1 && row != idx2)
            .map(|row| {
                let s1 = scores1.get(&row).copied().unwrap_or(0.0);
                let s2 = scores2.get(&row).copied().unwrap_or(0.0);
                (row, s1.min(s2))
            })
            .collect();
        ranked.sort_unstable_by(by_blended_score);
        ranked.truncate(top_n);

        tracing::debug!(
            seed_id1,
            seed_id2,
            pool = pool_size,
            returned = ranked.len(),
            "Candidates ranked"
        );

        let seed_genres = self.seed_genres(idx1, idx2);

        ranked
            .into_iter()
            .map(|(row, blended_score)| {
                let movie = catalog
                    .movie_at(row)
                    .ok_or(RecommendError::MissingRow(row))?;
                Ok(RecommendedMovie {
                    id: movie.id,
                    title: movie.title.clone(),
                    overview: movie.overview.clone(),
                    vote_average: movie.vote_average,
                    genres: movie.genres.clone(),
                    genre_score: genre_score(movie.genre_tokens(), &seed_genres),
                    blended_score,
                })
            })
            .collect()
    }

    /// Row and stored vector of each seed, in argument order
    fn resolve_seeds(
        &self,
        seed_id1: MovieId,
        seed_id2: MovieId,
    ) -> Result<[(usize, &[f32]); 2], RecommendError> {
        let resolve = |id: MovieId| {
            self.catalog
                .row_of(id)
                .and_then(|row| Some((row, self.catalog.index().vector(row)?)))
                .ok_or(RecommendError::UnknownMovieId(id))
        };
        Ok([resolve(seed_id1)?, resolve(seed_id2)?])
    }

    /// Union of both seeds' genre tags
    fn seed_genres(&self, idx1: usize, idx2: usize) -> HashSet<&str> {
        [idx1, idx2]
            .into_iter()
            .filter_map(|row| self.catalog.movie_at(row))
            .flat_map(|movie| movie.genre_tokens())
            .collect()
    }
}

fn score_map(hits: &[Neighbor]) -> HashMap<usize, f32> {
    hits.iter().map(|hit| (hit.row, hit.score)).collect()
}

/// Blended score descending, then row ascending
fn by_blended_score(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Share of `seed_genres` present in `genres`
fn genre_score<'a>(genres: impl Iterator<Item = &'a str>, seed_genres: &HashSet<&str>) -> f64 {
    let genres: HashSet<&str> = genres.collect();
    let overlap = genres.intersection(seed_genres).count();
    overlap as f64 / (seed_genres.len() as f64 + GENRE_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogSnapshot, Movie, MovieEmbedding};
    use std::f32::consts::FRAC_1_SQRT_2;

    fn unit(angle_degrees: f32) -> Vec<f32> {
        let radians = angle_degrees.to_radians();
        vec![radians.cos(), radians.sin()]
    }

    fn recommender(entries: Vec<(MovieId, &str, Vec<f32>)>) -> Recommender {
        let mut snapshot = CatalogSnapshot::default();
        for (id, genres, vector) in entries {
            snapshot.movies.push(Movie {
                id,
                title: format!("Movie {}", id),
                overview: format!("Overview {}", id),
                vote_average: 6.5,
                genres: genres.to_string(),
            });
            snapshot.embeddings.push(MovieEmbedding { id, vector });
        }
        Recommender::new(Arc::new(MovieCatalog::from_snapshot(snapshot).unwrap()))
    }

    /// Five movies on the unit circle with hand-picked genres
    fn toy_recommender() -> Recommender {
        recommender(vec![
            (10, "Action Thriller", vec![1.0, 0.0]),
            (20, "Comedy Romance", vec![0.0, 1.0]),
            (30, "Action Comedy", vec![FRAC_1_SQRT_2, FRAC_1_SQRT_2]),
            (40, "Action Drama", vec![0.8, 0.6]),
            (50, "Horror", vec![-1.0, 0.0]),
        ])
    }

    /// Points spread over the upper half circle, ids 1000 + i
    fn arc_recommender(count: usize) -> Recommender {
        let step = 180.0 / (count - 1) as f32;
        recommender(
            (0..count)
                .map(|i| (1000 + i as MovieId, "Drama", unit(i as f32 * step)))
                .collect(),
        )
    }

    #[test]
    fn test_toy_corpus_scores_and_order() {
        let recs = toy_recommender().recommend(10, 20, 3).unwrap();

        let ids: Vec<MovieId> = recs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![30, 40, 50]);

        assert!((recs[0].blended_score - FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((recs[1].blended_score - 0.6).abs() < 1e-6);
        // Opposite to seed 1 and orthogonal to seed 2
        assert!((recs[2].blended_score - -1.0).abs() < 1e-6);

        assert!((recs[0].genre_score - 0.5).abs() < 1e-6);
        assert!((recs[1].genre_score - 0.25).abs() < 1e-6);
        assert_eq!(recs[2].genre_score, 0.0);

        assert_eq!(recs[0].title, "Movie 30");
        assert_eq!(recs[0].overview, "Overview 30");
        assert_eq!(recs[0].genres, "Action Comedy");
    }

    #[test]
    fn test_genre_score_does_not_reorder() {
        // Movie 40 matches more seed genres but has the lower blended score
        let recs = recommender(vec![
            (1, "Action", vec![1.0, 0.0]),
            (2, "Comedy", vec![0.0, 1.0]),
            (3, "Horror", vec![FRAC_1_SQRT_2, FRAC_1_SQRT_2]),
            (4, "Action Comedy", vec![0.8, 0.6]),
        ])
        .recommend(1, 2, 2)
        .unwrap();

        let ids: Vec<MovieId> = recs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert!(recs[1].genre_score > recs[0].genre_score);
    }

    #[test]
    fn test_seeds_are_excluded() {
        let engine = arc_recommender(30);
        let recs = engine.recommend(1005, 1010, 40).unwrap();

        assert!(recs.iter().all(|r| r.id != 1005 && r.id != 1010));
        assert_eq!(recs.len(), 28);
    }

    #[test]
    fn test_shortfall_returns_fewer() {
        let recs = toy_recommender().recommend(10, 20, 10).unwrap();
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_same_seed_twice() {
        let recs = toy_recommender().recommend(10, 10, 10).unwrap();

        assert_eq!(recs.len(), 4);
        assert!(recs.iter().all(|r| r.id != 10));
        // Both lists are identical, so blended equals plain similarity
        assert_eq!(recs[0].id, 40);
        assert!((recs[0].blended_score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_seed() {
        let engine = toy_recommender();

        assert_eq!(
            engine.recommend(999_999_999, 20, 3).unwrap_err(),
            RecommendError::UnknownMovieId(999_999_999)
        );
        assert_eq!(
            engine.recommend(10, 999_999_999, 3).unwrap_err(),
            RecommendError::UnknownMovieId(999_999_999)
        );
    }

    #[test]
    fn test_resolve_seeds_checks_both_ids() {
        let engine = toy_recommender();

        let [(row1, emb1), (row2, emb2)] = engine.resolve_seeds(10, 20).unwrap();
        assert_eq!((row1, row2), (0, 1));
        assert_eq!(emb1, &[1.0, 0.0][..]);
        assert_eq!(emb2, &[0.0, 1.0][..]);

        // The first unknown id is reported, with nothing looked up past it
        assert_eq!(
            engine.resolve_seeds(777, 888).unwrap_err(),
            RecommendError::UnknownMovieId(777)
        );
        assert_eq!(
            engine.resolve_seeds(10, 888).unwrap_err(),
            RecommendError::UnknownMovieId(888)
        );
    }

    #[test]
    fn test_zero_top_n() {
        assert_eq!(
            toy_recommender().recommend(10, 20, 0).unwrap_err(),
            RecommendError::InvalidTopN
        );
    }

    #[test]
    fn test_candidate_in_one_list_scores_zero() {
        // With 181 points one degree apart, each seed's 40 neighbors stay within
        // 20 degrees, so the two lists around 0 and 90 degrees do not overlap.
        let engine = arc_recommender(181);
        let recs = engine.recommend(1000, 1090, 100).unwrap();

        assert_eq!(recs.len(), 78);
        assert!(recs.iter().all(|r| r.blended_score == 0.0));

        let ids: Vec<MovieId> = recs.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_overlapping_neighborhoods_rank_midpoint_first() {
        let engine = arc_recommender(181);
        let recs = engine.recommend(1040, 1060, 5).unwrap();

        assert_eq!(recs[0].id, 1050);
        let expected = 10f32.to_radians().cos();
        assert!((recs[0].blended_score - expected).abs() < 1e-5);
        assert!(recs
            .windows(2)
            .all(|w| w[0].blended_score >= w[1].blended_score));
    }

    #[test]
    fn test_deterministic() {
        let engine = arc_recommender(181);
        let first = engine.recommend(1030, 1070, 10).unwrap();
        let second = engine.recommend(1030, 1070, 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_symmetric() {
        let engine = arc_recommender(181);
        assert_eq!(
            engine.recommend(1030, 1070, 10).unwrap(),
            engine.recommend(1070, 1030, 10).unwrap()
        );

        let toy = toy_recommender();
        assert_eq!(
            toy.recommend(10, 20, 3).unwrap(),
            toy.recommend(20, 10, 3).unwrap()
        );
    }

    #[test]
    fn test_scores_bounded_for_non_negative_similarities() {
        let engine = recommender(
            (0..60)
                .map(|i| {
                    let genres = if i % 2 == 0 { "Drama War" } else { "Comedy" };
                    (i as MovieId, genres, unit(i as f32 * 1.5))
                })
                .collect(),
        );

        let recs = engine.recommend(0, 59, 20).unwrap();
        assert!(!recs.is_empty());
        for rec in &recs {
            assert!((0.0..=1.0).contains(&rec.blended_score));
            assert!((0.0..=1.0).contains(&rec.genre_score));
        }
    }

    #[test]
    fn test_untagged_seeds_give_zero_genre_score() {
        let recs = recommender(vec![
            (1, "", vec![1.0, 0.0]),
            (2, "", vec![0.0, 1.0]),
            (3, "Drama", vec![FRAC_1_SQRT_2, FRAC_1_SQRT_2]),
        ])
        .recommend(1, 2, 1)
        .unwrap();

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].genre_score, 0.0);
    }

    #[test]
    fn test_genre_score_counts_set_overlap() {
        let seeds: HashSet<&str> = ["Action", "Drama", "Crime"].into_iter().collect();
        let score = genre_score("Drama Drama Crime Family".split_whitespace(), &seeds);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }
}
