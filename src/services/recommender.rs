use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        Catalog, GenreVocabulary, MovieId, PredictedMovie, RankedMovie, SimilarityMatrix,
    },
    services::fuzzy::{ApproximateMatcher, WeightedRatio},
};

/// Minimum fuzzy score (exclusive) for a query to count as a genre
pub const FUZZY_MATCH_THRESHOLD: f64 = 80.0;

/// Number of movies returned when the caller does not choose
pub const DEFAULT_TOP_K: usize = 5;

/// How a query was resolved against the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum MatchTier {
    /// The query is a movie title
    Title { movie_id: MovieId },
    /// The query occurs inside at least one genres string
    Genre { fragment: String },
    /// The query is close enough to a known genre label
    FuzzyGenre { label: String, score: f64 },
}

/// A resolved query: the tier that matched and the movies whose similarity rows seed the ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tier: MatchTier,
    pub seeds: Vec<MovieId>,
}

/// Title/genre lookup and ranking over the catalog and similarity matrix.
///
/// Holds read-only data shared for the life of the process; every call is a
/// pure query over it.
pub struct Recommender {
    catalog: Arc<Catalog>,
    matrix: Arc<SimilarityMatrix>,
    vocabulary: GenreVocabulary,
    matcher: Box<dyn ApproximateMatcher>,
}

impl Recommender {
    /// Creates a recommender using the default weighted-ratio genre matcher
    pub fn new(catalog: Arc<Catalog>, matrix: Arc<SimilarityMatrix>) -> Self {
        let vocabulary = GenreVocabulary::from_catalog(&catalog);
        Self {
            catalog,
            matrix,
            vocabulary,
            matcher: Box::new(WeightedRatio),
        }
    }

    /// Replaces the genre matcher
    pub fn with_matcher(mut self, matcher: Box<dyn ApproximateMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vocabulary(&self) -> &GenreVocabulary {
        &self.vocabulary
    }

    /// Resolves a query by exact title, then genre substring, then fuzzy genre label.
    pub fn resolve(&self, query: &str) -> Option<Resolution> {
        if let Some(entry) = self.catalog.find_title(query) {
            return Some(Resolution {
                tier: MatchTier::Title {
                    movie_id: entry.movie_id,
                },
                seeds: vec![entry.movie_id],
            });
        }

        let genre_ids = self.catalog.ids_with_genre(query);
        if !genre_ids.is_empty() {
            return Some(Resolution {
                tier: MatchTier::Genre {
                    fragment: query.to_string(),
                },
                seeds: genre_ids,
            });
        }

        let candidate = self.matcher.best_match(query, self.vocabulary.labels())?;
        if candidate.score <= FUZZY_MATCH_THRESHOLD {
            tracing::debug!(
                query = %query,
                closest = %candidate.label,
                score = candidate.score,
                "Closest genre below fuzzy threshold"
            );
            return None;
        }

        let seeds = self.catalog.ids_with_genre(&candidate.label);
        if seeds.is_empty() {
            return None;
        }

        Some(Resolution {
            tier: MatchTier::FuzzyGenre {
                label: candidate.label,
                score: candidate.score,
            },
            seeds,
        })
    }

    /// Movies most similar to a title or genre query, highest similarity first.
    ///
    /// An empty result means nothing matched. `rating` is not used for ranking
    /// and is not range checked.
    pub fn recommend(
        &self,
        query: &str,
        rating: f64,
        top_k: usize,
    ) -> AppResult<Vec<RankedMovie>> {
        let Some(resolution) = self.resolve(query) else {
            tracing::info!(query = %query, rating, "No movie or genre matched query");
            return Ok(Vec::new());
        };

        let movies = self.rank_resolution(&resolution, top_k)?;

        tracing::info!(
            query = %query,
            rating,
            tier = ?resolution.tier,
            seed_count = resolution.seeds.len(),
            result_count = movies.len(),
            "Recommendations computed"
        );

        Ok(movies)
    }

    /// Top `top_k` movies for an already resolved query.
    ///
    /// A title ranks by its own similarity row without itself; genre tiers rank
    /// by the mean row of every seed movie.
    pub fn rank_resolution(
        &self,
        resolution: &Resolution,
        top_k: usize,
    ) -> AppResult<Vec<RankedMovie>> {
        let selected: Vec<(MovieId, f64)> = match &resolution.tier {
            MatchTier::Title { movie_id } => {
                let row = self
                    .matrix
                    .row(*movie_id)
                    .ok_or_else(|| AppError::missing_from_matrix(*movie_id))?;
                self.matrix
                    .rank(row)
                    .into_iter()
                    .filter(|(id, _)| id != movie_id)
                    .take(top_k)
                    .collect()
            }
            MatchTier::Genre { .. } | MatchTier::FuzzyGenre { .. } => {
                let mean = self.matrix.mean_row(&resolution.seeds)?;
                self.matrix.rank(&mean).into_iter().take(top_k).collect()
            }
        };

        self.attach_entries(selected)
    }

    /// Heuristic ratings for movies resembling an unseen title of the given genre.
    ///
    /// Recommends for `genre_query`, re-ranks the catalog by mean similarity to
    /// those recommendations, skips the top-ranked movie and predicts
    /// `(rating + mode_rating) / 2` for each of the next `top_k`. Returns
    /// `Ok(None)` when the genre query matches nothing.
    pub fn predict_unseen_rating(
        &self,
        rating: f64,
        genre_query: &str,
        top_k: usize,
    ) -> AppResult<Option<Vec<PredictedMovie>>> {
        let recommended = self.recommend(genre_query, rating, top_k)?;
        if recommended.is_empty() {
            tracing::info!(
                genre = %genre_query,
                "No recommendations found for unseen movie genre"
            );
            return Ok(None);
        }

        let ids: Vec<MovieId> = recommended.iter().map(|r| r.movie.movie_id).collect();
        let mean = self.matrix.mean_row(&ids)?;

        let predictions = self
            .matrix
            .rank(&mean)
            .into_iter()
            .skip(1)
            .take(top_k)
            .map(|(movie_id, similarity)| {
                let movie = self
                    .catalog
                    .get(movie_id)
                    .ok_or_else(|| AppError::missing_from_catalog(movie_id))?
                    .clone();
                let predicted_rating = (rating + movie.mode_rating) / 2.0;
                Ok(PredictedMovie {
                    movie,
                    similarity,
                    predicted_rating,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!(
            genre = %genre_query,
            rating,
            predicted = ?predictions.first().map(|p| p.predicted_rating),
            count = predictions.len(),
            "Predicted ratings for unseen movie"
        );

        Ok(Some(predictions))
    }

    fn attach_entries(&self, selected: Vec<(MovieId, f64)>) -> AppResult<Vec<RankedMovie>> {
        selected
            .into_iter()
            .map(|(movie_id, similarity)| {
                let movie = self
                    .catalog
                    .get(movie_id)
                    .ok_or_else(|| AppError::missing_from_catalog(movie_id))?
                    .clone();
                Ok(RankedMovie { movie, similarity })
            })
            .collect()
    }
}
