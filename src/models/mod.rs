use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod catalog;
pub mod similarity;

pub use catalog::{Catalog, GenreVocabulary};
pub use similarity::SimilarityMatrix;

/// Catalog key shared by the catalog table and both axes of the similarity matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u32);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the movie catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    #[serde(rename(deserialize = "movieId"), alias = "movie_id")]
    pub movie_id: MovieId,
    pub normalized_title: String,
    /// Pipe-delimited genre labels, e.g. "Animation|Comedy"
    #[serde(default)]
    pub genres: String,
    /// Most frequent historical rating for the movie
    pub mode_rating: f64,
}

impl CatalogEntry {
    pub fn new(movie_id: u32, title: &str, genres: &str, mode_rating: f64) -> Self {
        Self {
            movie_id: MovieId(movie_id),
            normalized_title: title.to_string(),
            genres: genres.to_string(),
            mode_rating,
        }
    }

    /// Individual genre labels, in stored order, skipping empty segments
    pub fn genre_labels(&self) -> impl Iterator<Item = &str> {
        self.genres.split('|').filter(|g| !g.is_empty())
    }
}

/// A recommended movie together with the similarity score that ranked it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedMovie {
    #[serde(flatten)]
    pub movie: CatalogEntry,
    pub similarity: f64,
}

/// A movie similar to an unseen title, annotated with the heuristic predicted rating
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictedMovie {
    #[serde(flatten)]
    pub movie: CatalogEntry,
    pub similarity: f64,
    /// Mean of the user's rating and this movie's mode rating
    pub predicted_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_display() {
        assert_eq!(format!("{}", MovieId(318)), "318");
    }

    #[test]
    fn test_genre_labels_skip_empty_segments() {
        let entry = CatalogEntry::new(1, "toy story", "Animation||Comedy", 4.0);
        let labels: Vec<&str> = entry.genre_labels().collect();
        assert_eq!(labels, vec!["Animation", "Comedy"]);

        let bare = CatalogEntry::new(2, "untitled", "", 3.0);
        assert_eq!(bare.genre_labels().count(), 0);
    }

    #[test]
    fn test_ranked_movie_serializes_flat() {
        let ranked = RankedMovie {
            movie: CatalogEntry::new(1, "toy story", "Animation|Comedy", 4.0),
            similarity: 0.5,
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["movie_id"], 1);
        assert_eq!(json["normalized_title"], "toy story");
        assert_eq!(json["similarity"], 0.5);
    }
}
