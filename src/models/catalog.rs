use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{CatalogEntry, MovieId};
use crate::error::{AppError, AppResult};

/// The movie catalog, kept in file order with an id index
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<MovieId, usize>,
    /// Lowercased titles and genres, parallel to `entries`
    folded_titles: Vec<String>,
    folded_genres: Vec<String>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate movie ids
    pub fn new(entries: Vec<CatalogEntry>) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.movie_id, position).is_some() {
                return Err(AppError::DataIntegrity {
                    movie_id: entry.movie_id,
                    detail: "appears more than once in the catalog".to_string(),
                });
            }
        }

        let folded_titles = entries
            .iter()
            .map(|entry| entry.normalized_title.to_lowercase())
            .collect();
        let folded_genres = entries
            .iter()
            .map(|entry| entry.genres.to_lowercase())
            .collect();

        Ok(Self {
            entries,
            index,
            folded_titles,
            folded_genres,
        })
    }

    pub fn get(&self, movie_id: MovieId) -> Option<&CatalogEntry> {
        self.index.get(&movie_id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.index.contains_key(&movie_id)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact title lookup.
    ///
    /// When several entries share a normalized title the first one in catalog
    /// order wins.
    pub fn find_title(&self, query: &str) -> Option<&CatalogEntry> {
        let needle = query.to_lowercase();
        self.folded_titles
            .iter()
            .position(|title| *title == needle)
            .map(|i| &self.entries[i])
    }

    /// Ids of every movie whose genres string contains `fragment`, ignoring case.
    ///
    /// This is a plain substring test over the whole pipe-delimited string, so
    /// "Sci" matches "Sci-Fi" and "Comedy|Drama" matches only that exact run.
    pub fn ids_with_genre(&self, fragment: &str) -> Vec<MovieId> {
        let needle = fragment.to_lowercase();
        self.folded_genres
            .iter()
            .zip(&self.entries)
            .filter(|(genres, _)| genres.contains(&needle))
            .map(|(_, entry)| entry.movie_id)
            .collect()
    }
}

/// Distinct genre labels across the catalog, in first-appearance order
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct GenreVocabulary {
    labels: Vec<String>,
}

impl GenreVocabulary {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();

        for entry in catalog.entries() {
            for label in entry.genre_labels() {
                if seen.insert(label) {
                    labels.push(label.to_string());
                }
            }
        }

        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
