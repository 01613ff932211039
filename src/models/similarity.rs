use std::collections::HashMap;

use super::{Catalog, GenreVocabulary, MovieId};
use crate::error::{AppError, AppResult};

/// Square cosine-similarity matrix indexed by movie id on both axes.
///
/// Values are stored row-major. Rows and columns share the same id order.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    ids: Vec<MovieId>,
    index: HashMap<MovieId, usize>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds a matrix from ids and rows given in the same order
    pub fn new(ids: Vec<MovieId>, rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let n = ids.len();
        if rows.len() != n {
            return Err(AppError::Artifact(format!(
                "similarity matrix has {} ids but {} rows",
                n,
                rows.len()
            )));
        }

        let mut index = HashMap::with_capacity(n);
        for (position, id) in ids.iter().enumerate() {
            if index.insert(*id, position).is_some() {
                return Err(AppError::Artifact(format!(
                    "movie {} appears twice on the similarity matrix axis",
                    id
                )));
            }
        }

        let mut values = Vec::with_capacity(n * n);
        for (id, row) in ids.iter().zip(rows) {
            if row.len() != n {
                return Err(AppError::Artifact(format!(
                    "similarity row for movie {} has {} values, expected {}",
                    id,
                    row.len(),
                    n
                )));
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(AppError::Artifact(format!(
                    "similarity row for movie {} contains non-finite value {}",
                    id, bad
                )));
            }
            values.extend(row);
        }

        Ok(Self { ids, index, values })
    }

    /// Cosine similarity between the genre multi-hot vectors of every catalog movie.
    ///
    /// The diagonal is pinned to 1.0, including movies without any genre label.
    pub fn from_genres(catalog: &Catalog) -> Self {
        let vocabulary = GenreVocabulary::from_catalog(catalog);
        let label_index: HashMap<&str, usize> = vocabulary
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();

        let encoded: Vec<Vec<usize>> = catalog
            .entries()
            .iter()
            .map(|entry| {
                let mut hot: Vec<usize> = entry
                    .genre_labels()
                    .filter_map(|label| label_index.get(label).copied())
                    .collect();
                hot.sort_unstable();
                hot.dedup();
                hot
            })
            .collect();

        let ids: Vec<MovieId> = catalog.entries().iter().map(|e| e.movie_id).collect();
        let n = ids.len();
        let mut values = vec![0.0; n * n];

        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let similarity = multi_hot_cosine(&encoded[i], &encoded[j]);
                values[i * n + j] = similarity;
                values[j * n + i] = similarity;
            }
        }

        let index = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        tracing::debug!(movies = n, genres = vocabulary.len(), "Built genre similarity matrix");

        Self { ids, index, values }
    }

    /// Axis ids, in row/column order
    pub fn ids(&self) -> &[MovieId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.index.contains_key(&movie_id)
    }

    pub fn row(&self, movie_id: MovieId) -> Option<&[f64]> {
        let n = self.ids.len();
        self.index
            .get(&movie_id)
            .map(|&i| &self.values[i * n..(i + 1) * n])
    }

    pub fn get(&self, row: MovieId, column: MovieId) -> Option<f64> {
        let column = *self.index.get(&column)?;
        self.row(row).map(|values| values[column])
    }

    /// Column-wise mean of the rows for `movie_ids`.
    ///
    /// An empty id set yields an empty row.
    pub fn mean_row(&self, movie_ids: &[MovieId]) -> AppResult<Vec<f64>> {
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sums = vec![0.0; self.ids.len()];
        for &movie_id in movie_ids {
            let row = self
                .row(movie_id)
                .ok_or_else(|| AppError::missing_from_matrix(movie_id))?;
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }

        let count = movie_ids.len() as f64;
        Ok(sums.into_iter().map(|sum| sum / count).collect())
    }

    /// Pairs each value in `row` with its column id and sorts by value, highest first.
    ///
    /// Equal values keep column order.
    pub fn rank(&self, row: &[f64]) -> Vec<(MovieId, f64)> {
        let mut ranked: Vec<(MovieId, f64)> = self
            .ids
            .iter()
            .copied()
            .zip(row.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

fn multi_hot_cosine(a: &[usize], b: &[usize]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (mut i, mut j, mut shared) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }

    shared as f64 / ((a.len() * b.len()) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;

    fn ids(raw: &[u32]) -> Vec<MovieId> {
        raw.iter().copied().map(MovieId).collect()
    }

    fn three_by_three() -> SimilarityMatrix {
        SimilarityMatrix::new(
            ids(&[10, 20, 30]),
            vec![
                vec![1.0, 0.2, 0.8],
                vec![0.2, 1.0, 0.4],
                vec![0.8, 0.4, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_row_and_get() {
        let matrix = three_by_three();
        assert_eq!(matrix.row(MovieId(20)), Some(&[0.2, 1.0, 0.4][..]));
        assert_eq!(matrix.get(MovieId(30), MovieId(10)), Some(0.8));
        assert!(matrix.row(MovieId(99)).is_none());
    }

    #[test]
    fn test_rejects_non_square_rows() {
        let result = SimilarityMatrix::new(ids(&[1, 2]), vec![vec![1.0, 0.0], vec![0.0]]);
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let result = SimilarityMatrix::new(ids(&[1]), vec![vec![f64::NAN]]);
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_mean_row_is_column_wise_average() {
        let matrix = three_by_three();
        let mean = matrix.mean_row(&ids(&[10, 30])).unwrap();
        let expected = [0.9, 0.3, 0.9];
        assert_eq!(mean.len(), expected.len());
        for (got, want) in mean.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn test_mean_row_reports_missing_id() {
        let matrix = three_by_three();
        let err = matrix.mean_row(&ids(&[10, 99])).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity { movie_id: MovieId(99), .. }));
    }

    #[test]
    fn test_rank_sorts_descending_and_keeps_column_order_on_ties() {
        let matrix = three_by_three();
        let ranked = matrix.rank(&[0.5, 0.9, 0.5]);
        assert_eq!(
            ranked,
            vec![(MovieId(20), 0.9), (MovieId(10), 0.5), (MovieId(30), 0.5)]
        );
    }

    #[test]
    fn test_from_genres_cosine() {
        let catalog = Catalog::new(vec![
            CatalogEntry::new(1, "toy story", "Animation|Comedy", 4.0),
            CatalogEntry::new(2, "grumpier old men", "Comedy|Romance", 3.0),
            CatalogEntry::new(3, "heat", "Action|Crime", 4.0),
            CatalogEntry::new(4, "no genres", "", 3.0),
        ])
        .unwrap();
        let matrix = SimilarityMatrix::from_genres(&catalog);

        assert_eq!(matrix.ids(), &ids(&[1, 2, 3, 4])[..]);
        assert!((matrix.get(MovieId(1), MovieId(2)).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(matrix.get(MovieId(1), MovieId(3)), Some(0.0));
        assert_eq!(matrix.get(MovieId(4), MovieId(4)), Some(1.0));
        assert_eq!(matrix.get(MovieId(2), MovieId(1)), matrix.get(MovieId(1), MovieId(2)));
    }
}
