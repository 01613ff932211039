//! Loading of the offline-built catalog and similarity matrix.
//!
//! Both artifacts are CSV files. The catalog has the columns
//! `movieId,normalized_title,genres,mode_rating`. The similarity matrix has a
//! header `movieId,<id>,<id>,...` followed by one row per id, in header order.

use std::{fs::File, io::Read, path::Path};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Catalog, CatalogEntry, MovieId, SimilarityMatrix},
};

/// Loads the catalog and the similarity matrix named by the configuration.
///
/// Without a configured matrix file the matrix is derived from catalog genres.
pub fn load(config: &Config) -> AppResult<(Catalog, SimilarityMatrix)> {
    let catalog = load_catalog(&config.catalog_path)?;

    let matrix = match &config.similarity_path {
        Some(path) => load_similarity(path)?,
        None => {
            tracing::info!("No similarity matrix configured, deriving it from catalog genres");
            SimilarityMatrix::from_genres(&catalog)
        }
    };

    validate(&catalog, &matrix)?;
    Ok((catalog, matrix))
}

pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading movie catalog");
    let catalog = read_catalog(File::open(path)?)?;
    tracing::info!(movies = catalog.len(), "Movie catalog loaded");
    Ok(catalog)
}

pub fn read_catalog(reader: impl Read) -> AppResult<Catalog> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let entries = csv_reader
        .deserialize::<CatalogEntry>()
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(entries)
}

pub fn load_similarity(path: impl AsRef<Path>) -> AppResult<SimilarityMatrix> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading similarity matrix");
    let matrix = read_similarity(File::open(path)?)?;
    tracing::info!(movies = matrix.len(), "Similarity matrix loaded");
    Ok(matrix)
}

pub fn read_similarity(reader: impl Read) -> AppResult<SimilarityMatrix> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let ids = csv_reader
        .headers()?
        .iter()
        .skip(1)
        .map(|field| parse_id(field, "header"))
        .collect::<AppResult<Vec<MovieId>>>()?;

    let mut rows = Vec::with_capacity(ids.len());
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();

        let row_id = parse_id(fields.next().unwrap_or_default(), "row label")?;
        match ids.get(line) {
            Some(expected) if *expected == row_id => {}
            Some(expected) => {
                return Err(AppError::Artifact(format!(
                    "similarity row {} is labelled {} but the header has {} in that position",
                    line + 1,
                    row_id,
                    expected
                )))
            }
            None => {
                return Err(AppError::Artifact(format!(
                    "similarity matrix has more rows than header ids ({})",
                    ids.len()
                )))
            }
        }

        let values = fields
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| {
                    AppError::Artifact(format!(
                        "invalid similarity value {:?} in row for movie {}: {}",
                        field, row_id, e
                    ))
                })
            })
            .collect::<AppResult<Vec<f64>>>()?;
        rows.push(values);
    }

    SimilarityMatrix::new(ids, rows)
}

/// Checks that every matrix id is cataloged.
///
/// Catalog movies missing from the matrix are only warned about; they can
/// still be looked up by title and fail the request that does so.
pub fn validate(catalog: &Catalog, matrix: &SimilarityMatrix) -> AppResult<()> {
    if let Some(orphan) = matrix.ids().iter().find(|id| !catalog.contains(**id)) {
        return Err(AppError::missing_from_catalog(*orphan));
    }

    let unranked = catalog
        .entries()
        .iter()
        .filter(|entry| !matrix.contains(entry.movie_id))
        .count();
    if unranked > 0 {
        tracing::warn!(
            unranked,
            catalog = catalog.len(),
            "Catalog movies missing from the similarity matrix"
        );
    }

    Ok(())
}

fn parse_id(field: &str, location: &str) -> AppResult<MovieId> {
    field
        .trim()
        .parse::<u32>()
        .map(MovieId)
        .map_err(|e| {
            AppError::Artifact(format!(
                "invalid movie id {:?} in {}: {}",
                field, location, e
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_CSV: &str = "\
movieId,normalized_title,genres,mode_rating
1,toy story,Adventure|Animation|Children|Comedy|Fantasy,4.0
2,jumanji,Adventure|Children|Fantasy,3.0
3,\"american president, the\",Comedy|Drama|Romance,4.0
4,untitled,,3.5
";

    const SIMILARITY_CSV: &str = "\
movieId,1,2,3
1,1.0,0.7746,0.2582
2,0.7746,1.0,0.0
3,0.2582,0.0,1.0
";

    #[test]
    fn test_read_catalog() {
        let catalog = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 4);

        let president = catalog.get(MovieId(3)).unwrap();
        assert_eq!(president.normalized_title, "american president, the");
        assert_eq!(president.mode_rating, 4.0);
        assert_eq!(catalog.get(MovieId(4)).unwrap().genres, "");
    }

    #[test]
    fn test_read_catalog_ignores_extra_columns() {
        let csv = "movieId,title,normalized_title,genres,mode_rating\n\
                   7,Heat (1995),heat,Action,4.0\n";
        let catalog = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(catalog.get(MovieId(7)).unwrap().normalized_title, "heat");
    }

    #[test]
    fn test_read_catalog_rejects_missing_mode_rating() {
        let csv = "movieId,normalized_title,genres,mode_rating\n1,toy story,Comedy,\n";
        assert!(matches!(read_catalog(csv.as_bytes()), Err(AppError::Csv(_))));
    }

    #[test]
    fn test_read_similarity() {
        let matrix = read_similarity(SIMILARITY_CSV.as_bytes()).unwrap();
        assert_eq!(matrix.ids(), &[MovieId(1), MovieId(2), MovieId(3)]);
        assert_eq!(matrix.get(MovieId(1), MovieId(2)), Some(0.7746));
        assert_eq!(matrix.get(MovieId(3), MovieId(3)), Some(1.0));
    }

    #[test]
    fn test_read_similarity_rejects_misordered_rows() {
        let csv = "movieId,1,2\n2,0.5,1.0\n1,1.0,0.5\n";
        assert!(matches!(
            read_similarity(csv.as_bytes()),
            Err(AppError::Artifact(_))
        ));
    }

    #[test]
    fn test_read_similarity_rejects_bad_values() {
        let csv = "movieId,1,2\n1,1.0,abc\n2,0.5,1.0\n";
        assert!(matches!(
            read_similarity(csv.as_bytes()),
            Err(AppError::Artifact(_))
        ));
    }

    #[test]
    fn test_read_similarity_rejects_non_numeric_ids() {
        let csv = "movieId,1,two\n1,1.0,0.5\ntwo,0.5,1.0\n";
        match read_similarity(csv.as_bytes()) {
            Err(AppError::Artifact(message)) => {
                assert!(message.contains("invalid movie id \"two\""), "{}", message)
            }
            other => panic!("expected artifact error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_similarity_rejects_missing_rows() {
        let csv = "movieId,1,2\n1,1.0,0.5\n";
        assert!(matches!(
            read_similarity(csv.as_bytes()),
            Err(AppError::Artifact(_))
        ));
    }

    #[test]
    fn test_validate_rejects_uncataloged_matrix_ids() {
        let catalog = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
        let csv = "movieId,1,99\n1,1.0,0.0\n99,0.0,1.0\n";
        let matrix = read_similarity(csv.as_bytes()).unwrap();

        let err = validate(&catalog, &matrix).unwrap_err();
        assert!(matches!(err, AppError::DataIntegrity { movie_id: MovieId(99), .. }));
    }

    #[test]
    fn test_validate_tolerates_catalog_movies_without_rows() {
        let catalog = read_catalog(CATALOG_CSV.as_bytes()).unwrap();
        let matrix = read_similarity(SIMILARITY_CSV.as_bytes()).unwrap();
        assert!(validate(&catalog, &matrix).is_ok());
    }
}
