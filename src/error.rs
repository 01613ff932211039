use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::MovieId;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog and similarity matrix disagree about a movie id
    #[error("Data integrity error: movie {movie_id} {detail}")]
    DataIntegrity { movie_id: MovieId, detail: String },

    #[error("Malformed artifact: {0}")]
    Artifact(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn missing_from_catalog(movie_id: MovieId) -> Self {
        AppError::DataIntegrity {
            movie_id,
            detail: "is missing from the catalog".to_string(),
        }
    }

    pub fn missing_from_matrix(movie_id: MovieId) -> Self {
        AppError::DataIntegrity {
            movie_id,
            detail: "is missing from the similarity matrix".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DataIntegrity { .. } => {
                tracing::error!(error = %self, "Artifact inconsistency surfaced during request");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Csv(_) | AppError::Io(_) | AppError::Artifact(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_integrity_message_names_movie() {
        let err = AppError::missing_from_catalog(MovieId(42));
        assert_eq!(
            err.to_string(),
            "Data integrity error: movie 42 is missing from the catalog"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::missing_from_matrix(MovieId(7)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Artifact("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
