use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::request_id::RequestId;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::request_id_str;
use crate::models::{GenreVocabulary, PredictedMovie, RankedMovie};
use crate::services::MatchTier;

use super::AppState;

/// Accepted range for user ratings
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

const NO_MATCH_MESSAGE: &str =
    "Sorry, we couldn't find the movie or genre. Please check your input.";
const NO_PREDICTION_MESSAGE: &str = "Sorry, no recommendations found based on the provided genre.";

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Movie title or genre text
    pub query: String,
    pub rating: f64,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub rating: f64,
    pub matched_by: MatchTier,
    pub movies: Vec<RankedMovie>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    /// Name of the movie the user rated but the catalog does not have
    pub unseen_title: String,
    pub genre: String,
    pub rating: f64,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub unseen_title: String,
    pub genre: String,
    pub rating: f64,
    /// Predicted rating of the closest similar movie
    pub predicted_rating: Option<f64>,
    pub similar_movies: Vec<PredictedMovie>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Distinct genre labels known to the catalog
pub async fn list_genres(State(state): State<AppState>) -> Json<GenreVocabulary> {
    Json(state.recommender.vocabulary().clone())
}

/// Movies similar to a title or genre
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    validate_rating(request.rating)?;
    let top_k = request.top_k.unwrap_or(state.default_top_k);

    tracing::info!(
        request_id = %request_id_str(Some(&request_id)),
        query = %request.query,
        top_k,
        "Processing recommendation request"
    );

    let resolution = state
        .recommender
        .resolve(&request.query)
        .ok_or_else(|| AppError::NotFound(NO_MATCH_MESSAGE.to_string()))?;
    let movies = state.recommender.rank_resolution(&resolution, top_k)?;

    Ok(Json(RecommendationResponse {
        query: request.query,
        rating: request.rating,
        matched_by: resolution.tier,
        movies,
    }))
}

/// Predicted ratings for movies resembling an unseen title
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    validate_rating(request.rating)?;
    let top_k = request.top_k.unwrap_or(state.default_top_k);

    tracing::info!(
        request_id = %request_id_str(Some(&request_id)),
        unseen_title = %request.unseen_title,
        genre = %request.genre,
        top_k,
        "Processing prediction request"
    );

    let similar_movies = state
        .recommender
        .predict_unseen_rating(request.rating, &request.genre, top_k)?
        .ok_or_else(|| AppError::NotFound(NO_PREDICTION_MESSAGE.to_string()))?;

    Ok(Json(PredictionResponse {
        predicted_rating: similar_movies.first().map(|m| m.predicted_rating),
        unseen_title: request.unseen_title,
        genre: request.genre,
        rating: request.rating,
        similar_movies,
    }))
}

fn validate_rating(rating: f64) -> AppResult<()> {
    if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "rating must be between {:.1} and {:.1}, got {}",
            MIN_RATING, MAX_RATING, rating
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(1.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(3.7).is_ok());
        assert!(matches!(validate_rating(0.9), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_rating(5.1), Err(AppError::InvalidInput(_))));
        assert!(matches!(validate_rating(f64::NAN), Err(AppError::InvalidInput(_))));
    }
}
