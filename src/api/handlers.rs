use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Movie, RankedCandidate, User, UserStatistics},
};

use super::AppState;

const DEFAULT_LIMIT: usize = 10;

// Request types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToHistoryRequest {
    pub movie_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RateMovieRequest {
    pub movie_id: u64,
    pub rating: f64,
}

// Response types

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub movie_id: u64,
    pub rating: f64,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Search the catalog by title
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.catalog.search_titles(&params.q).await?;
    Ok(Json(movies))
}

/// Fetch one movie from the catalog
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<Movie>> {
    state
        .catalog
        .lookup(movie_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
}

/// Movies sharing categories with the given one
pub async fn similar_movies(
    State(state): State<AppState>,
    Path(movie_id): Path<u64>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<Movie>> {
    let engine = state.engine().await;
    Json(engine.get_similar_movies(movie_id, params.limit()).await)
}

/// Current ratings and watch history
pub async fn get_user(State(state): State<AppState>) -> Json<User> {
    Json(state.user.read().await.clone())
}

/// Watch history resolved through the catalog
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<Movie>> {
    let history = state.user.read().await.watch_history.clone();

    let mut movies = Vec::with_capacity(history.len());
    for movie_id in history {
        match state.catalog.lookup(movie_id).await {
            Ok(Some(movie)) => movies.push(movie),
            Ok(None) => tracing::debug!(movie_id, "Watched movie missing from catalog"),
            Err(e) => tracing::warn!(error = %e, movie_id, "Failed to resolve watched movie"),
        }
    }

    Json(movies)
}

/// Mark a movie as watched
pub async fn add_to_history(
    State(state): State<AppState>,
    Json(request): Json<AddToHistoryRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let (user, added) = state
        .update_user(|user| Ok(user.add_to_history(request.movie_id)))
        .await?;

    tracing::info!(movie_id = request.movie_id, added, "Watch history updated");

    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(user)))
}

/// Rate a watched movie
pub async fn rate_movie(
    State(state): State<AppState>,
    Json(request): Json<RateMovieRequest>,
) -> AppResult<Json<User>> {
    let (user, ()) = state
        .update_user(|user| user.rate(request.movie_id, request.rating))
        .await?;

    tracing::info!(
        movie_id = request.movie_id,
        rating = request.rating,
        "Rating recorded"
    );

    Ok(Json(user))
}

/// The user's rating for one movie
pub async fn get_rating(
    State(state): State<AppState>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<RatingResponse>> {
    state
        .user
        .read()
        .await
        .rating_for(movie_id)
        .map(|rating| Json(RatingResponse { movie_id, rating }))
        .ok_or_else(|| AppError::NotFound(format!("Movie {} has not been rated", movie_id)))
}

/// Rating summary for the user
pub async fn user_statistics(State(state): State<AppState>) -> Json<UserStatistics> {
    Json(state.engine().await.get_user_statistics())
}

/// Personalized recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<RankedCandidate>> {
    let engine = state.engine().await;
    Json(engine.get_recommendations(params.limit()).await)
}

/// Highly rated movies worth watching again
pub async fn rewatch_recommendations(
    State(state): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Json<Vec<RankedCandidate>> {
    let engine = state.engine().await;
    Json(engine.get_rewatch_recommendations(params.limit()))
}
