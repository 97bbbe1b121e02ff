use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies/search", get(handlers::search_movies))
        .route("/movies/:id", get(handlers::get_movie))
        .route("/movies/:id/similar", get(handlers::similar_movies))
        // User state
        .route("/user", get(handlers::get_user))
        .route(
            "/user/history",
            get(handlers::get_history).post(handlers::add_to_history),
        )
        .route("/user/ratings", post(handlers::rate_movie))
        .route("/user/ratings/:id", get(handlers::get_rating))
        .route("/user/statistics", get(handlers::user_statistics))
        // Recommendations
        .route("/recommendations", get(handlers::recommendations))
        .route(
            "/recommendations/rewatch",
            get(handlers::rewatch_recommendations),
        )
}
