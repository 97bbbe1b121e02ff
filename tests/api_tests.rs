use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cinematch::{
    api::{create_router, AppState},
    db::UserStore,
    models::{Movie, User},
    services::{EngineSettings, InMemoryCatalog},
};

fn movie(id: u64, title: &str, popularity: f64, genres: &[&str]) -> Movie {
    Movie::new(
        id,
        title,
        2000,
        popularity,
        120,
        genres.iter().map(|g| g.to_string()).collect(),
    )
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        movie(550, "Fight Club", 8.4, &["Drama", "Thriller"]),
        movie(13, "Forrest Gump", 8.5, &["Drama", "Romance"]),
        movie(238, "The Godfather", 8.7, &["Drama", "Crime"]),
        movie(680, "Pulp Fiction", 8.5, &["Thriller", "Crime"]),
        movie(155, "The Dark Knight", 8.5, &["Drama", "Action", "Crime", "Thriller"]),
        movie(603, "The Matrix", 8.2, &["Action", "Science Fiction"]),
        movie(862, "Toy Story", 8.0, &["Animation", "Family", "Comedy"]),
    ])
}

fn create_test_server() -> (TestServer, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = UserStore::new(dir.path().join("user_data.json"));
    let state = AppState::new(
        Arc::new(catalog()),
        store,
        User::new(1, "tester"),
        EngineSettings::default(),
    );
    let server = TestServer::new(create_router(state)).unwrap();
    (server, dir)
}

async fn watch_and_rate(server: &TestServer, movie_id: u64, rating: f64) {
    server
        .post("/api/v1/user/history")
        .json(&json!({ "movie_id": movie_id }))
        .await;
    server
        .post("/api/v1/user/ratings")
        .json(&json!({ "movie_id": movie_id, "rating": rating }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let (server, _dir) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_search_and_lookup() {
    let (server, _dir) = create_test_server();

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "the")
        .await;
    response.assert_status_ok();
    let movies: Vec<Value> = response.json();
    assert_eq!(movies.len(), 3);

    let response = server.get("/api/v1/movies/603").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["title"], "The Matrix");
    assert_eq!(movie["genres"], json!(["Action", "Science Fiction"]));

    server
        .get("/api/v1/movies/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_search_is_bad_request() {
    let (server, _dir) = create_test_server();
    server
        .get("/api/v1/movies/search")
        .add_query_param("q", " ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_add_is_idempotent_and_persisted() {
    let (server, dir) = create_test_server();

    server
        .post("/api/v1/user/history")
        .json(&json!({ "movie_id": 550 }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/v1/user/history")
        .json(&json!({ "movie_id": 550 }))
        .await
        .assert_status_ok();

    let response = server.get("/api/v1/user/history").await;
    response.assert_status_ok();
    let history: Vec<Value> = response.json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["title"], "Fight Club");

    let saved = std::fs::read_to_string(dir.path().join("user_data.json")).unwrap();
    let saved: Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["watch_history"], json!([550]));
}

#[tokio::test]
async fn test_rating_requires_watch_history() {
    let (server, _dir) = create_test_server();

    server
        .post("/api/v1/user/ratings")
        .json(&json!({ "movie_id": 550, "rating": 9.0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let user: Value = server.get("/api/v1/user").await.json();
    assert_eq!(user["ratings"], json!({}));
}

#[tokio::test]
async fn test_get_single_rating() {
    let (server, _dir) = create_test_server();

    server
        .get("/api/v1/user/ratings/550")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    watch_and_rate(&server, 550, 7.5).await;
    watch_and_rate(&server, 550, 9.0).await;

    let response = server.get("/api/v1/user/ratings/550").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "movie_id": 550, "rating": 9.0 }));
}

#[tokio::test]
async fn test_rating_order_is_kept_in_saved_file() {
    let (server, dir) = create_test_server();

    watch_and_rate(&server, 862, 8.0).await;
    watch_and_rate(&server, 13, 8.0).await;

    let saved = std::fs::read_to_string(dir.path().join("user_data.json")).unwrap();
    assert!(saved.find("\"862\"").unwrap() < saved.find("\"13\"").unwrap());

    // Every category ties at 8.0, so the first one rated wins
    let stats: Value = server.get("/api/v1/user/statistics").await.json();
    assert_eq!(stats["favorite_category"], "Animation");
}

#[tokio::test]
async fn test_rating_out_of_range_rejected() {
    let (server, _dir) = create_test_server();
    server
        .post("/api/v1/user/history")
        .json(&json!({ "movie_id": 550 }))
        .await;

    server
        .post("/api/v1/user/ratings")
        .json(&json!({ "movie_id": 550, "rating": 11.0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_empty_without_ratings() {
    let (server, _dir) = create_test_server();

    let response = server.get("/api/v1/recommendations").await;
    response.assert_status_ok();
    let recommendations: Vec<Value> = response.json();
    assert!(recommendations.is_empty());

    let stats: Value = server.get("/api/v1/user/statistics").await.json();
    assert_eq!(stats["total_rated"], 0);
    assert_eq!(stats["average_rating"], 0.0);
    assert_eq!(stats["favorite_category"], Value::Null);
}

#[tokio::test]
async fn test_recommendation_flow() {
    let (server, _dir) = create_test_server();

    watch_and_rate(&server, 550, 9.0).await;
    watch_and_rate(&server, 238, 8.0).await;

    let response = server
        .get("/api/v1/recommendations")
        .add_query_param("limit", 3)
        .await;
    response.assert_status_ok();
    let recommendations: Vec<Value> = response.json();

    assert_eq!(recommendations.len(), 3);
    let ids: Vec<u64> = recommendations
        .iter()
        .map(|r| r["movie"]["id"].as_u64().unwrap())
        .collect();
    assert!(!ids.contains(&550));
    assert!(!ids.contains(&238));

    let scores: Vec<f64> = recommendations
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let stats: Value = server.get("/api/v1/user/statistics").await.json();
    assert_eq!(stats["total_rated"], 2);
    assert_eq!(stats["average_rating"], 8.5);
    assert_eq!(stats["rating_std"], 0.5);
    assert_eq!(stats["favorite_category"], "Thriller");
    assert_eq!(stats["total_watched"], 2);
}

#[tokio::test]
async fn test_rewatch_recommendations() {
    let (server, _dir) = create_test_server();

    watch_and_rate(&server, 550, 9.0).await;
    watch_and_rate(&server, 13, 6.0).await;

    let response = server.get("/api/v1/recommendations/rewatch").await;
    response.assert_status_ok();
    let rewatch: Vec<Value> = response.json();

    assert_eq!(rewatch.len(), 1);
    assert_eq!(rewatch[0]["movie"]["id"], 550);
    assert_eq!(rewatch[0]["score"], 0.9);
}

#[tokio::test]
async fn test_similar_movies() {
    let (server, _dir) = create_test_server();

    let response = server
        .get("/api/v1/movies/680/similar")
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();
    let similar: Vec<Value> = response.json();

    let ids: Vec<u64> = similar.iter().map(|m| m["id"].as_u64().unwrap()).collect();
    // The Dark Knight shares both Thriller and Crime
    assert_eq!(ids, vec![155, 238]);
}
