//! The Movie Database (TMDb) v3 catalog provider
//!
//! API Flow:
//! 1. Title search: /search/movie?query=... → page of movies without runtime
//! 2. Category search: /discover/movie?with_genres={id} → page sorted by popularity
//! 3. Lookup: /movie/{id} → full record with runtime, 404 when unknown
//!
//! All responses are cached in Redis; see [`cached!`](crate::cached).

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{genre::genre_id, Movie, TmdbMovie, TmdbMovieDetails, TmdbPage},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            language,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }

    /// GETs a TMDb endpoint and decodes the body
    ///
    /// A 404 is `Ok(None)`; any other non-success status is an `ExternalApi` error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        tracing::debug!(path = %path, bytes = body.len(), "Raw TMDb response");

        serde_json::from_str(&body).map(Some).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDb response");
            AppError::ExternalApi(format!("Failed to parse TMDb response: {}", e))
        })
    }

    async fn discover_genre(&self, genre_id: u32) -> AppResult<Vec<Movie>> {
        cached!(
            self.cache,
            CacheKey::GenreDiscover {
                language: self.language.clone(),
                genre_id,
            },
            SEARCH_CACHE_TTL,
            async move {
                let genre = genre_id.to_string();
                let page: Option<TmdbPage<TmdbMovie>> = self
                    .get_json(
                        "/discover/movie",
                        &[
                            ("with_genres", genre.as_str()),
                            ("sort_by", "popularity.desc"),
                        ],
                    )
                    .await?;

                let movies = movies_from_page(page);
                tracing::info!(
                    genre_id,
                    results = movies.len(),
                    provider = "tmdb",
                    "Genre discovery completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }
}

fn movies_from_page(page: Option<TmdbPage<TmdbMovie>>) -> Vec<Movie> {
    page.map(|page| page.results.into_iter().map(Movie::from).collect())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search_titles(&self, query: &str) -> AppResult<Vec<Movie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch {
                language: self.language.clone(),
                query: query.to_string(),
            },
            SEARCH_CACHE_TTL,
            async move {
                let page: Option<TmdbPage<TmdbMovie>> = self
                    .get_json("/search/movie", &[("query", query.trim())])
                    .await?;

                let movies = movies_from_page(page);
                tracing::info!(
                    query = %query,
                    results = movies.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    async fn search_by_category(&self, category: &str) -> AppResult<Vec<Movie>> {
        match genre_id(category) {
            Some(id) => self.discover_genre(id).await,
            None => {
                tracing::debug!(category = %category, "Category is not a TMDb genre, using text search");
                self.search_titles(category).await
            }
        }
    }

    async fn lookup(&self, movie_id: u64) -> AppResult<Option<Movie>> {
        cached!(
            self.cache,
            CacheKey::MovieDetails {
                language: self.language.clone(),
                movie_id,
            },
            DETAILS_CACHE_TTL,
            async move {
                let details: Option<TmdbMovieDetails> =
                    self.get_json(&format!("/movie/{}", movie_id), &[]).await?;

                if details.is_none() {
                    tracing::debug!(movie_id, provider = "tmdb", "Movie not found");
                }

                Ok::<_, AppError>(details.map(Movie::from))
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
