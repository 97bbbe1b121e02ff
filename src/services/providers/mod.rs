//! Movie catalog abstraction
//!
//! The recommendation engine never talks to a catalog backend directly. Each
//! backend (TMDb over HTTP, a fixed in-memory list) implements this trait, and
//! "not found" is a typed `Ok(None)` rather than an error.

use crate::{error::AppResult, models::Movie};

pub mod in_memory;
pub mod tmdb;

pub use in_memory::InMemoryCatalog;
pub use tmdb::TmdbProvider;

/// Trait for movie catalog backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Free-text title search, in catalog order
    async fn search_titles(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// Movies tagged with the given category, in catalog order
    async fn search_by_category(&self, category: &str) -> AppResult<Vec<Movie>>;

    /// Fetch a single movie by id
    ///
    /// Returns `Ok(None)` when the catalog has no such movie. Errors are reserved
    /// for transport or decoding failures.
    async fn lookup(&self, movie_id: u64) -> AppResult<Option<Movie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
