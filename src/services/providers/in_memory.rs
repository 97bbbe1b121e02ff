use crate::{
    error::{AppError, AppResult},
    models::Movie,
    services::providers::CatalogProvider,
};

/// Catalog backed by a fixed list of movies
///
/// Used for offline runs and tests. Search order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    movies: Vec<Movie>,
}

impl InMemoryCatalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn search_titles(&self, query: &str) -> AppResult<Vec<Movie>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_by_category(&self, category: &str) -> AppResult<Vec<Movie>> {
        Ok(self
            .movies
            .iter()
            .filter(|movie| movie.has_genre(category))
            .cloned()
            .collect())
    }

    async fn lookup(&self, movie_id: u64) -> AppResult<Option<Movie>> {
        Ok(self.movies.iter().find(|movie| movie.id == movie_id).cloned())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
