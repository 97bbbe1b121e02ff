use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::{
    models::{Movie, RankedCandidate, User, UserStatistics},
    services::{
        preferences::PreferenceProfile,
        providers::CatalogProvider,
        scoring::{score_with, ScoringWeights},
    },
};

/// Categories listed in [`UserStatistics::top_categories`], independent of
/// how many seed candidate generation
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Tunables for candidate generation and ranking
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Favorite categories used to seed candidate generation
    pub favorite_category_count: usize,
    /// Candidates taken from the catalog per favorite category
    pub candidates_per_category: usize,
    /// Candidates taken from the catalog per category of a reference movie
    pub similar_per_category: usize,
    /// Minimum rating for a movie to be offered for a rewatch
    pub rewatch_threshold: f64,
    pub weights: ScoringWeights,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            favorite_category_count: 3,
            candidates_per_category: 20,
            similar_per_category: 10,
            rewatch_threshold: 7.0,
            weights: ScoringWeights::default(),
        }
    }
}

/// Generates ranked movie lists for one user
///
/// The engine works on a snapshot of the user taken at construction time.
/// Ratings added afterwards are not seen until a new engine is built.
///
/// Catalog failures never reach the caller: a movie that cannot be fetched
/// contributes nothing, and a category search that fails yields no candidates.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    user: User,
    /// Rated movies the catalog could resolve, by id
    rated_movies: BTreeMap<u64, Movie>,
    profile: PreferenceProfile,
    settings: EngineSettings,
}

impl RecommendationEngine {
    /// Builds an engine, resolving every rated movie and deriving the profile
    ///
    /// Lookups are issued one at a time.
    pub async fn new(
        catalog: Arc<dyn CatalogProvider>,
        user: User,
        settings: EngineSettings,
    ) -> Self {
        let mut rated_movies = BTreeMap::new();
        for &movie_id in user.ratings.keys() {
            if let Some(movie) = fetch_movie(catalog.as_ref(), movie_id).await {
                rated_movies.insert(movie_id, movie);
            }
        }

        let profile = PreferenceProfile::derive(&user.ratings, |id| rated_movies.get(&id));

        tracing::debug!(
            user_id = user.user_id,
            ratings = user.ratings.len(),
            resolved = rated_movies.len(),
            categories = profile.weights().len(),
            provider = catalog.name(),
            "Recommendation engine built"
        );

        Self {
            catalog,
            user,
            rated_movies,
            profile,
            settings,
        }
    }

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    /// Unseen movies from the user's favorite categories, best first
    ///
    /// Candidates come from the top favorite categories in order, duplicates
    /// keep their first position, and anything the user already rated is
    /// dropped. Equal scores keep catalog order.
    pub async fn get_recommendations(&self, limit: usize) -> Vec<RankedCandidate> {
        if self.user.ratings.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut seen: HashSet<u64> = HashSet::new();
        let mut ranked: Vec<RankedCandidate> = Vec::new();

        for category in self
            .profile
            .favorite_categories()
            .iter()
            .take(self.settings.favorite_category_count)
        {
            let candidates = fetch_category(
                self.catalog.as_ref(),
                category,
                self.settings.candidates_per_category,
            )
            .await;

            for movie in candidates {
                if self.user.ratings.contains_key(&movie.id) || !seen.insert(movie.id) {
                    continue;
                }
                let score = score_with(&movie, &self.profile, &self.settings.weights);
                ranked.push(RankedCandidate::new(movie, score));
            }
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);

        tracing::info!(
            user_id = self.user.user_id,
            results = ranked.len(),
            "Recommendations generated"
        );

        ranked
    }

    /// Highly rated movies worth watching again
    ///
    /// Each movie rated at or above the rewatch threshold is paired with its
    /// rating divided by 10. Equal ratings keep the order they were given in.
    pub fn get_rewatch_recommendations(&self, limit: usize) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = self
            .user
            .ratings
            .iter()
            .filter(|&(_, &rating)| rating >= self.settings.rewatch_threshold)
            .filter_map(|(movie_id, &rating)| {
                self.rated_movies
                    .get(movie_id)
                    .map(|movie| RankedCandidate::new(movie.clone(), rating / 10.0))
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }

    /// Movies that share categories with the given one
    ///
    /// Ranked by the number of shared categories, then by popularity. The
    /// reference movie itself is never returned.
    pub async fn get_similar_movies(&self, movie_id: u64, limit: usize) -> Vec<Movie> {
        let Some(reference) = fetch_movie(self.catalog.as_ref(), movie_id).await else {
            return Vec::new();
        };
        if reference.genres.is_empty() || limit == 0 {
            return Vec::new();
        }

        // Position of first sighting, value of the last one
        let mut slots: HashMap<u64, usize> = HashMap::new();
        let mut pool: Vec<Movie> = Vec::new();

        for genre in &reference.genres {
            let candidates = fetch_category(
                self.catalog.as_ref(),
                genre,
                self.settings.similar_per_category,
            )
            .await;

            for movie in candidates {
                if movie.id == reference.id {
                    continue;
                }
                match slots.get(&movie.id) {
                    Some(&slot) => pool[slot] = movie,
                    None => {
                        slots.insert(movie.id, pool.len());
                        pool.push(movie);
                    }
                }
            }
        }

        let mut ranked: Vec<(usize, Movie)> = pool
            .into_iter()
            .map(|movie| (movie.shared_genres(&reference), movie))
            .collect();
        ranked.sort_by(|(a_overlap, a), (b_overlap, b)| {
            b_overlap
                .cmp(a_overlap)
                .then_with(|| b.popularity.total_cmp(&a.popularity))
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|(_, movie)| movie)
            .collect()
    }

    /// Summary of the user's rating history
    pub fn get_user_statistics(&self) -> UserStatistics {
        let total_watched = self.user.watch_history.len();

        if self.user.ratings.is_empty() {
            return UserStatistics {
                total_rated: 0,
                average_rating: 0.0,
                rating_std: 0.0,
                favorite_category: None,
                top_categories: Vec::new(),
                total_watched,
            };
        }

        let values: Vec<f64> = self.user.ratings.values().copied().collect();
        let count = values.len() as f64;
        let average_rating = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - average_rating).powi(2))
            .sum::<f64>()
            / count;

        let favorites = self.profile.favorite_categories();

        UserStatistics {
            total_rated: values.len(),
            average_rating,
            rating_std: variance.sqrt(),
            favorite_category: favorites.first().cloned(),
            top_categories: favorites.iter().take(TOP_CATEGORY_COUNT).cloned().collect(),
            total_watched,
        }
    }
}

/// Single lookup with absence and failure both mapped to `None`
async fn fetch_movie(catalog: &dyn CatalogProvider, movie_id: u64) -> Option<Movie> {
    match catalog.lookup(movie_id).await {
        Ok(Some(movie)) => Some(movie),
        Ok(None) => {
            tracing::debug!(movie_id, provider = catalog.name(), "Movie not in catalog");
            None
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                movie_id,
                provider = catalog.name(),
                "Catalog lookup failed, treating movie as absent"
            );
            None
        }
    }
}

/// First `limit` catalog movies for a category; a failed search yields none
async fn fetch_category(catalog: &dyn CatalogProvider, category: &str, limit: usize) -> Vec<Movie> {
    match catalog.search_by_category(category).await {
        Ok(mut movies) => {
            movies.truncate(limit);
            movies
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                category = %category,
                provider = catalog.name(),
                "Category search failed, no candidates from it"
            );
            Vec::new()
        }
    }
}
