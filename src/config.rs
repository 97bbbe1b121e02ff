use serde::Deserialize;

use crate::services::{EngineSettings, ScoringWeights};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The Movie Database API key
    pub tmdb_api_key: String,

    /// The Movie Database API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language requested for titles and genre names
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Path of the JSON file holding the user's ratings and watch history
    #[serde(default = "default_user_data_file")]
    pub user_data_file: String,

    #[serde(default = "default_user_id")]
    pub user_id: u64,

    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Discount applied to the category component before blending
    #[serde(default = "default_category_discount")]
    pub category_discount: f64,

    /// Share of the final score taken from the personal (category) signal
    #[serde(default = "default_personal_weight")]
    pub personal_weight: f64,

    /// Share of the final score taken from catalog popularity
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,

    /// How many favorite categories seed candidate generation
    #[serde(default = "default_favorite_category_count")]
    pub favorite_category_count: usize,

    #[serde(default = "default_candidates_per_category")]
    pub candidates_per_category: usize,

    #[serde(default = "default_similar_per_category")]
    pub similar_per_category: usize,

    /// Minimum rating for an item to be offered for a rewatch
    #[serde(default = "default_rewatch_threshold")]
    pub rewatch_threshold: f64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_user_data_file() -> String {
    "user_data.json".to_string()
}

fn default_user_id() -> u64 {
    1
}

fn default_user_name() -> String {
    "viewer".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_category_discount() -> f64 {
    ScoringWeights::default().category_discount
}

fn default_personal_weight() -> f64 {
    ScoringWeights::default().personal_weight
}

fn default_popularity_weight() -> f64 {
    ScoringWeights::default().popularity_weight
}

fn default_favorite_category_count() -> usize {
    EngineSettings::default().favorite_category_count
}

fn default_candidates_per_category() -> usize {
    EngineSettings::default().candidates_per_category
}

fn default_similar_per_category() -> usize {
    EngineSettings::default().similar_per_category
}

fn default_rewatch_threshold() -> f64 {
    EngineSettings::default().rewatch_threshold
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Engine knobs assembled from the flat environment fields
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            favorite_category_count: self.favorite_category_count,
            candidates_per_category: self.candidates_per_category,
            similar_per_category: self.similar_per_category,
            rewatch_threshold: self.rewatch_threshold,
            weights: ScoringWeights {
                category_discount: self.category_discount,
                personal_weight: self.personal_weight,
                popularity_weight: self.popularity_weight,
            },
        }
    }
}
