pub mod preferences;
pub mod providers;
pub mod recommendations;
pub mod scoring;

pub use preferences::PreferenceProfile;
pub use providers::{CatalogProvider, InMemoryCatalog, TmdbProvider};
pub use recommendations::{EngineSettings, RecommendationEngine};
pub use scoring::{score, score_with, ScoringWeights};
