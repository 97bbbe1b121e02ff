use serde::Serialize;

pub mod genre;
pub mod movie;
pub mod user;

pub use movie::{Movie, TmdbMovie, TmdbMovieDetails, TmdbPage};
pub use user::User;

/// A movie paired with the score it was ranked by
///
/// Only ever produced as query output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedCandidate {
    pub movie: Movie,
    pub score: f64,
}

impl RankedCandidate {
    pub fn new(movie: Movie, score: f64) -> Self {
        Self { movie, score }
    }
}

/// Aggregate view of a user's rating history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserStatistics {
    pub total_rated: usize,
    pub average_rating: f64,
    /// Population standard deviation of the rating values
    pub rating_std: f64,
    pub favorite_category: Option<String>,
    pub top_categories: Vec<String>,
    pub total_watched: usize,
}
