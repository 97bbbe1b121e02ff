use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// A viewer with their rating history and watch list
///
/// Ratings are keyed by movie id and serialize with string keys, so the
/// persisted file stays readable by anything that treats ids as strings.
/// They keep the order they were first given in, which is also the order
/// they are written to and read back from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: u64,
    pub user_name: String,
    #[serde(default)]
    pub ratings: IndexMap<u64, f64>,
    #[serde(default)]
    pub watch_history: Vec<u64>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with no ratings and an empty watch history
    pub fn new(user_id: u64, user_name: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            ratings: IndexMap::new(),
            watch_history: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Marks a movie as watched. Returns false if it was already in the history.
    pub fn add_to_history(&mut self, movie_id: u64) -> bool {
        if self.has_watched(movie_id) {
            return false;
        }
        self.watch_history.push(movie_id);
        self.updated_at = Utc::now();
        true
    }

    pub fn has_watched(&self, movie_id: u64) -> bool {
        self.watch_history.contains(&movie_id)
    }

    /// Records a rating, overwriting any previous one for the same movie
    ///
    /// A re-rated movie keeps its first position in the rating order.
    ///
    /// Only watched movies can be rated, and the score must lie in [1, 10].
    pub fn rate(&mut self, movie_id: u64, rating: f64) -> AppResult<()> {
        if !rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        if !self.has_watched(movie_id) {
            return Err(AppError::InvalidInput(format!(
                "Movie {} must be in the watch history before it can be rated",
                movie_id
            )));
        }

        self.ratings.insert(movie_id, rating);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn rating_for(&self, movie_id: u64) -> Option<f64> {
        self.ratings.get(&movie_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new(1, "viewer");
        assert!(user.ratings.is_empty());
        assert!(user.watch_history.is_empty());
    }

    #[test]
    fn test_add_to_history_ignores_duplicates() {
        let mut user = User::new(1, "viewer");
        assert!(user.add_to_history(550));
        assert!(!user.add_to_history(550));
        assert_eq!(user.watch_history, vec![550]);
    }

    #[test]
    fn test_rate_requires_watched() {
        let mut user = User::new(1, "viewer");
        let err = user.rate(550, 9.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(user.ratings.is_empty());
    }

    #[test]
    fn test_rate_rejects_out_of_range() {
        let mut user = User::new(1, "viewer");
        user.add_to_history(550);
        assert!(user.rate(550, 0.5).is_err());
        assert!(user.rate(550, 10.5).is_err());
        assert!(user.rate(550, f64::NAN).is_err());
        assert!(user.rate(550, 1.0).is_ok());
        assert!(user.rate(550, 10.0).is_ok());
    }

    #[test]
    fn test_rerating_overwrites() {
        let mut user = User::new(1, "viewer");
        user.add_to_history(550);
        user.rate(550, 6.0).unwrap();
        user.rate(550, 9.0).unwrap();
        assert_eq!(user.ratings.len(), 1);
        assert_eq!(user.rating_for(550), Some(9.0));
        assert_eq!(user.rating_for(13), None);
    }

    #[test]
    fn test_rerating_keeps_rating_order() {
        let mut user = User::new(1, "viewer");
        for id in [300, 100, 200] {
            user.add_to_history(id);
            user.rate(id, 7.0).unwrap();
        }
        user.rate(300, 4.0).unwrap();

        let order: Vec<u64> = user.ratings.keys().copied().collect();
        assert_eq!(order, vec![300, 100, 200]);
        assert_eq!(user.rating_for(300), Some(4.0));
    }

    #[test]
    fn test_rating_order_survives_round_trip_through_json() {
        let json = r#"{"user_id": 1, "user_name": "viewer", "ratings": {"300": 8.0, "100": 8.0}}"#;
        let user: User = serde_json::from_str(json).unwrap();

        let order: Vec<u64> = user.ratings.keys().copied().collect();
        assert_eq!(order, vec![300, 100]);

        let written = serde_json::to_string(&user).unwrap();
        assert!(written.find("\"300\"").unwrap() < written.find("\"100\"").unwrap());
    }

    #[test]
    fn test_ratings_serialize_with_string_keys() {
        let mut user = User::new(1, "viewer");
        user.add_to_history(550);
        user.rate(550, 9.0).unwrap();

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["ratings"]["550"], 9.0);
        assert_eq!(json["watch_history"][0], 550);
    }

    #[test]
    fn test_deserialize_legacy_file_without_timestamp() {
        let json = r#"{
            "user_id": 1,
            "user_name": "Kacper",
            "ratings": {"550": 9.0, "13": 8.5},
            "watch_history": [550, 13]
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.rating_for(13), Some(8.5));
        assert_eq!(user.rating_for(550), Some(9.0));
        assert_eq!(user.watch_history, vec![550, 13]);
    }
}
