use crate::models::Movie;

use super::preferences::PreferenceProfile;

/// Popularity is reported by the catalog on a 0-10 scale
pub const POPULARITY_SCALE: f64 = 10.0;

/// Constants of the score blend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Multiplier on the mean category weight before blending
    pub category_discount: f64,
    /// Share of the personal (category) component in the final score
    pub personal_weight: f64,
    /// Share of the popularity component in the final score
    pub popularity_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category_discount: 0.5,
            personal_weight: 0.7,
            popularity_weight: 0.3,
        }
    }
}

/// Scores a movie against a preference profile with the default blend
pub fn score(movie: &Movie, profile: &PreferenceProfile) -> f64 {
    score_with(movie, profile, &ScoringWeights::default())
}

/// Scores a movie against a preference profile
///
/// The category component is the mean profile weight over the movie's tags,
/// where tags the profile has never seen count as 0. Untagged movies score 0.
pub fn score_with(movie: &Movie, profile: &PreferenceProfile, weights: &ScoringWeights) -> f64 {
    if movie.genres.is_empty() {
        return 0.0;
    }

    // Summed in name order so the result does not depend on tag order
    let mut genres: Vec<&str> = movie.genres.iter().map(String::as_str).collect();
    genres.sort_unstable();
    let total: f64 = genres
        .iter()
        .map(|genre| profile.weight(genre).unwrap_or(0.0))
        .sum();

    let category_component = total / genres.len() as f64 * weights.category_discount;
    let popularity_component = movie.popularity / POPULARITY_SCALE;

    category_component * weights.personal_weight + popularity_component * weights.popularity_weight
}
