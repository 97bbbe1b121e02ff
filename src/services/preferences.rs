use indexmap::IndexMap;
use std::collections::HashMap;

use crate::models::Movie;

/// Per-category preference weights derived from a user's ratings
///
/// A category's weight is the mean rating across every rated movie tagged
/// with it. Movies with several tags count toward each of them. The profile
/// is rebuilt from scratch whenever ratings change and never edited in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceProfile {
    /// (category, weight) in first-seen order
    weights: Vec<(String, f64)>,
    /// Categories by descending weight, first-seen order on ties
    favorites: Vec<String>,
}

impl PreferenceProfile {
    /// Builds the profile from a rating map and a movie lookup
    ///
    /// Ratings whose movie cannot be looked up, or whose movie has no tags,
    /// contribute nothing. Ratings are visited in the order they were given,
    /// which fixes the first-seen order used to break ties.
    pub fn derive<'a, F>(ratings: &IndexMap<u64, f64>, lookup: F) -> Self
    where
        F: Fn(u64) -> Option<&'a Movie>,
    {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut totals: Vec<(String, f64, usize)> = Vec::new();

        for (&movie_id, &rating) in ratings {
            let Some(movie) = lookup(movie_id) else {
                tracing::debug!(movie_id, "Rated movie missing from catalog, skipped");
                continue;
            };

            for genre in &movie.genres {
                match index.get(genre.as_str()) {
                    Some(&slot) => {
                        totals[slot].1 += rating;
                        totals[slot].2 += 1;
                    }
                    None => {
                        index.insert(genre.as_str(), totals.len());
                        totals.push((genre.clone(), rating, 1));
                    }
                }
            }
        }

        let weights: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(genre, sum, count)| (genre, sum / count as f64))
            .collect();

        let mut ranked: Vec<&(String, f64)> = weights.iter().collect();
        // sort_by is stable, so equal weights keep first-seen order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let favorites = ranked.into_iter().map(|(genre, _)| genre.clone()).collect();

        Self { weights, favorites }
    }

    /// Weight of a category, if the user has rated anything carrying it
    pub fn weight(&self, category: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(genre, _)| genre == category)
            .map(|(_, weight)| *weight)
    }

    pub fn weights(&self) -> &[(String, f64)] {
        &self.weights
    }

    pub fn favorite_categories(&self) -> &[String] {
        &self.favorites
    }

    /// True when no rating contributed, i.e. there is not enough data to personalize
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
