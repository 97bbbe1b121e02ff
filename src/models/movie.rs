use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::genre::genre_name;

/// A catalog movie, normalized from whatever the catalog returned
///
/// Rebuilt on every lookup; nothing guarantees two lookups share an instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    /// Release year, 0 when unknown
    pub year: i32,
    /// Catalog popularity on a 0-10 scale
    pub popularity: f64,
    /// Duration in minutes, 0 when unknown
    pub runtime: u32,
    /// Category tags in display order, without duplicates
    pub genres: Vec<String>,
}

impl Movie {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        year: i32,
        popularity: f64,
        runtime: u32,
        genres: Vec<String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(genres.len());
        for genre in genres {
            if !unique.contains(&genre) {
                unique.push(genre);
            }
        }

        Self {
            id,
            title: title.into(),
            year,
            popularity,
            runtime,
            genres: unique,
        }
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Number of category tags this movie shares with `other`
    pub fn shared_genres(&self, other: &Movie) -> usize {
        self.genres.iter().filter(|g| other.has_genre(g)).count()
    }
}

impl Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.year > 0 {
            write!(f, "{} ({})", self.title, self.year)?;
        } else {
            write!(f, "{}", self.title)?;
        }
        if !self.genres.is_empty() {
            write!(f, " [{}]", self.genres.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// TMDb API Types
// ============================================================================

/// Paged list response from /search/movie and /discover/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Movie entry as it appears in search and discover results
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

/// Full movie record from /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    /// Localized name; matching always goes through the fixed genre table
    #[serde(default)]
    pub name: Option<String>,
}

const UNTITLED: &str = "Untitled";

/// Extracts the year from a "YYYY-MM-DD" release date, 0 when missing or malformed
pub fn release_year(release_date: Option<&str>) -> i32 {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0)
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        let genres = movie
            .genre_ids
            .iter()
            .map(|id| genre_name(*id).to_string())
            .collect();

        Movie::new(
            movie.id,
            movie.title.unwrap_or_else(|| UNTITLED.to_string()),
            release_year(movie.release_date.as_deref()),
            movie.vote_average.unwrap_or(0.0),
            // Search results carry no runtime
            0,
            genres,
        )
    }
}

impl From<TmdbMovieDetails> for Movie {
    fn from(details: TmdbMovieDetails) -> Self {
        let genres = details
            .genres
            .iter()
            .map(|genre| genre_name(genre.id).to_string())
            .collect();

        Movie::new(
            details.id,
            details.title.unwrap_or_else(|| UNTITLED.to_string()),
            release_year(details.release_date.as_deref()),
            details.vote_average.unwrap_or(0.0),
            details.runtime.unwrap_or(0),
            genres,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_deduplicates_genres_keeping_order() {
        let movie = Movie::new(
            1,
            "Heat",
            1995,
            7.9,
            170,
            vec!["Crime".into(), "Drama".into(), "Crime".into()],
        );
        assert_eq!(movie.genres, vec!["Crime", "Drama"]);
    }

    #[test]
    fn test_shared_genres() {
        let a = Movie::new(1, "A", 2000, 5.0, 0, vec!["Action".into(), "Thriller".into()]);
        let b = Movie::new(2, "B", 2000, 5.0, 0, vec!["Thriller".into(), "Drama".into()]);
        let c = Movie::new(3, "C", 2000, 5.0, 0, vec![]);
        assert_eq!(a.shared_genres(&b), 1);
        assert_eq!(a.shared_genres(&a), 2);
        assert_eq!(a.shared_genres(&c), 0);
    }

    #[test]
    fn test_release_year() {
        assert_eq!(release_year(Some("1999-03-31")), 1999);
        assert_eq!(release_year(Some("")), 0);
        assert_eq!(release_year(Some("soon")), 0);
        assert_eq!(release_year(None), 0);
    }

    #[test]
    fn test_display() {
        let movie = Movie::new(603, "The Matrix", 1999, 8.2, 136, vec!["Action".into()]);
        assert_eq!(movie.to_string(), "The Matrix (1999) [Action]");

        let bare = Movie::new(1, "Untitled", 0, 0.0, 0, vec![]);
        assert_eq!(bare.to_string(), "Untitled");
    }

    #[test]
    fn test_tmdb_search_result_to_movie() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "release_date": "1999-10-15",
            "vote_average": 8.4,
            "genre_ids": [18, 53, 424242]
        }"#;

        let raw: TmdbMovie = serde_json::from_str(json).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.id, 550);
        assert_eq!(movie.title, "Fight Club");
        assert_eq!(movie.year, 1999);
        assert_eq!(movie.popularity, 8.4);
        assert_eq!(movie.runtime, 0);
        assert_eq!(movie.genres, vec!["Drama", "Thriller", "Unknown"]);
    }

    #[test]
    fn test_tmdb_details_to_movie() {
        let json = r#"{
            "id": 238,
            "title": "The Godfather",
            "release_date": "1972-03-14",
            "vote_average": 8.7,
            "runtime": 175,
            "genres": [{"id": 18, "name": "Dramat"}, {"id": 80, "name": "Kryminał"}]
        }"#;

        let raw: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.runtime, 175);
        assert_eq!(movie.genres, vec!["Drama", "Crime"]);
    }

    #[test]
    fn test_tmdb_sparse_record_uses_defaults() {
        let raw: TmdbMovie = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let movie: Movie = raw.into();
        assert_eq!(movie.title, "Untitled");
        assert_eq!(movie.year, 0);
        assert_eq!(movie.popularity, 0.0);
        assert!(movie.genres.is_empty());
    }
}
