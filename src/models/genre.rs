/// TMDb genre ids and the category names used throughout scoring.
///
/// The table is fixed by TMDb; ids outside it surface as [`UNKNOWN_GENRE`].
pub const GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub const UNKNOWN_GENRE: &str = "Unknown";

/// Resolve a TMDb genre id to its category name
pub fn genre_name(id: u32) -> &'static str {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_GENRE)
}

/// Resolve a category name back to its TMDb genre id (case-insensitive)
pub fn genre_id(name: &str) -> Option<u32> {
    let name = name.trim();
    GENRES
        .iter()
        .find(|(_, genre)| genre.eq_ignore_ascii_case(name))
        .map(|(id, _)| *id)
}
