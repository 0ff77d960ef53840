use serde::{Deserialize, Serialize};

use super::favorite::NewFavorite;

/// A catalog search result as relayed by the backend (TMDb shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "deserialize_empty_as_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl MovieSummary {
    /// Build the add-favorite payload for this movie.
    /// The backend stores ratings with one decimal place.
    pub fn to_new_favorite(&self) -> NewFavorite {
        NewFavorite {
            tmdb_id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            rating: (self.vote_average * 10.0).round() / 10.0,
            release_date: self.release_date.clone(),
        }
    }

    /// Release year for display, if the catalog has a date
    pub fn year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|d| d.get(..4))
    }
}

// TMDb sends "" for unknown release dates; the favorites endpoint rejects it
fn deserialize_empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
