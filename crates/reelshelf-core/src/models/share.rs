use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::favorite::Favorite;

/// Response of `POST /share/generate/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    pub share_hash: String,
}

/// Read-only snapshot of a favorites list at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedList {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

impl SharedList {
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_list() {
        let json = r#"{
            "share_hash": "0b9c7a4e-7c1f-4a43-9f3e-5b0d2c1f7a11",
            "created_at": "2025-10-17T09:00:00Z",
            "favorites": [
                {"id": 1, "tmdb_id": 603, "title": "The Matrix", "poster_path": null,
                 "rating": "8.2", "release_date": null, "added_at": "2025-10-16T09:00:00Z"}
            ]
        }"#;
        let shared: SharedList = serde_json::from_str(json).unwrap();
        assert!(!shared.is_empty());
        assert_eq!(shared.favorites[0].title, "The Matrix");
    }
}
