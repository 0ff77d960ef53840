use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A movie on the caller's favorites list (backend-owned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default)]
    pub id: Option<i64>,
    pub tmdb_id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    // DRF renders decimals as strings ("8.2")
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub added_at: DateTime<Utc>,
}

/// Payload for `POST /favorites/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFavorite {
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: f64,
    pub release_date: Option<String>,
}

// Helper to deserialize a decimal sent either as a JSON number or a string
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct DecimalVisitor;

    impl<'de> de::Visitor<'de> for DecimalVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or a decimal string")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid decimal: {}", v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}
