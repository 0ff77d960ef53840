use chrono::{DateTime, Utc};

/// Base URL for TMDb poster images
const TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Full poster URL for a TMDb poster path, if the movie has one
pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", TMDB_IMAGE_URL, p))
}

/// Format a rating with one decimal place, or "N/A" when unknown or zero
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r > 0.0 => format!("{:.1}", r),
        _ => "N/A".to_string(),
    }
}

/// Format a timestamp as a short local-agnostic date
pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %d, %Y").to_string()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
