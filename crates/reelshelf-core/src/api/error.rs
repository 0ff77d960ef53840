use reqwest::StatusCode;
use thiserror::Error;

use crate::models::FieldErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token missing, expired or credentials invalid: {payload}")]
    Unauthorized { payload: ErrorPayload },

    #[error("Validation failed: {payload}")]
    Validation {
        fields: FieldErrors,
        payload: ErrorPayload,
    },

    #[error("Resource not found: {payload}")]
    NotFound { payload: ErrorPayload },

    #[error("Conflict: {payload}")]
    Conflict { payload: ErrorPayload },

    #[error("Favorites list is empty - nothing to share")]
    EmptyFavorites { payload: ErrorPayload },

    #[error("Server error ({status}): {payload}")]
    Server {
        status: StatusCode,
        payload: ErrorPayload,
    },

    #[error("Request failed ({status}): {payload}")]
    Status {
        status: StatusCode,
        payload: ErrorPayload,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Parsed error body of a non-2xx response.
///
/// JSON bodies are kept as-is; anything else is kept as a (truncated) string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPayload(pub serde_json::Value);

impl ErrorPayload {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => Self(value),
            Err(_) if body.trim().is_empty() => Self(serde_json::Value::Null),
            Err(_) => Self(serde_json::Value::String(truncate_body(body))),
        }
    }

    /// The `detail` message the backend attaches to most errors
    pub fn detail(&self) -> Option<&str> {
        match &self.0 {
            serde_json::Value::Object(map) => map.get("detail").and_then(|d| d.as_str()),
            serde_json::Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(detail) = self.detail() {
            return write!(f, "{}", detail);
        }
        match &self.0 {
            serde_json::Value::Null => write!(f, "(no body)"),
            other => write!(f, "{}", truncate_body(&other.to_string())),
        }
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let payload = ErrorPayload::parse(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { payload },
            404 => ApiError::NotFound { payload },
            409 => ApiError::Conflict { payload },
            500..=599 => ApiError::Server { status, payload },
            _ => ApiError::Status { status, payload },
        }
    }

    /// HTTP status of the failed response, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Conflict { .. } => Some(StatusCode::CONFLICT),
            ApiError::Validation { .. } | ApiError::EmptyFavorites { .. } => {
                Some(StatusCode::BAD_REQUEST)
            }
            ApiError::Server { status, .. } | ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Unauthorized { payload }
            | ApiError::Validation { payload, .. }
            | ApiError::NotFound { payload }
            | ApiError::Conflict { payload }
            | ApiError::EmptyFavorites { payload }
            | ApiError::Server { payload, .. }
            | ApiError::Status { payload, .. } => Some(payload),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// The request never produced a usable HTTP response
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Reinterpret a 400 as per-field validation errors (registration)
    pub(crate) fn into_validation(self) -> Self {
        match self {
            ApiError::Status { status, payload } if status == StatusCode::BAD_REQUEST => {
                ApiError::Validation {
                    fields: FieldErrors::from_value(payload.value()),
                    payload,
                }
            }
            other => other,
        }
    }

    /// Reinterpret a 400 from share generation as the empty-list refusal
    pub(crate) fn into_empty_favorites(self) -> Self {
        match self {
            ApiError::Status { status, payload } if status == StatusCode::BAD_REQUEST => {
                ApiError::EmptyFavorites { payload }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_taxonomy() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Given token not valid"}"#),
            ApiError::Unauthorized { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "{}"),
            ApiError::Conflict { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "down"),
            ApiError::Server { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "{}"),
            ApiError::Status { .. }
        ));
    }

    #[test]
    fn test_payload_detail() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "No active account found with the given credentials"}"#,
        );
        assert_eq!(
            err.payload().and_then(|p| p.detail()),
            Some("No active account found with the given credentials")
        );
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("No active account"));
    }

    #[test]
    fn test_non_json_body_is_truncated() {
        let body = "x".repeat(2000);
        let payload = ErrorPayload::parse(&body);
        let detail = payload.detail().unwrap();
        assert!(detail.starts_with(&"x".repeat(500)));
        assert!(detail.contains("truncated, 2000 total bytes"));
    }

    #[test]
    fn test_into_validation_collects_fields() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"username": ["A user with that username already exists."]}"#,
        )
        .into_validation();
        match err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(
                    fields.first_message(),
                    Some(("username", "A user with that username already exists."))
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_refinements_leave_other_statuses_alone() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "").into_empty_favorites();
        assert!(err.is_unauthorized());
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "{}").into_empty_favorites();
        assert!(matches!(err, ApiError::EmptyFavorites { .. }));
    }
}
