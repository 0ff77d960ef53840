//! API client for the movie catalog backend.
//!
//! This module provides the `ApiClient` struct. Every request except the two
//! account endpoints (`/token/`, `/register/`) reads the current access token
//! from the `TokenStore` and attaches it as a bearer token. Calls are single
//! fire-and-wait operations: no retries and no refresh-token exchange.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::models::{
    Favorite, MovieSummary, NewFavorite, Registration, ShareLink, SharedList, TokenPair,
};

use super::ApiError;

/// API client for the movie backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a new API client for `base_url` (e.g. `http://localhost:8000/api`)
    pub fn new(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored access token, if any. Without one the request goes
    /// out bare and the server decides.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.read() {
            Some(token) => request.bearer_auth(token),
            None => {
                debug!("No access token stored, sending request without authorization");
                request
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let url = response.url().path().to_string();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, path = %url, "Request failed");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, endpoint = label, "Failed to parse response");
            ApiError::InvalidResponse(format!("{}: {}", label, e))
        })
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Account (unauthenticated) =====

    /// Exchange username/password for an access (+refresh) token
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let url = self.url("/token/");
        debug!(url = %url, username = username, "Requesting token");
        let body = serde_json::json!({ "username": username, "password": password });
        self.send_json(self.client.post(&url).json(&body), "token")
            .await
    }

    /// Create an account. A 400 carries per-field validation messages.
    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value, ApiError> {
        let url = self.url("/register/");
        debug!(url = %url, username = %registration.username, "Registering account");
        self.send_json(self.client.post(&url).json(registration), "register")
            .await
            .map_err(ApiError::into_validation)
    }

    // ===== Catalog =====

    /// Search the movie catalog
    pub async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, ApiError> {
        let url = self.url("/search/");
        debug!(url = %url, query = query, "Searching catalog");
        let request = self.authorized(self.client.get(&url).query(&[("query", query)]));
        self.send_json(request, "search").await
    }

    // ===== Favorites =====

    /// List the caller's favorites (newest first, as the backend orders them)
    pub async fn favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let url = self.url("/favorites/");
        let request = self.authorized(self.client.get(&url));
        let favorites: Vec<Favorite> = self.send_json(request, "favorites").await?;
        debug!(count = favorites.len(), "Loaded favorites");
        Ok(favorites)
    }

    /// Add a movie to the caller's favorites. A duplicate yields `Conflict`.
    pub async fn add_favorite(&self, favorite: &NewFavorite) -> Result<Favorite, ApiError> {
        let url = self.url("/favorites/");
        debug!(tmdb_id = favorite.tmdb_id, "Adding favorite");
        let request = self.authorized(self.client.post(&url).json(favorite));
        self.send_json(request, "add favorite").await
    }

    /// Remove a movie from the caller's favorites
    pub async fn remove_favorite(&self, tmdb_id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/favorites/{}/", tmdb_id));
        debug!(tmdb_id = tmdb_id, "Removing favorite");
        let request = self.authorized(self.client.delete(&url));
        self.send_empty(request).await
    }

    // ===== Sharing =====

    /// Snapshot the caller's favorites and return the share hash.
    /// An empty list is refused with `EmptyFavorites`.
    pub async fn generate_share_link(&self) -> Result<ShareLink, ApiError> {
        let url = self.url("/share/generate/");
        let request = self.authorized(self.client.post(&url));
        self.send_json(request, "generate share link")
            .await
            .map_err(ApiError::into_empty_favorites)
    }

    /// Fetch a shared list snapshot. Public: no credential is sent.
    pub async fn shared_list(&self, share_hash: &str) -> Result<SharedList, ApiError> {
        let url = self.url(&format!("/share/{}/", share_hash));
        debug!(url = %url, "Loading shared list");
        self.send_json(self.client.get(&url), "shared list").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server, store: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::new(&server.url(), store, Duration::from_secs(5)).unwrap()
    }

    fn favorite_json(tmdb_id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": tmdb_id,
            "tmdb_id": tmdb_id,
            "title": title,
            "poster_path": null,
            "rating": "7.5",
            "release_date": null,
            "added_at": "2025-10-17T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_search_attaches_bearer_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/search/")
            .match_query(Matcher::UrlEncoded("query".into(), "the matrix".into()))
            .match_header("authorization", "Bearer T1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 603, "title": "The Matrix", "vote_average": 8.2}]"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let movies = client.search("the matrix").await.unwrap();

        m.assert_async().await;
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "The Matrix");
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_authorization_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/favorites/")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"detail": "Authentication credentials were not provided."}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client.favorites().await.unwrap_err();

        m.assert_async().await;
        assert!(err.is_unauthorized());
        assert_eq!(
            err.payload().and_then(|p| p.detail()),
            Some("Authentication credentials were not provided.")
        );
    }

    #[tokio::test]
    async fn test_token_is_read_per_request() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/favorites/")
            .match_header("authorization", "Bearer OLD")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let second = server
            .mock("GET", "/favorites/")
            .match_header("authorization", "Bearer NEW")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::with_access("OLD"));
        let client = client_for(&server, store.clone());
        client.favorites().await.unwrap();
        store.save("NEW", None);
        client.favorites().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_never_sends_stored_token() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/token/")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"username": "bob", "password": "secret"})))
            .with_status(200)
            .with_body(r#"{"access": "T1", "refresh": "R1"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("STALE")));
        let tokens = client.login("bob", "secret").await.unwrap();

        m.assert_async().await;
        assert_eq!(tokens.access, "T1");
        assert_eq!(tokens.refresh.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/register/")
            .match_header("authorization", Matcher::Missing)
            .with_status(400)
            .with_body(r#"{"email": ["Enter a valid email address."]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let registration = Registration {
            username: "bob".into(),
            email: "not-an-email".into(),
            password: "secret".into(),
        };
        let err = client.register(&registration).await.unwrap_err();

        m.assert_async().await;
        match err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields.first_message(), Some(("email", "Enter a valid email address.")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_favorite_posts_payload() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/favorites/")
            .match_header("authorization", "Bearer T1")
            .match_body(Matcher::Json(json!({
                "tmdb_id": 603,
                "title": "The Matrix",
                "poster_path": "/matrix.jpg",
                "rating": 8.2,
                "release_date": "1999-03-30"
            })))
            .with_status(201)
            .with_body(favorite_json(603, "The Matrix").to_string())
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let movie = MovieSummary {
            id: 603,
            title: "The Matrix".into(),
            poster_path: Some("/matrix.jpg".into()),
            vote_average: 8.217,
            release_date: Some("1999-03-30".into()),
            overview: None,
        };
        let favorite = client.add_favorite(&movie.to_new_favorite()).await.unwrap();

        m.assert_async().await;
        assert_eq!(favorite.tmdb_id, 603);
        assert_eq!(favorite.rating, Some(7.5));
    }

    #[tokio::test]
    async fn test_duplicate_favorite_is_conflict() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/favorites/")
            .with_status(409)
            .with_body(r#"{"detail": "This movie is already on your favorites list."}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let movie = MovieSummary {
            id: 603,
            title: "The Matrix".into(),
            poster_path: None,
            vote_average: 8.2,
            release_date: None,
            overview: None,
        };
        let err = client.add_favorite(&movie.to_new_favorite()).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_remove_favorite_not_found_surfaces_server_answer() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("DELETE", "/favorites/603/")
            .match_header("authorization", "Bearer T1")
            .with_status(204)
            .create_async()
            .await;
        let missing = server
            .mock("DELETE", "/favorites/999/")
            .with_status(404)
            .with_body(r#"{"detail": "Movie not found in favorites."}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        client.remove_favorite(603).await.unwrap();
        let err = client.remove_favorite(999).await.unwrap_err();

        ok.assert_async().await;
        missing.assert_async().await;
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_generate_share_link_on_empty_list() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/share/generate/")
            .with_status(400)
            .with_body(r#"{"detail": "Your favorites list is empty."}"#)
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let err = client.generate_share_link().await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyFavorites { .. }));
    }

    #[tokio::test]
    async fn test_shared_list_is_public() {
        let mut server = Server::new_async().await;
        let hash = "0b9c7a4e-7c1f-4a43-9f3e-5b0d2c1f7a11";
        let m = server
            .mock("GET", format!("/share/{}/", hash).as_str())
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(
                json!({
                    "created_at": "2025-10-17T09:00:00Z",
                    "favorites": [favorite_json(603, "The Matrix")]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let shared = client.shared_list(hash).await.unwrap();

        m.assert_async().await;
        assert_eq!(shared.favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/favorites/")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = client_for(&server, Arc::new(MemoryTokenStore::with_access("T1")));
        let err = client.favorites().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is essentially never listening on test machines
        let client = ApiClient::new(
            "http://127.0.0.1:9",
            Arc::new(MemoryTokenStore::new()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.search("matrix").await.unwrap_err();
        assert!(err.is_network());
    }
}
