use tracing::warn;

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::SharedList;

use super::NETWORK_MESSAGE;

/// Accept either a bare share hash or a full share URL
/// (`https://host/shared/<hash>`), returning the hash.
pub fn share_hash_from_input(input: &str) -> Option<&str> {
    let trimmed = input.trim().trim_end_matches('/');
    let hash = match trimmed.rsplit_once("/shared/") {
        Some((_, hash)) => hash,
        None => trimmed,
    };
    let hash = hash.split(['?', '#']).next().unwrap_or_default();
    (!hash.is_empty() && !hash.contains('/')).then_some(hash)
}

/// Read-only view of someone's shared list. Works without a session.
pub struct SharedListController<'a> {
    ctx: &'a AppContext,
    pub shared: Option<SharedList>,
    pub error: Option<String>,
}

impl<'a> SharedListController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            shared: None,
            error: None,
        }
    }

    pub async fn load(&mut self, input: &str) {
        self.shared = None;
        self.error = None;

        let Some(hash) = share_hash_from_input(input) else {
            self.error = Some("No share code provided.".to_string());
            return;
        };

        match self.ctx.api.shared_list(hash).await {
            Ok(shared) => self.shared = Some(shared),
            Err(e) => {
                warn!(error = %e, share_hash = hash, "Failed to load shared list");
                self.error = Some(match e {
                    ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
                    _ => "Could not load the shared list. The link may be invalid.".to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::{context_for, favorite_json};
    use mockito::Server;
    use serde_json::json;

    const HASH: &str = "0b9c7a4e-7c1f-4a43-9f3e-5b0d2c1f7a11";

    #[test]
    fn test_share_hash_from_input() {
        assert_eq!(share_hash_from_input(HASH), Some(HASH));
        assert_eq!(
            share_hash_from_input(&format!("https://films.example.com/shared/{}/", HASH)),
            Some(HASH)
        );
        assert_eq!(
            share_hash_from_input(&format!("http://localhost:3000/shared/{}?ref=x", HASH)),
            Some(HASH)
        );
        assert_eq!(share_hash_from_input("   "), None);
        assert_eq!(share_hash_from_input("https://films.example.com/shared/"), None);
    }

    #[tokio::test]
    async fn test_load_shared_list_without_session() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", format!("/share/{}/", HASH).as_str())
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

        let ctx = context_for(&server, None);
        let mut shared = SharedListController::new(&ctx);
        shared.load(HASH).await;
        assert!(shared.error.is_none());
        assert_eq!(shared.shared.unwrap().favorites[0].tmdb_id, 603);
    }

    #[tokio::test]
    async fn test_invalid_hash_shows_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/share/nope/")
            .with_status(404)
            .with_body(r#"{"detail": "Not found."}"#)
            .create_async()
            .await;

        let ctx = context_for(&server, None);
        let mut shared = SharedListController::new(&ctx);
        shared.load("nope").await;
        assert!(shared.shared.is_none());
        assert_eq!(
            shared.error.as_deref(),
            Some("Could not load the shared list. The link may be invalid.")
        );

        shared.load("").await;
        assert_eq!(shared.error.as_deref(), Some("No share code provided."));
    }
}
