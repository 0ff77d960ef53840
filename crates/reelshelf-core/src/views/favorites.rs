use tracing::{debug, info, warn};

use crate::api::{ApiError, ErrorPayload};
use crate::context::AppContext;
use crate::models::Favorite;
use crate::notify::Severity;

use super::{expire_on_unauthorized, Navigation};

/// The caller's favorites list and its share link.
///
/// The list is a projection of server state fetched on mount; it is only
/// changed locally after the server confirms a removal.
pub struct FavoritesController<'a> {
    ctx: &'a AppContext,
    pub favorites: Vec<Favorite>,
    pub loading: bool,
    pub error: Option<String>,
    pub share_link: Option<String>,
    pub share_error: Option<ApiError>,
}

impl<'a> FavoritesController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            favorites: Vec::new(),
            loading: false,
            error: None,
            share_link: None,
            share_error: None,
        }
    }

    /// Load the list. Requires a session.
    pub async fn mount(&mut self) -> Navigation {
        if !self.ctx.session.is_authenticated() {
            return Navigation::ToLogin;
        }

        self.loading = true;
        self.error = None;
        let result = self.ctx.api.favorites().await;
        self.loading = false;

        match result {
            Ok(favorites) => {
                self.favorites = favorites;
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, "Failed to load favorites");
                self.error =
                    Some("Failed to load your list. Your session may have expired.".to_string());
                expire_on_unauthorized(self.ctx, &e)
            }
        }
    }

    /// Remove a movie. No local membership check is made: the server's
    /// answer decides, and the cached list only changes on success.
    pub async fn remove(&mut self, tmdb_id: i64) -> Navigation {
        match self.ctx.api.remove_favorite(tmdb_id).await {
            Ok(()) => {
                self.favorites.retain(|f| f.tmdb_id != tmdb_id);
                self.ctx
                    .notifier
                    .notify("Removed from favorites.", Severity::Success);
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, tmdb_id = tmdb_id, "Failed to remove favorite");
                let message = match &e {
                    ApiError::NotFound { .. } => "That movie is not on your favorites list.",
                    ApiError::Unauthorized { .. } => "Session expired. Please log in again.",
                    _ => "Error removing the movie.",
                };
                self.ctx.notifier.notify(message, Severity::Error);
                expire_on_unauthorized(self.ctx, &e)
            }
        }
    }

    /// Generate a public link to a snapshot of the list.
    ///
    /// On success the URL lands in `share_link`; on failure the error lands
    /// in `share_error`. An empty list fails with `ApiError::EmptyFavorites`
    /// without asking the server; the server applies the same rule for lists
    /// it knows are empty.
    pub async fn generate_share_link(&mut self) -> Navigation {
        self.share_link = None;
        self.share_error = None;

        let result = if self.favorites.is_empty() {
            debug!("Refusing to share an empty list");
            Err(ApiError::EmptyFavorites {
                payload: ErrorPayload::default(),
            })
        } else {
            self.ctx.api.generate_share_link().await
        };

        match result {
            Ok(link) => {
                info!(share_hash = %link.share_hash, "Share link generated");
                self.share_link = Some(self.ctx.config.share_url(&link.share_hash));
                self.ctx
                    .notifier
                    .notify("Share link generated!", Severity::Success);
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, "Failed to generate share link");
                let message = match &e {
                    ApiError::EmptyFavorites { .. } => {
                        "Add movies to your list before sharing it."
                    }
                    ApiError::Unauthorized { .. } => "Session expired. Please log in again.",
                    _ => "Error generating the link.",
                };
                self.ctx.notifier.notify(message, Severity::Error);
                let navigation = expire_on_unauthorized(self.ctx, &e);
                self.share_error = Some(e);
                navigation
            }
        }
    }
}
