use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::MovieSummary;
use crate::notify::Severity;

use super::{expire_on_unauthorized, Navigation};

/// Snapshot of the search screen
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub movies: Vec<MovieSummary>,
    pub favorite_ids: HashSet<i64>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Catalog search plus favorite toggling.
///
/// Methods take `&self` so overlapping searches can be in flight at once.
/// Every search gets a sequence number and only the most recently issued
/// one may write its results; earlier responses that arrive late are dropped.
pub struct SearchController<'a> {
    ctx: &'a AppContext,
    state: Mutex<SearchState>,
    latest: AtomicU64,
}

impl<'a> SearchController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(SearchState::default()),
            latest: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> SearchState {
        self.state().clone()
    }

    pub fn is_favorite(&self, tmdb_id: i64) -> bool {
        self.state().favorite_ids.contains(&tmdb_id)
    }

    /// Load the ids of the caller's favorites so results can be marked.
    pub async fn mount(&self) -> Navigation {
        if !self.ctx.session.is_authenticated() {
            self.state().favorite_ids.clear();
            return Navigation::Stay;
        }
        match self.ctx.api.favorites().await {
            Ok(favorites) => {
                self.state().favorite_ids = favorites.iter().map(|f| f.tmdb_id).collect();
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, "Could not load favorites");
                expire_on_unauthorized(self.ctx, &e)
            }
        }
    }

    /// Search the catalog. Blank queries are ignored.
    pub async fn search(&self, query: &str) -> Navigation {
        let query = query.trim();
        if query.is_empty() {
            return Navigation::Stay;
        }
        let ticket = self.begin_search(query);
        let result = self.ctx.api.search(query).await;
        self.finish_search(ticket, result)
    }

    fn begin_search(&self, query: &str) -> u64 {
        let mut state = self.state();
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        state.query = query.to_string();
        state.movies.clear();
        state.error = None;
        state.loading = true;
        ticket
    }

    fn finish_search(&self, ticket: u64, result: Result<Vec<MovieSummary>, ApiError>) -> Navigation {
        let mut state = self.state();
        if ticket != self.latest.load(Ordering::SeqCst) {
            debug!(ticket = ticket, "Discarding stale search response");
            return Navigation::Stay;
        }
        state.loading = false;
        match result {
            Ok(movies) => {
                debug!(count = movies.len(), query = %state.query, "Search complete");
                state.movies = movies;
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, "Search failed");
                state.error = Some(
                    "Failed to search movies. Check that the server is running.".to_string(),
                );
                drop(state);
                expire_on_unauthorized(self.ctx, &e)
            }
        }
    }

    /// Add the movie to favorites, or remove it if it already is one.
    pub async fn toggle_favorite(&self, movie: &MovieSummary) -> Navigation {
        let notifier = &self.ctx.notifier;
        if !self.ctx.session.is_authenticated() {
            notifier.notify("Log in to add favorites.", Severity::Info);
            return Navigation::Stay;
        }

        let was_favorite = self.is_favorite(movie.id);
        let result = if was_favorite {
            self.ctx.api.remove_favorite(movie.id).await
        } else {
            self.ctx.api.add_favorite(&movie.to_new_favorite()).await.map(|_| ())
        };

        match result {
            Ok(()) => {
                if was_favorite {
                    self.state().favorite_ids.remove(&movie.id);
                    notifier.notify("Removed from favorites!", Severity::Success);
                } else {
                    self.state().favorite_ids.insert(movie.id);
                    notifier.notify("Added to favorites!", Severity::Success);
                }
                Navigation::Stay
            }
            Err(ApiError::Conflict { .. }) => {
                // Already stored server-side; our id set was stale
                self.state().favorite_ids.insert(movie.id);
                notifier.notify("This movie is already on your favorites list.", Severity::Info);
                Navigation::Stay
            }
            Err(e) => {
                warn!(error = %e, tmdb_id = movie.id, "Favorite toggle failed");
                let navigation = expire_on_unauthorized(self.ctx, &e);
                let message = if navigation == Navigation::ToLogin {
                    "Session expired. Please log in again."
                } else {
                    "Error managing favorites. Make sure you are logged in."
                };
                notifier.notify(message, Severity::Error);
                navigation
            }
        }
    }
}
