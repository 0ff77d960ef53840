use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

use super::token_store::TokenStore;

/// Authentication state of the running client.
///
/// Initialized once from the `TokenStore` (presence of an access token means
/// authenticated; nothing checks signature or expiry, so a stale token is only
/// discovered when a protected call comes back 401). After that only `login`,
/// `logout` and `expire` change it. Observers subscribe to transitions through
/// a watch channel.
pub struct Session {
    store: Arc<dyn TokenStore>,
    state: watch::Sender<bool>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let authenticated = store.read().is_some();
        let (state, _) = watch::channel(authenticated);
        info!(authenticated = authenticated, "Session initialized");
        Self { store, state }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.state.borrow()
    }

    /// Receive every authenticated/unauthenticated transition
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Exchange credentials for tokens and mark the session authenticated.
    ///
    /// On failure the stored tokens and the session flag are left exactly as
    /// they were.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<(), ApiError> {
        match api.login(username, password).await {
            Ok(tokens) if tokens.access.trim().is_empty() => {
                warn!(username = username, "Login response carried an empty access token");
                Err(ApiError::InvalidResponse(
                    "token response has an empty access token".to_string(),
                ))
            }
            Ok(tokens) => {
                self.store.save(&tokens.access, tokens.refresh.as_deref());
                self.set_authenticated(true);
                info!(username = username, "Login successful");
                Ok(())
            }
            Err(e) => {
                warn!(username = username, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// Forget the tokens. Never fails; calling it twice is the same as once.
    pub fn logout(&self) {
        self.store.clear();
        self.set_authenticated(false);
        info!("Logged out");
    }

    /// The server rejected the stored token; drop it the same way as a logout.
    pub fn expire(&self) {
        if self.is_authenticated() {
            info!("Access token rejected by server, session expired");
        }
        self.store.clear();
        self.set_authenticated(false);
    }

    fn set_authenticated(&self, authenticated: bool) {
        // send_if_modified so repeated logouts don't wake observers
        self.state.send_if_modified(|current| {
            if *current == authenticated {
                false
            } else {
                *current = authenticated;
                true
            }
        });
    }
}
