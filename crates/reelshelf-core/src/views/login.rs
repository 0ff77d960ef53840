use tracing::debug;

use crate::api::ApiError;
use crate::context::AppContext;

use super::{Navigation, NETWORK_MESSAGE};

/// Login form state
pub struct LoginController<'a> {
    ctx: &'a AppContext,
    pub error: Option<String>,
}

impl<'a> LoginController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx, error: None }
    }

    /// An authenticated user has nothing to do here
    pub fn on_mount(&self) -> Navigation {
        if self.ctx.session.is_authenticated() {
            Navigation::ToFavorites
        } else {
            Navigation::Stay
        }
    }

    pub async fn submit(&mut self, username: &str, password: &str) -> Navigation {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            self.error = Some("Username and password are required.".to_string());
            return Navigation::Stay;
        }

        self.error = None;
        match self.ctx.session.login(&self.ctx.api, username, password).await {
            Ok(()) => Navigation::ToFavorites,
            Err(e) => {
                debug!(error = %e, "Login rejected");
                self.error = Some(match e {
                    ApiError::Unauthorized { .. } | ApiError::Status { .. } => {
                        "Invalid credentials. Check your username and password.".to_string()
                    }
                    ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
                    other => format!("Login failed: {}", other),
                });
                Navigation::Stay
            }
        }
    }
}
