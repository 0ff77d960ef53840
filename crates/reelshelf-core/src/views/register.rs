use tracing::{info, warn};

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::Registration;
use crate::notify::Severity;

use super::{Navigation, NETWORK_MESSAGE};

const UNKNOWN_ERROR: &str = "Unknown registration error.";

/// Registration form state
pub struct RegisterController<'a> {
    ctx: &'a AppContext,
    pub error: Option<String>,
}

fn field_label(field: &str) -> &str {
    match field {
        "username" => "Username",
        "email" => "Email",
        "password" => "Password",
        other => other,
    }
}

impl<'a> RegisterController<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx, error: None }
    }

    pub async fn submit(&mut self, registration: &Registration) -> Navigation {
        self.error = None;
        match self.ctx.api.register(registration).await {
            Ok(_) => {
                info!(username = %registration.username, "Account created");
                self.ctx
                    .notifier
                    .notify("Account created! Please log in.", Severity::Success);
                Navigation::ToLogin
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.error = Some(match &e {
                    ApiError::Validation { fields, .. } => fields
                        .first_message()
                        .map(|(field, message)| format!("{}: {}", field_label(field), message))
                        .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                    ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
                    _ => UNKNOWN_ERROR.to_string(),
                });
                Navigation::Stay
            }
        }
    }
}
