//! View controllers.
//!
//! Each controller owns the ephemeral state of one screen (search, favorites,
//! shared list, login, registration), calls the `ApiClient`, turns failures
//! into user-facing messages and reports outcomes through the `Notifier`.
//!
//! Routing lives outside the core; controllers only say where the user should
//! go next through `Navigation`. A 401 on a protected call ends the session
//! and always yields `Navigation::ToLogin`.

pub mod favorites;
pub mod login;
pub mod register;
pub mod search;
pub mod shared;

pub use favorites::FavoritesController;
pub use login::LoginController;
pub use register::RegisterController;
pub use search::{SearchController, SearchState};
pub use shared::{share_hash_from_input, SharedListController};

use crate::api::ApiError;
use crate::context::AppContext;

/// Where the user should be taken after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    ToLogin,
    ToFavorites,
}

/// Shown whenever the server cannot be reached
pub(crate) const NETWORK_MESSAGE: &str = "Unable to reach the server. Check your connection.";

/// End the session if the server rejected the token
pub(crate) fn expire_on_unauthorized(ctx: &AppContext, err: &ApiError) -> Navigation {
    if err.is_unauthorized() {
        ctx.session.expire();
        Navigation::ToLogin
    } else {
        Navigation::Stay
    }
}
