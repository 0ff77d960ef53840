//! reelshelf core - movie discovery client library.
//!
//! Searches a movie catalog backend, manages the caller's favorites list and
//! generates read-only share links to it. The interesting part is the
//! session layer: tokens live in a `TokenStore`, the `Session` tracks whether
//! the user is logged in, and the `ApiClient` attaches the stored bearer
//! token to every protected request.
//!
//! Everything is wired together in an explicitly constructed `AppContext`
//! which the view controllers in `views` borrow.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod notify;
pub mod utils;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use auth::{Session, TokenStore};
pub use config::Config;
pub use context::AppContext;
pub use notify::{Notification, Notifier, Severity};
pub use views::Navigation;
