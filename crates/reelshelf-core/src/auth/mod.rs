//! Authentication module for managing the session and stored credentials.
//!
//! This module provides:
//! - `TokenStore`: durable storage for the access and refresh tokens, with
//!   file (`FileTokenStore`), OS keychain (`KeyringTokenStore`) and
//!   in-memory (`MemoryTokenStore`) backends
//! - `Session`: the authenticated/unauthenticated state and login/logout
//!
//! Tokens are never validated locally; an expired token shows up as a 401
//! on the next protected call.

pub mod credentials;
pub mod session;
pub mod token_store;

pub use credentials::KeyringTokenStore;
pub use session::Session;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
