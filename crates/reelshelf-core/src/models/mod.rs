//! Data models for the movie catalog backend.
//!
//! This module contains the data structures exchanged with the REST API:
//!
//! - `MovieSummary`: a catalog search result
//! - `Favorite`, `NewFavorite`: entries of the caller's favorites list
//! - `ShareLink`, `SharedList`: read-only snapshots of a favorites list
//! - `TokenPair`, `Registration`, `FieldErrors`: account endpoints

pub mod account;
pub mod favorite;
pub mod movie;
pub mod share;

pub use account::{FieldErrors, Registration, TokenPair};
pub use favorite::{Favorite, NewFavorite};
pub use movie::MovieSummary;
pub use share::{ShareLink, SharedList};
