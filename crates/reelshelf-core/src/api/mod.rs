//! REST API client module for the movie catalog backend.
//!
//! This module provides the `ApiClient` for searching the catalog, managing
//! the caller's favorites and generating/reading shared lists.
//!
//! The API uses JWT bearer token authentication obtained through the
//! `/token/` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ErrorPayload};
