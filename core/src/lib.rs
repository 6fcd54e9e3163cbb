//! Client core for a bookmark retrieval API.
//!
//! # Overview
//! `BookmarkClient::retrieve` posts the fixed retrieve options to
//! `{host}/get`, authenticates with `consumer_key`/`access_token` query
//! parameters, checks for a 200, and decodes the `list` of bookmarks.
//!
//! # Design
//! - Network I/O is delegated to an injected `Transport`, so the crate
//!   links no HTTP stack and tests swap in a mock.
//! - A `Context` is threaded through every call for cancellation.
//! - Errors carry the failing step and keep their cause reachable through
//!   `std::error::Error::source`. Nothing is retried.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::BookmarkClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use crate::http::{Cancelled, Context, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use types::{Bookmark, RetrieveOptions, RetrieveResult};
