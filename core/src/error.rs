//! Error types for the bookmark API client.
//!
//! # Design
//! Every variant names the step that failed and, where there is an
//! underlying cause, exposes it through `Error::source` so callers can walk
//! the chain down to the transport's own error. Messages describe only their
//! own layer; reporters print the chain. `FetchError` is the wrapper
//! `retrieve` puts around anything the authenticated send step returns.

use crate::http::TransportError;

/// Errors returned by `BookmarkClient`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The fixed retrieve options could not be serialized to JSON.
    #[error("could not marshal retrieve options")]
    SerializationError(#[source] serde_json::Error),

    /// The request URL could not be built from the configured host.
    #[error("could not create request for fetch bookmarks")]
    RequestBuildError(#[source] url::ParseError),

    /// The authenticated send step failed.
    #[error("could not fetch bookmarks")]
    FetchError(#[source] Box<ApiError>),

    /// The transport reported a failure, including cancellation.
    #[error("could not make request")]
    TransportError(#[source] TransportError),

    /// The server answered with a status other than the expected one.
    /// `x_error` holds the `X-Error` response header, empty when absent.
    #[error("unexpected status code '{status}': {x_error}")]
    UnexpectedStatusError { status: String, x_error: String },

    /// The response body could not be read to the end.
    #[error("could not read response body")]
    BodyReadError(#[source] std::io::Error),

    /// The response body is not the expected JSON shape.
    #[error("could not unmarshal response body")]
    DecodeError(#[source] serde_json::Error),
}
