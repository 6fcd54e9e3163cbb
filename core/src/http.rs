//! HTTP transport types and the injected `Transport` capability.
//!
//! # Design
//! Requests and responses are plain data. The client never opens a socket
//! itself; it hands a finished `HttpRequest` to whatever `Transport` the
//! caller injected and gets an `HttpResponse` back. Unit tests substitute a
//! mock, the integration suite plugs in ureq.
//!
//! Response bodies are readers rather than strings so that a transport can
//! stream, and so that a failed drain is observable by the client.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use url::Url;

/// Error type returned by `Transport` implementations.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set `name` to `value`, dropping any earlier value (names compare
    /// case-insensitively).
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response as returned by a `Transport`.
///
/// Dropping the response releases the body reader.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    /// Response with an in-memory body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Box::new(Cursor::new(body.into())),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Cancellation context threaded through every call.
///
/// Clones share the same flag, so a caller can keep one handle and cancel a
/// request running on another thread.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The request was abandoned because its `Context` was cancelled.
#[derive(Debug, thiserror::Error)]
#[error("request cancelled")]
pub struct Cancelled;

/// Executes one HTTP round-trip.
///
/// Implementations must not dispatch a request whose `ctx` is already
/// cancelled and should report `Cancelled` in that case. Aborting a request
/// that is already in flight is up to the HTTP stack behind the transport;
/// one that cannot observe `ctx` mid-request should bound the call with a
/// timeout instead.
pub trait Transport {
    fn send(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(ctx, request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(ctx, request)
    }
}
