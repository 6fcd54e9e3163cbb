//! Authenticated client for the bookmark API.
//!
//! # Design
//! `BookmarkClient` holds an immutable `ClientConfig`, the injected
//! `Transport`, and the retrieve options serialized once at construction.
//! The serialized options live in a `Bytes` handle that every request
//! clones, so no read position is shared between calls and a single client
//! can be used from several threads at once.

use std::collections::HashMap;
use std::io::Read;

use bytes::Bytes;
use log::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Cancelled, Context, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{Bookmark, RetrieveOptions, RetrieveResult};

const ENDPOINT_RETRIEVE: &str = "/get";
const X_ERROR_HEADER: &str = "X-Error";
const CONTENT_TYPE: &str = "application/json charset=utf-8";

/// Client for the bookmark retrieval endpoint.
#[derive(Debug, Clone)]
pub struct BookmarkClient<T> {
    config: ClientConfig,
    transport: T,
    retrieve_opts: Bytes,
}

impl<T: Transport> BookmarkClient<T> {
    /// Create a client. None of the strings are validated; a bad `host`
    /// surfaces as `RequestBuildError` on the first `retrieve`.
    pub fn new(
        transport: T,
        host: &str,
        consumer_key: &str,
        access_token: &str,
        username: &str,
    ) -> Result<Self, ApiError> {
        Self::from_config(
            transport,
            ClientConfig::new(host, consumer_key, access_token, username),
        )
    }

    pub fn from_config(transport: T, config: ClientConfig) -> Result<Self, ApiError> {
        let opts = serde_json::to_vec(&RetrieveOptions::default())
            .map_err(ApiError::SerializationError)?;
        Ok(Self {
            config,
            transport,
            retrieve_opts: Bytes::from(opts),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The serialized body sent with every retrieve request.
    pub fn retrieve_options(&self) -> &[u8] {
        &self.retrieve_opts
    }

    /// Fetch the tagged bookmarks, keyed by item id as sent by the server.
    pub fn retrieve(&self, ctx: &Context) -> Result<HashMap<String, Bookmark>, ApiError> {
        let base = self.config.host().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{ENDPOINT_RETRIEVE}"))
            .map_err(ApiError::RequestBuildError)?;

        let mut req = HttpRequest::new(HttpMethod::Post, url);
        req.body = Some(self.retrieve_opts.clone());

        let resp = self
            .send(ctx, req, self.config.access_token(), 200)
            .map_err(|e| ApiError::FetchError(Box::new(e)))?;
        let body = read_body(resp)?;

        let result: RetrieveResult =
            serde_json::from_slice(&body).map_err(ApiError::DecodeError)?;
        debug!("retrieved {} bookmarks", result.list.len());
        Ok(result.list)
    }

    /// Attach credentials and the JSON content type, dispatch through the
    /// transport, and check the status. The body is left unread.
    fn send(
        &self,
        ctx: &Context,
        mut req: HttpRequest,
        access_token: &str,
        expected_status: u16,
    ) -> Result<HttpResponse, ApiError> {
        req.set_header("Content-Type", CONTENT_TYPE);
        debug!("{} {}", req.method.as_str(), req.url);
        set_credentials(&mut req.url, self.config.consumer_key(), access_token);

        if ctx.is_cancelled() {
            return Err(ApiError::TransportError(Box::new(Cancelled)));
        }

        let resp = self
            .transport
            .send(ctx, req)
            .map_err(ApiError::TransportError)?;

        if resp.status != expected_status {
            let status = status_text(resp.status);
            let x_error = resp.header(X_ERROR_HEADER).unwrap_or_default().to_string();
            warn!("unexpected status {} ({status}): {x_error}", resp.status);
            return Err(ApiError::UnexpectedStatusError { status, x_error });
        }
        Ok(resp)
    }
}

/// Replace any `consumer_key`/`access_token` pairs with the given values,
/// keeping every other query pair in order.
fn set_credentials(url: &mut Url, consumer_key: &str, access_token: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "consumer_key" && k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("consumer_key", consumer_key)
        .append_pair("access_token", access_token);
}

/// Drain the body; the response is dropped on every path out of here.
fn read_body(mut resp: HttpResponse) -> Result<Vec<u8>, ApiError> {
    let mut body = Vec::new();
    resp.body
        .read_to_end(&mut body)
        .map_err(ApiError::BodyReadError)?;
    Ok(body)
}

fn status_text(status: u16) -> String {
    ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}
