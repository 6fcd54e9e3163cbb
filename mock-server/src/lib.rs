use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const X_ERROR: &str = "x-error";

/// A bookmark held by the mock server, with the tags used for filtering.
#[derive(Clone, Debug)]
pub struct StoredBookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
}

/// Wire shape of one entry in the `list` object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub resolved_title: String,
    pub resolved_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub list: BTreeMap<String, Item>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RetrieveOptions {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthParams {
    pub consumer_key: Option<String>,
    pub access_token: Option<String>,
}

/// Credentials the server accepts and the bookmarks it serves.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub consumer_key: String,
    pub access_token: String,
    pub bookmarks: Vec<StoredBookmark>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            consumer_key: "consumer-key".to_string(),
            access_token: "access-token".to_string(),
            bookmarks: vec![
                StoredBookmark {
                    id: 229279689,
                    title: "The Rust Programming Language".to_string(),
                    url: "https://doc.rust-lang.org/book/".to_string(),
                    tags: vec!["rmk".to_string(), "rust".to_string()],
                },
                StoredBookmark {
                    id: 229279690,
                    title: "Serde".to_string(),
                    url: "https://serde.rs/".to_string(),
                    tags: vec!["rmk".to_string()],
                },
                StoredBookmark {
                    id: 229279691,
                    title: "Tokio".to_string(),
                    url: "https://tokio.rs/".to_string(),
                    tags: vec!["async".to_string()],
                },
            ],
        }
    }
}

pub type Shared = Arc<MockConfig>;

pub fn app(config: MockConfig) -> Router {
    Router::new()
        .route("/get", post(retrieve))
        .with_state(Arc::new(config))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

/// Error response carrying the reason in the `X-Error` header.
fn reject(status: StatusCode, reason: &'static str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(X_ERROR, HeaderValue::from_static(reason));
    (status, headers).into_response()
}

// The body is parsed by hand: clients send `application/json charset=utf-8`,
// which the `Json` extractor would refuse.
async fn retrieve(
    State(config): State<Shared>,
    Query(auth): Query<AuthParams>,
    body: Bytes,
) -> Response {
    if auth.consumer_key.as_deref() != Some(config.consumer_key.as_str()) {
        info!("POST /get rejected: bad consumer key");
        return reject(StatusCode::UNAUTHORIZED, "Invalid consumer key.");
    }
    if auth.access_token.as_deref() != Some(config.access_token.as_str()) {
        info!("POST /get rejected: bad access token");
        return reject(StatusCode::UNAUTHORIZED, "Invalid access token.");
    }

    let opts: RetrieveOptions = if body.is_empty() {
        RetrieveOptions::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(opts) => opts,
            Err(_) => return reject(StatusCode::BAD_REQUEST, "Invalid request body."),
        }
    };

    let list: BTreeMap<String, Item> = config
        .bookmarks
        .iter()
        .filter(|b| opts.tag.as_ref().is_none_or(|tag| b.tags.contains(tag)))
        .map(|b| {
            (
                b.id.to_string(),
                Item {
                    item_id: b.id.to_string(),
                    resolved_title: b.title.clone(),
                    resolved_url: b.url.clone(),
                },
            )
        })
        .collect();

    info!("POST /get tag={:?} -> {} items", opts.tag, list.len());
    Json(RetrieveResponse { list }).into_response()
}
