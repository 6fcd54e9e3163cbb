//! Retrieve bookmarks from the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `BookmarkClient`
//! over real HTTP through a ureq-backed `Transport`. Validates that request
//! building, authentication and response decoding work end-to-end with the
//! actual server.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mock_server::MockConfig;
use pocket_core::{
    ApiError, BookmarkClient, Cancelled, Context, HttpMethod, HttpRequest, HttpResponse,
    Transport, TransportError,
};

/// `Transport` backed by a ureq agent.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle status interpretation. ureq cannot observe `ctx` once a request
/// is on the wire, so every call is bounded by `timeout` instead.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, ctx: &Context, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        if ctx.is_cancelled() {
            return Err(Box::new(Cancelled));
        }

        let url = req.url.as_str();
        let mut response = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(url);
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(req.body.as_deref().unwrap_or_default())?
            }
        };

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;

        let mut resp = HttpResponse::new(status, body);
        resp.headers = headers;
        Ok(resp)
    }
}

/// Serve `config` on a random local port from a background runtime.
fn start_server(config: MockConfig) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, consumer_key: &str, access_token: &str) -> BookmarkClient<UreqTransport> {
    BookmarkClient::new(
        UreqTransport::new(),
        &format!("http://{addr}"),
        consumer_key,
        access_token,
        "integration",
    )
    .unwrap()
}

#[test]
fn retrieve_lifecycle() {
    let config = MockConfig::default();
    let (consumer_key, access_token) = (config.consumer_key.clone(), config.access_token.clone());
    let addr = start_server(config);
    let ctx = Context::new();

    // Step 1: authenticated retrieve returns only the tagged bookmarks.
    let authed = client(addr, &consumer_key, &access_token);
    let list = authed.retrieve(&ctx).unwrap();
    assert_eq!(list.len(), 2);
    let rust_book = &list["229279689"];
    assert_eq!(rust_book.id, 229279689);
    assert_eq!(rust_book.title, "The Rust Programming Language");
    assert_eq!(rust_book.url, "https://doc.rust-lang.org/book/");
    assert_eq!(list["229279690"].title, "Serde");
    assert!(!list.contains_key("229279691"));

    // Step 2: the same client retrieves again with an identical result.
    let again = authed.retrieve(&ctx).unwrap();
    assert_eq!(again, list);

    // Step 3: a wrong consumer key surfaces the server's X-Error detail.
    let bad_key = client(addr, "wrong", &access_token);
    let err = bad_key.retrieve(&ctx).unwrap_err();
    match err {
        ApiError::FetchError(inner) => match *inner {
            ApiError::UnexpectedStatusError { status, x_error } => {
                assert_eq!(status, "Unauthorized");
                assert_eq!(x_error, "Invalid consumer key.");
            }
            other => panic!("expected UnexpectedStatusError, got {other:?}"),
        },
        other => panic!("expected FetchError, got {other:?}"),
    }

    // Step 4: a wrong access token is rejected as well.
    let bad_token = client(addr, &consumer_key, "wrong");
    let err = bad_token.retrieve(&ctx).unwrap_err();
    let detail = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(
        detail.as_deref(),
        Some("unexpected status code 'Unauthorized': Invalid access token.")
    );

    // Step 5: a cancelled context never reaches the server.
    let cancelled = Context::new();
    cancelled.cancel();
    let err = authed.retrieve(&cancelled).unwrap_err();
    assert!(
        matches!(&err, ApiError::FetchError(inner) if matches!(**inner, ApiError::TransportError(_))),
        "{err:?}"
    );
}

#[test]
fn retrieve_connection_refused_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = client(addr, "ck", "at").retrieve(&Context::new()).unwrap_err();
    match err {
        ApiError::FetchError(inner) => {
            assert!(matches!(*inner, ApiError::TransportError(_)), "{inner:?}")
        }
        other => panic!("expected FetchError, got {other:?}"),
    }
}

#[test]
fn retrieve_stalled_server_is_bounded_by_timeout() {
    // Accepts connections but never answers.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let client = BookmarkClient::new(
        UreqTransport::with_timeout(Duration::from_millis(300)),
        &format!("http://{addr}"),
        "ck",
        "at",
        "integration",
    )
    .unwrap();

    let started = Instant::now();
    let err = client.retrieve(&Context::new()).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    match err {
        ApiError::FetchError(inner) => {
            assert!(matches!(*inner, ApiError::TransportError(_)), "{inner:?}")
        }
        other => panic!("expected FetchError, got {other:?}"),
    }
}
