use std::fmt;

/// Connection settings for `BookmarkClient`.
///
/// Inputs are stored as given; nothing is validated until a request is
/// built. `username` is carried for callers but never sent.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    host: String,
    consumer_key: String,
    access_token: String,
    username: String,
}

impl ClientConfig {
    pub fn new(host: &str, consumer_key: &str, access_token: &str, username: &str) -> Self {
        Self {
            host: host.to_string(),
            consumer_key: consumer_key.to_string(),
            access_token: access_token.to_string(),
            username: username.to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

// Keeps credentials out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("consumer_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}
