//! Wire DTOs for the bookmark API.
//!
//! # Design
//! Field names follow the server's JSON (`item_id`, `resolved_title`, ...)
//! through serde renames; the Rust side uses short names. The mock-server
//! crate defines its own copies of these shapes and the integration tests
//! catch any drift between the two.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Tag every retrieve request filters on.
pub const DEFAULT_TAG: &str = "rmk";

/// Request payload for `POST /get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            tag: Some(DEFAULT_TAG.to_string()),
        }
    }
}

/// A single saved item.
///
/// Missing or `null` fields decode to their zero value; the server leaves
/// `resolved_title` out for items it has not resolved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bookmark {
    #[serde(rename = "item_id", with = "string_id")]
    pub id: i64,
    #[serde(rename = "resolved_title", deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(rename = "resolved_url", deserialize_with = "null_as_empty")]
    pub url: String,
}

/// Response body of `POST /get`, keyed by the transmitted item id.
/// A body without `list` decodes to an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieveResult {
    pub list: HashMap<String, Bookmark>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API sends integer ids as JSON strings holding a JSON number, so
/// `"+1"` and `"01"` are rejected. `null` decodes to 0.
mod string_id {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(0);
        };
        if !is_json_integer(&raw) {
            return Err(D::Error::custom(format!("invalid item_id {raw:?}")));
        }
        raw.parse()
            .map_err(|_| D::Error::custom(format!("item_id out of range {raw:?}")))
    }

    fn is_json_integer(raw: &str) -> bool {
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
    }
}
