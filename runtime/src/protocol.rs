// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request and response types for the extraction endpoint.
//!
//! The JSON shape is what the existing front-end posts and reads:
//! `{"url", "selectors"}` in, `{"results": [{"selector", "results"}]}` out.

use crate::error::RequestError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One extraction request: a single URL and the selectors to apply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
    /// Missing and `null` both mean no selectors.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selectors: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>, selectors: Vec<String>) -> Self {
        Self {
            url: url.into(),
            selectors,
        }
    }

    /// Check the URL is absolute http(s) before anything is fetched.
    pub fn validate(&self) -> Result<(), RequestError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| RequestError::InvalidInput(format!("url {:?}: {e}", self.url)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(RequestError::InvalidInput(format!(
                "unsupported url scheme {other:?}"
            ))),
        }
    }
}

/// Matches for one selector, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorResult {
    pub selector: String,
    /// Non-empty trimmed text of every matched node.
    #[serde(rename = "results", default)]
    pub matches: Vec<String>,
}

/// Response to an [`ExtractionRequest`]: one entry per requested selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub results: Vec<SelectorResult>,
}

impl ExtractionResponse {
    /// Wrap a raw shortcut payload as the single synthetic result entry.
    pub fn from_shortcut(sentinel: &str, payload: String) -> Self {
        Self {
            results: vec![SelectorResult {
                selector: sentinel.to_string(),
                matches: vec![payload],
            }],
        }
    }
}

/// Error object returned to HTTP clients.
pub fn error_body(err: &RequestError) -> Value {
    let mut error = serde_json::json!({
        "code": err.code(),
        "message": err.to_string(),
    });
    if let Some(stage) = err.stage() {
        error["stage"] = serde_json::json!(stage);
    }
    serde_json::json!({ "error": error })
}
