// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the extraction pipeline.
//!
//! Every failure aborts the whole request. The REST layer maps
//! [`RequestError::InvalidInput`] to a client error and everything else to a
//! server error, keeping the failing [`FetchStage`] for diagnostics.

use serde::Serialize;
use std::fmt;

/// Stage at which obtaining markup (or a shortcut payload) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStage {
    Request,
    Network,
    Read,
    Timeout,
    Render,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStage::Request => "request",
            FetchStage::Network => "network",
            FetchStage::Read => "read",
            FetchStage::Timeout => "timeout",
            FetchStage::Render => "render",
        };
        f.write_str(s)
    }
}

/// Failure while fetching markup or a shortcut payload.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("failed to build request for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("network error fetching {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("failed to read response body from {url}: {source}")]
    Read { url: String, source: reqwest::Error },

    #[error("fetching {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("rendering {url} failed: {reason}")]
    Render { url: String, reason: String },
}

impl FetchError {
    /// The stage this error originated from.
    pub fn stage(&self) -> FetchStage {
        match self {
            FetchError::Request { .. } => FetchStage::Request,
            FetchError::Network { .. } => FetchStage::Network,
            FetchError::Read { .. } => FetchStage::Read,
            FetchError::Timeout { .. } => FetchStage::Timeout,
            FetchError::Render { .. } => FetchStage::Render,
        }
    }

    /// The URL that was being fetched.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Read { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Render { url, .. } => url,
        }
    }

    pub(crate) fn render(url: &str, err: impl fmt::Display) -> Self {
        FetchError::Render {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

/// A selector expression the CSS parser rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

/// Top-level failure of one extraction request.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

impl RequestError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::InvalidInput(_) => "E_INVALID_REQUEST",
            RequestError::Selector(_) => "E_SELECTOR",
            RequestError::Fetch(e) => match e.stage() {
                FetchStage::Request => "E_FETCH_REQUEST",
                FetchStage::Network => "E_FETCH_NETWORK",
                FetchStage::Read => "E_FETCH_READ",
                FetchStage::Timeout => "E_FETCH_TIMEOUT",
                FetchStage::Render => "E_FETCH_RENDER",
            },
        }
    }

    /// Whether the caller sent something unusable (as opposed to a server-side failure).
    pub fn is_client_error(&self) -> bool {
        matches!(self, RequestError::InvalidInput(_))
    }

    /// Fetch stage, when the failure happened while fetching.
    pub fn stage(&self) -> Option<FetchStage> {
        match self {
            RequestError::Fetch(e) => Some(e.stage()),
            _ => None,
        }
    }
}
