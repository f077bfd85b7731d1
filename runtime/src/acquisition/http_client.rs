// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just single GET requests with a desktop browser identity.
//! No retries and no status inspection: a 404 or 500 body is still returned
//! as the fetched text.

use crate::error::FetchError;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, trace};

/// HTTP client for the static and shortcut fetch paths.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client sending `user_agent` on every request.
    ///
    /// No cookie store is attached, so no session credentials ever leave.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// Fetch `url` and return the raw body as text.
    pub async fn fetch_static(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url, &[]).await
    }

    /// Perform one GET with extra headers and read the whole body into memory.
    ///
    /// Construction, transport and body-read failures map to distinct
    /// [`FetchError`] variants.
    pub async fn get_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let mut builder = self.client.get(url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.build().map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| self.transport_error(url, source, Stage::Network))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| self.transport_error(url, source, Stage::Read))?;

        debug!(url, status, bytes = body.len(), "GET complete");
        trace!(url, body = %body, "response body");
        Ok(body)
    }

    fn transport_error(&self, url: &str, source: reqwest::Error, stage: Stage) -> FetchError {
        let url = url.to_string();
        if source.is_timeout() {
            return FetchError::Timeout {
                url,
                timeout_ms: self.timeout.as_millis() as u64,
            };
        }
        match stage {
            Stage::Network => FetchError::Network { url, source },
            Stage::Read => FetchError::Read { url, source },
        }
    }
}

#[derive(Clone, Copy)]
enum Stage {
    Network,
    Read,
}
