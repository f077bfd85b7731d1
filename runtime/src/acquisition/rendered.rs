// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser-rendered fetch: navigate, wait for a content marker, capture markup.
//!
//! Each call owns one render context for its whole duration. A single
//! deadline covers the permit wait, context creation, navigation, the
//! visibility wait and the capture. The context is closed on every exit path;
//! a close still pending [`CLOSE_GRACE`] past the deadline finishes in the
//! background so the caller is not held past its time limit.

use crate::error::FetchError;
use crate::renderer::{RenderContext, Renderer};
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout_at;
use tracing::{debug, info, warn};

/// How long past the deadline a caller waits for its context to close.
pub const CLOSE_GRACE: Duration = Duration::from_millis(250);

/// Fetches markup through a headless browser.
pub struct RenderedFetcher {
    renderer: Arc<dyn Renderer>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    poll: Duration,
}

impl RenderedFetcher {
    /// `max_concurrent` bounds how many contexts may be open at once.
    pub fn new(
        renderer: Arc<dyn Renderer>,
        max_concurrent: usize,
        timeout: Duration,
        poll: Duration,
    ) -> Self {
        Self {
            renderer,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            timeout,
            poll,
        }
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Render `url` and return the document's outer HTML once `wait_selector` is visible.
    pub async fn fetch(&self, url: &str, wait_selector: &str) -> Result<String, FetchError> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;
        let timed_out = || FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: self.timeout_ms(),
        };

        let _permit = match timeout_at(deadline, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(e)) => return Err(FetchError::render(url, e)),
            Err(_) => return Err(timed_out()),
        };

        let mut ctx = match timeout_at(deadline, self.renderer.new_context()).await {
            Ok(Ok(ctx)) => ctx,
            Ok(Err(e)) => return Err(FetchError::render(url, format!("{e:#}"))),
            Err(_) => return Err(timed_out()),
        };

        info!(url, wait_selector, "render: start");
        let outcome = timeout_at(deadline, self.render_steps(&mut *ctx, url, wait_selector)).await;

        self.close_context(ctx, url, deadline).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(html)) => {
                info!(url, bytes = html.len(), elapsed_ms, "render: complete");
                Ok(html)
            }
            Ok(Err(e)) => {
                warn!(url, elapsed_ms, "render: failed: {e:#}");
                Err(FetchError::render(url, format!("{e:#}")))
            }
            Err(_) => {
                warn!(url, elapsed_ms, wait_selector, "render: timed out");
                Err(timed_out())
            }
        }
    }

    async fn close_context(
        &self,
        ctx: Box<dyn RenderContext>,
        url: &str,
        deadline: tokio::time::Instant,
    ) {
        let close_by = deadline.max(tokio::time::Instant::now() + CLOSE_GRACE);
        let closing = tokio::spawn(ctx.close());
        match timeout_at(close_by, closing).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(url, "render: failed to close context: {e:#}"),
            Ok(Err(e)) => warn!(url, "render: close task failed: {e}"),
            Err(_) => warn!(url, "render: context still closing, left to finish in background"),
        }
    }

    async fn render_steps(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
        wait_selector: &str,
    ) -> Result<String> {
        let nav = ctx.navigate(url, self.timeout_ms()).await?;
        debug!(final_url = %nav.final_url, load_time_ms = nav.load_time_ms, "render: navigated");

        let script = visibility_script(wait_selector)?;
        loop {
            let visible = ctx.execute_js(&script).await?;
            if visible.as_bool() == Some(true) {
                break;
            }
            tokio::time::sleep(self.poll).await;
        }

        ctx.get_html().await
    }
}

/// Script returning `true` once the first element matching `selector` is displayed
/// with a non-empty box.
pub fn visibility_script(selector: &str) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        "(() => {{\
           const el = document.querySelector({quoted});\
           if (!el) return false;\
           const style = window.getComputedStyle(el);\
           if (style.display === 'none' || style.visibility === 'hidden') return false;\
           const rect = el.getBoundingClientRect();\
           return rect.width > 0 || rect.height > 0;\
         }})()"
    ))
}
