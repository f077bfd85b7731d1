// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{CreateBrowserContextParams, CreateTargetParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Configured path (config file or HARVEST_CHROMIUM_PATH)
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }

    // 2. ~/.harvest/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".harvest/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".harvest/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".harvest/chromium/chrome-linux64/chrome"),
                home.join(".harvest/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
///
/// One browser process is shared; every context gets its own browser context
/// so cookies, storage and cache never leak between requests.
pub struct ChromiumRenderer {
    browser: Arc<Browser>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a new ChromiumRenderer, launching a headless Chromium instance.
    pub async fn new(explicit_path: Option<&Path>) -> Result<Self> {
        let chrome_path = find_chromium(explicit_path)
            .context("Chromium not found. Set HARVEST_CHROMIUM_PATH or install Chrome.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // The CDP event loop must be driven for any page command to complete.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("chromium handler event error: {e}");
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let context_id = self
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .context("failed to create browser context")?;

        let mut params = CreateTargetParams::new("about:blank");
        params.browser_context_id = Some(context_id.clone());
        let page = match self.browser.new_page(params).await {
            Ok(page) => page,
            Err(e) => {
                if let Err(dispose) = self.browser.dispose_browser_context(context_id).await {
                    warn!("failed to dispose browser context: {dispose}");
                }
                return Err(anyhow::Error::new(e).context("failed to create new page"));
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            browser: Arc::clone(&self.browser),
            context_id: Some(context_id),
            page: Some(page),
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        // Browser process is killed when ChromiumRenderer is dropped
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single page inside its own browser context.
///
/// Page and browser context are released by [`RenderContext::close`], or in
/// the background by `Drop` when the owning future was cancelled first.
pub struct ChromiumContext {
    browser: Arc<Browser>,
    context_id: Option<BrowserContextId>,
    page: Option<Page>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumContext {
    fn page(&self) -> Result<&Page> {
        match self.page.as_ref() {
            Some(p) => Ok(p),
            None => bail!("page already closed"),
        }
    }
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();
        let page = self.page()?;

        let result =
            tokio::time::timeout(std::time::Duration::from_millis(timeout_ms), page.goto(url))
                .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page()?
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let page = this.page.take();
        let context_id = this.context_id.take();
        release(&this.browser, page, context_id).await
    }
}

/// Close `page`, then dispose the browser context holding it.
async fn release(
    browser: &Browser,
    page: Option<Page>,
    context_id: Option<BrowserContextId>,
) -> Result<()> {
    let closed = match page {
        Some(page) => page.close().await.context("failed to close page"),
        None => Ok(()),
    };
    if let Some(id) = context_id {
        browser
            .dispose_browser_context(id)
            .await
            .context("failed to dispose browser context")?;
    }
    closed
}

impl Drop for ChromiumContext {
    fn drop(&mut self) {
        let page = self.page.take();
        let context_id = self.context_id.take();
        if page.is_some() || context_id.is_some() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let browser = Arc::clone(&self.browser);
                    handle.spawn(async move {
                        if let Err(e) = release(&browser, page, context_id).await {
                            warn!("failed to release abandoned context: {e:#}");
                        }
                    });
                }
                Err(_) => warn!("context dropped outside a runtime; left for browser shutdown"),
            }
        }
        self.active_count.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_skipped() {
        let found = find_chromium(Some(Path::new("/definitely/not/here/chrome")));
        assert_ne!(found, Some(PathBuf::from("/definitely/not/here/chrome")));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_capture() {
        let renderer = ChromiumRenderer::new(None)
            .await
            .expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");
        assert_eq!(renderer.active_contexts(), 1);

        ctx.navigate("data:text/html,<h1>Hello</h1><p>World</p>", 10000)
            .await
            .expect("navigation failed");

        let result = ctx
            .execute_js("document.querySelector('h1').textContent")
            .await
            .expect("JS execution failed");
        assert_eq!(result.as_str().unwrap(), "Hello");

        let html = ctx.get_html().await.expect("get_html failed");
        assert!(html.contains("<h1>Hello</h1>"));

        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_dropped_context_is_released() {
        let renderer = ChromiumRenderer::new(None)
            .await
            .expect("failed to create renderer");
        let ctx = renderer.new_context().await.expect("context");
        drop(ctx);
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_contexts_do_not_share_cookies() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc; Path=/")
                    .insert_header("content-type", "text/html")
                    .set_body_string("<p>catalog</p>"),
            )
            .mount(&server)
            .await;

        let renderer = ChromiumRenderer::new(None)
            .await
            .expect("failed to create renderer");

        let mut first = renderer.new_context().await.expect("context");
        first.navigate(&server.uri(), 10000).await.expect("navigation failed");
        let cookie = first.execute_js("document.cookie").await.expect("js");
        assert_eq!(cookie.as_str(), Some("session=abc"));

        let mut second = renderer.new_context().await.expect("context");
        second.navigate(&server.uri(), 10000).await.expect("navigation failed");
        let requests = server.received_requests().await.unwrap_or_default();
        let second_request = requests.last().expect("second request");
        assert!(second_request.headers.get("cookie").is_none());

        first.close().await.expect("close failed");
        second.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
    }
}
