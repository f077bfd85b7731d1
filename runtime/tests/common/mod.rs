//! Shared fixtures: a scriptable in-memory renderer and config builders.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use harvest_runtime::config::Config;
use harvest_runtime::policy::{ShortcutEndpoint, SitePolicy};
use harvest_runtime::renderer::{NavigationResult, RenderContext, Renderer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a fake page does once navigated.
#[derive(Clone)]
pub enum PageScript {
    /// Marker becomes visible after `polls` checks; then `html` is captured.
    Ready { polls: usize, html: String },
    /// The marker never shows up.
    NeverVisible,
    /// Navigation never completes.
    Hang,
}

/// In-memory renderer that counts open contexts and records visited URLs.
pub struct FakeRenderer {
    script: PageScript,
    active: Arc<AtomicUsize>,
    opened: AtomicUsize,
    visited: Arc<Mutex<Vec<String>>>,
    scripts_seen: Arc<Mutex<Vec<String>>>,
}

impl FakeRenderer {
    pub fn new(script: PageScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            active: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
            visited: Arc::new(Mutex::new(Vec::new())),
            scripts_seen: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn ready(html: &str) -> Arc<Self> {
        Self::new(PageScript::Ready {
            polls: 2,
            html: html.to_string(),
        })
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn scripts_seen(&self) -> Vec<String> {
        self.scripts_seen.lock().unwrap().clone()
    }
}

struct FakeContext {
    script: PageScript,
    checks: AtomicUsize,
    active: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
    scripts_seen: Arc<Mutex<Vec<String>>>,
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            script: self.script.clone(),
            checks: AtomicUsize::new(0),
            active: Arc::clone(&self.active),
            visited: Arc::clone(&self.visited),
            scripts_seen: Arc::clone(&self.scripts_seen),
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn active_contexts(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.visited.lock().unwrap().push(url.to_string());
        if let PageScript::Hang = self.script {
            return futures::future::pending().await;
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 3,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        self.scripts_seen.lock().unwrap().push(script.to_string());
        let n = self.checks.fetch_add(1, Ordering::SeqCst);
        let visible = match &self.script {
            PageScript::Ready { polls, .. } => n >= *polls,
            _ => false,
        };
        Ok(serde_json::Value::Bool(visible))
    }

    async fn get_html(&self) -> Result<String> {
        match &self.script {
            PageScript::Ready { html, .. } => Ok(html.clone()),
            _ => anyhow::bail!("page never became ready"),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Config with two test sites: `render.test` (rendered, waits for `.card`)
/// and `shop.test` (shortcut to `shortcut_url`).
pub fn test_config(shortcut_url: &str) -> Config {
    Config {
        render_timeout_ms: 300,
        render_poll_ms: 5,
        static_timeout_ms: 2_000,
        sites: vec![
            SitePolicy::rendered("render.test").with_wait_selector(".card"),
            SitePolicy::rendered("shop.test").with_shortcut(ShortcutEndpoint {
                url: shortcut_url.to_string(),
                referer: "https://shop.test/".to_string(),
                accept: "application/json".to_string(),
                sentinel: "shop_raw_json".to_string(),
            }),
        ],
        ..Config::default()
    }
}

pub const CATALOG_HTML: &str = r#"<!doctype html>
<html><body>
  <ul class="catalog">
    <li class="item"><h2 class="title">Running Shoes</h2><span class="price">4 990</span></li>
    <li class="item"><h2 class="title">Trail Shoes</h2><span class="price">6 490</span></li>
    <li class="item"><h2 class="title">   </h2><span class="price">990</span></li>
  </ul>
</body></html>"#;
