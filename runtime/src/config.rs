// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and resolution.
//!
//! Resolution order: built-in defaults, then an optional JSON file
//! (`--config` or `HARVEST_CONFIG`), then `HARVEST_*` environment overrides.
//! The result is validated once and never mutated afterwards.

use crate::policy::{default_policies, SitePolicy, SiteRegistry, DEFAULT_USER_AGENT, DEFAULT_WAIT_SELECTOR};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP service binds to.
    pub bind: String,
    /// Port the HTTP service listens on.
    pub port: u16,
    /// User-Agent for static fetches and shortcut calls.
    pub user_agent: String,
    /// Upper bound for one static fetch, in milliseconds.
    pub static_timeout_ms: u64,
    /// Wall-clock bound for navigation, wait and capture, in milliseconds.
    pub render_timeout_ms: u64,
    /// How often the visibility check is re-evaluated while rendering.
    pub render_poll_ms: u64,
    /// Maximum browser pages open at once across all requests.
    pub max_concurrent_renders: usize,
    /// Fail the request on an unparsable selector instead of returning no matches.
    pub strict_selectors: bool,
    /// Marker waited for on rendered sites without their own `wait_selector`.
    pub default_wait_selector: String,
    /// Explicit Chromium binary. Discovered on `PATH` when unset.
    pub chromium_path: Option<PathBuf>,
    /// Per-site fetch policies, checked in order.
    pub sites: Vec<SitePolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 9095,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            static_timeout_ms: 30_000,
            render_timeout_ms: 20_000,
            render_poll_ms: 100,
            max_concurrent_renders: 4,
            strict_selectors: false,
            default_wait_selector: DEFAULT_WAIT_SELECTOR.to_string(),
            chromium_path: None,
            sites: default_policies(),
        }
    }
}

impl Config {
    /// Resolve configuration from an explicit file, `HARVEST_CONFIG`, and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("HARVEST_CONFIG").map(PathBuf::from));

        let mut config = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Apply `HARVEST_*` overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HARVEST_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("HARVEST_PORT") {
            self.port = v
                .trim()
                .parse()
                .with_context(|| format!("HARVEST_PORT is not a port number: {v}"))?;
        }
        if let Some(v) = lookup("HARVEST_STATIC_TIMEOUT_MS") {
            self.static_timeout_ms = parse_ms("HARVEST_STATIC_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("HARVEST_RENDER_TIMEOUT_MS") {
            self.render_timeout_ms = parse_ms("HARVEST_RENDER_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("HARVEST_CHROMIUM_PATH") {
            self.chromium_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("HARVEST_STRICT_SELECTORS") {
            self.strict_selectors = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.static_timeout_ms == 0 || self.render_timeout_ms == 0 {
            bail!("timeouts must be greater than zero");
        }
        if self.render_poll_ms == 0 {
            bail!("render_poll_ms must be greater than zero");
        }
        if self.max_concurrent_renders == 0 {
            bail!("max_concurrent_renders must be at least 1");
        }
        if self.default_wait_selector.trim().is_empty() {
            bail!("default_wait_selector must not be empty");
        }
        for site in &self.sites {
            if site.pattern.is_empty() {
                bail!("site policy with empty pattern would match every URL");
            }
            if let Some(sc) = &site.shortcut {
                if sc.url.trim().is_empty() {
                    bail!("site {} has a shortcut without an endpoint url", site.pattern);
                }
                if sc.sentinel.trim().is_empty() {
                    bail!("site {} has a shortcut without a sentinel name", site.pattern);
                }
            }
        }
        Ok(())
    }

    pub fn static_timeout(&self) -> Duration {
        Duration::from_millis(self.static_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn render_poll(&self) -> Duration {
        Duration::from_millis(self.render_poll_ms)
    }

    /// Build the site registry this configuration describes.
    pub fn registry(&self) -> SiteRegistry {
        SiteRegistry::new(self.sites.clone(), self.default_wait_selector.clone())
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} is not a number of milliseconds: {value}"))
}
