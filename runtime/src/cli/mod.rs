// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the Harvest binary.

pub mod classify_cmd;
pub mod doctor;
pub mod extract_cmd;
pub mod serve;

use crate::config::Config;
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{NoopRenderer, Renderer};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the harvest crates log at `info`,
/// or `debug` with `verbose`.
pub fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = match std::env::var("RUST_LOG") {
        Ok(spec) if !spec.trim().is_empty() => EnvFilter::try_new(spec)?,
        _ => EnvFilter::try_new(format!("harvest={level},harvest_runtime={level}"))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Launch Chromium, falling back to HTTP-only mode when it is unavailable.
pub async fn launch_renderer(config: &Config) -> Arc<dyn Renderer> {
    match ChromiumRenderer::new(config.chromium_path.as_deref()).await {
        Ok(renderer) => {
            info!("Chromium renderer initialized");
            Arc::new(renderer)
        }
        Err(e) => {
            warn!("Failed to initialize Chromium: {e:#}");
            warn!("Running in HTTP-only mode (rendered sites will fail)");
            Arc::new(NoopRenderer)
        }
    }
}
