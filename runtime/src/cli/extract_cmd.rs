// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! One-shot extraction from the command line.

use crate::cli::launch_renderer;
use crate::config::Config;
use crate::pipeline::{FetchPlan, Pipeline};
use crate::protocol::ExtractionRequest;
use crate::renderer::{NoopRenderer, Renderer};
use anyhow::Result;
use std::sync::Arc;

/// Extract `selectors` from `url` and print the JSON response to stdout.
pub async fn run(config: &Config, url: &str, selectors: Vec<String>) -> Result<()> {
    // Only pay for a browser launch when the URL actually needs one.
    let probe = Pipeline::new(config, Arc::new(NoopRenderer))?;
    let renderer: Arc<dyn Renderer> = match probe.plan(url) {
        FetchPlan::Rendered { .. } => launch_renderer(config).await,
        _ => Arc::new(NoopRenderer),
    };
    let pipeline = Pipeline::new(config, Arc::clone(&renderer))?;

    let req = ExtractionRequest::new(url, selectors);
    let outcome = pipeline.handle(&req).await;
    renderer.shutdown().await.ok();

    let resp = outcome?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}
