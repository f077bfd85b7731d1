// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Show which fetch path a URL would take.

use crate::config::Config;
use crate::pipeline::{FetchPlan, Pipeline};
use crate::renderer::NoopRenderer;
use anyhow::Result;
use std::sync::Arc;

pub fn run(config: &Config, url: &str, json: bool) -> Result<()> {
    let pipeline = Pipeline::new(config, Arc::new(NoopRenderer))?;
    let plan = pipeline.plan(url);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    println!("{}", describe(&plan));
    Ok(())
}

fn describe(plan: &FetchPlan) -> String {
    match plan {
        FetchPlan::Shortcut { endpoint, sentinel } => {
            format!("shortcut  {endpoint}  (reported as {sentinel:?}, selectors ignored)")
        }
        FetchPlan::Static => "static    plain HTTP GET".to_string(),
        FetchPlan::Rendered { wait_selector } => {
            format!("rendered  headless Chromium, waiting for {wait_selector:?}")
        }
    }
}
