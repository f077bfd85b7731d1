// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run the extraction service in the foreground.

use crate::cli::launch_renderer;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::rest::{self, AppState};
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

/// Start the HTTP service and block until Ctrl-C.
pub async fn run(mut config: Config, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(b) = bind {
        config.bind = b;
    }
    if let Some(p) = port {
        config.port = p;
    }
    let ip: IpAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.bind))?;
    let addr = SocketAddr::new(ip, config.port);

    info!("starting Harvest v{}", env!("CARGO_PKG_VERSION"));

    let renderer = launch_renderer(&config).await;
    let pipeline = Arc::new(
        Pipeline::new(&config, Arc::clone(&renderer)).context("failed to build pipeline")?,
    );
    let state = Arc::new(AppState::new(pipeline));

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("received shutdown signal");
    };
    let result = rest::start(addr, state, shutdown).await;

    renderer.shutdown().await.ok();
    info!("server stopped");
    result
}
