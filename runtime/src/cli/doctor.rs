// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::config::Config;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Check Chromium availability and print the effective configuration.
pub fn run(config: &Config) -> Result<()> {
    println!("Harvest Doctor");
    println!("==============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let chromium_path = find_chromium(config.chromium_path.as_deref());
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Rendered sites will fail. Set HARVEST_CHROMIUM_PATH."
        ),
    }

    println!("[OK] Listen address: {}:{}", config.bind, config.port);
    println!(
        "[OK] Timeouts: static {}ms, render {}ms",
        config.static_timeout_ms, config.render_timeout_ms
    );
    println!(
        "[OK] Selector mode: {}",
        if config.strict_selectors { "strict" } else { "lenient" }
    );
    println!("[OK] Site policies ({}):", config.sites.len());
    for site in &config.sites {
        let wait = site
            .wait_selector
            .as_deref()
            .unwrap_or(&config.default_wait_selector);
        let shortcut = if site.shortcut.is_some() { ", shortcut" } else { "" };
        println!("       {:<20} {:?}, wait {wait:?}{shortcut}", site.pattern, site.strategy);
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: HTTP-ONLY");
    }

    Ok(())
}
