// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markup and payload acquisition.
//!
//! Three ways to obtain content for a URL: a plain HTTP GET, a headless
//! browser render, or a direct call to a site's backing data endpoint.

pub mod http_client;
pub mod rendered;
pub mod shortcut;
