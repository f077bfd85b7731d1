// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harvest runtime library: selector-driven content extraction for single URLs.
//!
//! This library crate exposes the core modules for the binary and for
//! integration testing.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod policy;
pub mod protocol;
pub mod renderer;
pub mod rest;
