// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Apply CSS selectors to fetched markup.
//!
//! Markup is parsed with `scraper` (html5ever), which recovers from any input,
//! including fragments and the empty string. For each selector, in request
//! order, every match contributes its trimmed text content unless that text
//! is empty.

use crate::error::SelectorError;
use crate::protocol::SelectorResult;
use scraper::{Html, Selector};
use tracing::warn;

/// Extract matches for every selector, treating unparsable selectors as matching nothing.
pub fn extract(markup: &str, selectors: &[String]) -> Vec<SelectorResult> {
    let document = Html::parse_document(markup);
    selectors
        .iter()
        .map(|raw| {
            let matches = match compile(raw) {
                Ok(selector) => collect_text(&document, &selector),
                Err(e) => {
                    warn!("{e}; reporting no matches");
                    Vec::new()
                }
            };
            SelectorResult {
                selector: raw.clone(),
                matches,
            }
        })
        .collect()
}

/// Like [`extract`], but the first unparsable selector fails the whole call.
pub fn extract_strict(
    markup: &str,
    selectors: &[String],
) -> Result<Vec<SelectorResult>, SelectorError> {
    let compiled = selectors
        .iter()
        .map(|raw| compile(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let document = Html::parse_document(markup);
    Ok(selectors
        .iter()
        .zip(&compiled)
        .map(|(raw, selector)| SelectorResult {
            selector: raw.clone(),
            matches: collect_text(&document, selector),
        })
        .collect())
}

fn compile(raw: &str) -> Result<Selector, SelectorError> {
    Selector::parse(raw).map_err(|e| SelectorError {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

fn collect_text(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|el| {
            let text: String = el.text().collect();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
