// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request orchestration: shortcut, or classify and fetch, then extract.
//!
//! Steps run strictly in sequence and the first failure aborts the request.
//! There is no fallback between fetch paths and no partial response.

use crate::acquisition::http_client::HttpClient;
use crate::acquisition::rendered::RenderedFetcher;
use crate::acquisition::shortcut::{self, ShortcutPayload};
use crate::config::Config;
use crate::error::RequestError;
use crate::extraction;
use crate::policy::{FetchStrategy, SiteRegistry};
use crate::protocol::{ExtractionRequest, ExtractionResponse};
use crate::renderer::Renderer;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// The fetch path chosen for a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum FetchPlan {
    /// Call the site's data endpoint; selectors are ignored.
    Shortcut { endpoint: String, sentinel: String },
    Static,
    Rendered { wait_selector: String },
}

/// Stateless request handler shared by all connections.
pub struct Pipeline {
    registry: SiteRegistry,
    http: HttpClient,
    rendered: RenderedFetcher,
    strict_selectors: bool,
}

impl Pipeline {
    /// Build the pipeline described by `config` on top of `renderer`.
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self> {
        let http = HttpClient::new(&config.user_agent, config.static_timeout())?;
        let rendered = RenderedFetcher::new(
            renderer,
            config.max_concurrent_renders,
            config.render_timeout(),
            config.render_poll(),
        );
        Ok(Self {
            registry: config.registry(),
            http,
            rendered,
            strict_selectors: config.strict_selectors,
        })
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        self.rendered.renderer()
    }

    /// Decide how `url` would be fetched, without fetching it.
    pub fn plan(&self, url: &str) -> FetchPlan {
        if let Some(sc) = self.registry.shortcut_for(url) {
            return FetchPlan::Shortcut {
                endpoint: sc.url.clone(),
                sentinel: sc.sentinel.clone(),
            };
        }
        match self.registry.classify(url) {
            FetchStrategy::Static => FetchPlan::Static,
            FetchStrategy::Rendered => FetchPlan::Rendered {
                wait_selector: self.registry.wait_selector_for(url).to_string(),
            },
        }
    }

    /// Run one extraction request end to end.
    pub async fn handle(
        &self,
        req: &ExtractionRequest,
    ) -> Result<ExtractionResponse, RequestError> {
        let span = info_span!("extract", request_id = %uuid::Uuid::new_v4(), url = %req.url);
        self.handle_inner(req).instrument(span).await
    }

    async fn handle_inner(
        &self,
        req: &ExtractionRequest,
    ) -> Result<ExtractionResponse, RequestError> {
        req.validate()?;
        info!(selectors = ?req.selectors, "request received");
        let url = req.url.as_str();

        if let Some(outcome) = shortcut::try_shortcut(&self.registry, &self.http, url).await {
            let ShortcutPayload { sentinel, body } = outcome?;
            info!(sentinel = %sentinel, "shortcut path: selectors ignored");
            return Ok(ExtractionResponse::from_shortcut(&sentinel, body));
        }

        if req.selectors.is_empty() {
            return Err(RequestError::InvalidInput(
                "at least one selector is required".to_string(),
            ));
        }

        let markup = match self.registry.classify(url) {
            FetchStrategy::Rendered => {
                let wait_selector = self.registry.wait_selector_for(url);
                self.rendered.fetch(url, wait_selector).await?
            }
            FetchStrategy::Static => self.http.fetch_static(url).await?,
        };

        let results = if self.strict_selectors {
            extraction::extract_strict(&markup, &req.selectors)?
        } else {
            extraction::extract(&markup, &req.selectors)
        };

        info!(
            markup_bytes = markup.len(),
            matched = results.iter().filter(|r| !r.matches.is_empty()).count(),
            "extraction complete"
        );
        Ok(ExtractionResponse { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NoopRenderer;

    fn pipeline() -> Pipeline {
        Pipeline::new(&Config::default(), Arc::new(NoopRenderer)).unwrap()
    }

    #[test]
    fn test_plan_per_site() {
        let p = pipeline();
        assert_eq!(p.plan("https://example.com/"), FetchPlan::Static);
        assert_eq!(
            p.plan("https://www.wildberries.ru/catalog/1"),
            FetchPlan::Rendered {
                wait_selector: ".sm-product-card__info".into()
            }
        );
        match p.plan("https://www.sportmaster.ru/catalog/") {
            FetchPlan::Shortcut { sentinel, .. } => assert_eq!(sentinel, "sportmaster_raw_json"),
            other => panic!("expected shortcut, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_serializes_with_path_tag() {
        let v = serde_json::to_value(FetchPlan::Static).unwrap();
        assert_eq!(v, serde_json::json!({"path": "static"}));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_fetch() {
        let err = pipeline()
            .handle(&ExtractionRequest::new("example.com", vec!["p".into()]))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_empty_selectors_rejected_off_the_shortcut_path() {
        let err = pipeline()
            .handle(&ExtractionRequest::new("https://example.com/", vec![]))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_rendered_site_without_browser_fails_with_render_error() {
        let err = pipeline()
            .handle(&ExtractionRequest::new(
                "https://www.ozon.ru/product/1",
                vec![".title".into()],
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E_FETCH_RENDER");
    }
}
