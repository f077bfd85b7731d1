// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Direct data-endpoint shortcut for sites whose markup is unusable.
//!
//! When a site policy carries a [`ShortcutEndpoint`], the page itself is never
//! fetched. The fixed endpoint is called with an XHR-like header set and its
//! raw body is handed back untouched. No fallback is attempted on failure.

use crate::acquisition::http_client::HttpClient;
use crate::error::FetchError;
use crate::policy::{ShortcutEndpoint, SiteRegistry};
use tracing::info;

/// Raw payload returned by a shortcut endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutPayload {
    /// Selector name reported for the synthetic result.
    pub sentinel: String,
    /// Unparsed response body.
    pub body: String,
}

/// Resolve and call the shortcut endpoint for `url`, if its site has one.
///
/// Returns `None` when no shortcut applies; the caller then proceeds with the
/// normal fetch paths.
pub async fn try_shortcut(
    registry: &SiteRegistry,
    client: &HttpClient,
    url: &str,
) -> Option<Result<ShortcutPayload, FetchError>> {
    let endpoint = registry.shortcut_for(url)?;
    Some(call_endpoint(client, endpoint).await)
}

/// Call a shortcut endpoint and return its body.
pub async fn call_endpoint(
    client: &HttpClient,
    endpoint: &ShortcutEndpoint,
) -> Result<ShortcutPayload, FetchError> {
    info!(endpoint = %endpoint.url, "shortcut: GET");
    let headers = [
        ("Referer", endpoint.referer.as_str()),
        ("Accept", endpoint.accept.as_str()),
        ("X-Requested-With", "XMLHttpRequest"),
    ];
    let body = client.get_text(&endpoint.url, &headers).await?;
    info!(bytes = body.len(), "shortcut: payload received");

    Ok(ShortcutPayload {
        sentinel: endpoint.sentinel.clone(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchStage;
    use crate::policy::{SitePolicy, DEFAULT_USER_AGENT, DEFAULT_WAIT_SELECTOR};
    use std::time::Duration;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry_for(api_url: String) -> SiteRegistry {
        SiteRegistry::new(
            vec![SitePolicy::rendered("shop.test").with_shortcut(ShortcutEndpoint {
                url: api_url,
                referer: "https://shop.test/".into(),
                accept: "application/json".into(),
                sentinel: "shop_raw_json".into(),
            })],
            DEFAULT_WAIT_SELECTOR,
        )
    }

    fn client() -> HttpClient {
        HttpClient::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_no_shortcut_for_unlisted_site() {
        let reg = SiteRegistry::default();
        assert!(try_shortcut(&reg, &client(), "https://example.com/").await.is_none());
    }

    #[tokio::test]
    async fn test_shortcut_calls_fixed_endpoint_with_xhr_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/catalog"))
            .and(header("x-requested-with", "XMLHttpRequest"))
            .and(header("referer", "https://shop.test/"))
            .and(header("accept", "application/json"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"products":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let reg = registry_for(format!("{}/api/catalog", server.uri()));
        // The request URL's own path and query play no part in the endpoint.
        let payload = try_shortcut(&reg, &client(), "https://shop.test/catalog?page=7")
            .await
            .expect("shortcut applies")
            .unwrap();
        assert_eq!(payload.sentinel, "shop_raw_json");
        assert_eq!(payload.body, r#"{"products":[]}"#);
    }

    #[tokio::test]
    async fn test_shortcut_sends_no_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("cookie"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let reg = registry_for(server.uri());
        let payload = try_shortcut(&reg, &client(), "https://shop.test/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload.body, "ok");
    }

    #[tokio::test]
    async fn test_shortcut_failure_surfaces_fetch_error() {
        let reg = registry_for("http://127.0.0.1:9/api".into());
        let err = try_shortcut(&reg, &client(), "https://shop.test/")
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err.stage(), FetchStage::Network);
    }
}
