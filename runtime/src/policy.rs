// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-site fetch policy table and the URL classifier built on it.
//!
//! A [`SiteRegistry`] is built once from configuration and shared
//! read-only. Lookups are case-sensitive substring matches against the raw
//! URL string, first match wins.

use serde::{Deserialize, Serialize};

/// Content marker the rendered path waits for when a site does not name its own.
pub const DEFAULT_WAIT_SELECTOR: &str = ".sm-product-card__info";

/// Desktop Chrome identity sent on every outbound request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";

/// How markup for a URL is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Plain HTTP GET; the server-rendered document is used as-is.
    Static,
    /// Headless browser navigation, waiting for client-side rendering.
    Rendered,
}

/// A backing data endpoint called instead of fetching the page itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutEndpoint {
    /// Fixed API URL. Not derived from the request URL.
    pub url: String,
    /// Referer header value.
    pub referer: String,
    /// Accept header value.
    #[serde(default = "default_shortcut_accept")]
    pub accept: String,
    /// Selector name reported for the single synthetic result entry.
    pub sentinel: String,
}

fn default_shortcut_accept() -> String {
    "application/json, text/javascript, */*; q=0.01".to_string()
}

/// Fetch policy for one site pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePolicy {
    /// Substring matched against the request URL.
    pub pattern: String,
    #[serde(default = "default_policy_strategy")]
    pub strategy: FetchStrategy,
    /// Overrides the registry-wide wait selector for this site.
    #[serde(default)]
    pub wait_selector: Option<String>,
    #[serde(default)]
    pub shortcut: Option<ShortcutEndpoint>,
}

fn default_policy_strategy() -> FetchStrategy {
    FetchStrategy::Rendered
}

impl SitePolicy {
    /// A policy that routes the pattern through the browser with the default marker.
    pub fn rendered(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            strategy: FetchStrategy::Rendered,
            wait_selector: None,
            shortcut: None,
        }
    }

    /// Attach a direct data endpoint to this policy.
    pub fn with_shortcut(mut self, shortcut: ShortcutEndpoint) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Override the wait selector for this policy.
    pub fn with_wait_selector(mut self, selector: &str) -> Self {
        self.wait_selector = Some(selector.to_string());
        self
    }
}

/// Built-in policy table: the known client-rendered retailers.
pub fn default_policies() -> Vec<SitePolicy> {
    vec![
        SitePolicy::rendered("sportmaster.ru").with_shortcut(ShortcutEndpoint {
            url: "https://www.sportmaster.ru/api/catalog/product/?slug=futbolki&categoryId=1000000000001973639"
                .to_string(),
            referer: "https://www.sportmaster.ru/".to_string(),
            accept: default_shortcut_accept(),
            sentinel: "sportmaster_raw_json".to_string(),
        }),
        SitePolicy::rendered("wildberries.ru"),
        SitePolicy::rendered("ozon.ru"),
        SitePolicy::rendered("aliexpress.com"),
        SitePolicy::rendered("lamoda.ru"),
    ]
}

/// Immutable lookup table from URL substring to fetch policy.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    policies: Vec<SitePolicy>,
    default_wait_selector: String,
}

impl SiteRegistry {
    /// Build a registry from policies, checked in order.
    pub fn new(policies: Vec<SitePolicy>, default_wait_selector: impl Into<String>) -> Self {
        Self {
            policies,
            default_wait_selector: default_wait_selector.into(),
        }
    }

    /// First policy whose pattern occurs in `url`.
    pub fn lookup(&self, url: &str) -> Option<&SitePolicy> {
        self.policies.iter().find(|p| url.contains(p.pattern.as_str()))
    }

    /// Decide how to fetch `url`. Total over all strings; unknown sites are static.
    pub fn classify(&self, url: &str) -> FetchStrategy {
        self.lookup(url)
            .map(|p| p.strategy)
            .unwrap_or(FetchStrategy::Static)
    }

    /// Content marker to wait for when rendering `url`.
    pub fn wait_selector_for(&self, url: &str) -> &str {
        self.lookup(url)
            .and_then(|p| p.wait_selector.as_deref())
            .unwrap_or(&self.default_wait_selector)
    }

    /// Direct data endpoint for `url`, if its site has one.
    pub fn shortcut_for(&self, url: &str) -> Option<&ShortcutEndpoint> {
        self.lookup(url).and_then(|p| p.shortcut.as_ref())
    }

    pub fn policies(&self) -> &[SitePolicy] {
        &self.policies
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new(default_policies(), DEFAULT_WAIT_SELECTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_rendered_sites() {
        let reg = SiteRegistry::default();
        assert_eq!(
            reg.classify("https://www.wildberries.ru/catalog/1"),
            FetchStrategy::Rendered
        );
        assert_eq!(reg.classify("https://www.ozon.ru/product/2"), FetchStrategy::Rendered);
        assert_eq!(reg.classify("https://aliexpress.com/item/3"), FetchStrategy::Rendered);
        assert_eq!(reg.classify("https://www.lamoda.ru/p/4"), FetchStrategy::Rendered);
    }

    #[test]
    fn test_classify_everything_else_static() {
        let reg = SiteRegistry::default();
        assert_eq!(reg.classify("https://example.com"), FetchStrategy::Static);
        assert_eq!(reg.classify(""), FetchStrategy::Static);
        assert_eq!(reg.classify("not a url at all"), FetchStrategy::Static);
    }

    #[test]
    fn test_classify_is_case_sensitive_substring() {
        let reg = SiteRegistry::default();
        assert_eq!(reg.classify("https://WILDBERRIES.RU/"), FetchStrategy::Static);
        // Substring anywhere counts, including the query string.
        assert_eq!(
            reg.classify("https://example.com/?ref=ozon.ru"),
            FetchStrategy::Rendered
        );
    }

    #[test]
    fn test_shortcut_only_for_sportmaster() {
        let reg = SiteRegistry::default();
        let sc = reg
            .shortcut_for("https://www.sportmaster.ru/catalog/muzhskaya_odezhda/")
            .expect("sportmaster has a shortcut");
        assert_eq!(sc.sentinel, "sportmaster_raw_json");
        assert_eq!(sc.referer, "https://www.sportmaster.ru/");
        assert!(sc.url.starts_with("https://www.sportmaster.ru/api/catalog/product/"));
        assert!(reg.shortcut_for("https://www.ozon.ru/").is_none());
        assert!(reg.shortcut_for("https://example.com/").is_none());
    }

    #[test]
    fn test_wait_selector_default_and_override() {
        let reg = SiteRegistry::new(
            vec![
                SitePolicy::rendered("shop.test").with_wait_selector("#grid .card"),
                SitePolicy::rendered("other.test"),
            ],
            DEFAULT_WAIT_SELECTOR,
        );
        assert_eq!(reg.wait_selector_for("https://shop.test/a"), "#grid .card");
        assert_eq!(reg.wait_selector_for("https://other.test/a"), DEFAULT_WAIT_SELECTOR);
        assert_eq!(reg.wait_selector_for("https://static.test/a"), DEFAULT_WAIT_SELECTOR);
    }

    #[test]
    fn test_first_matching_policy_wins() {
        let reg = SiteRegistry::new(
            vec![
                SitePolicy {
                    pattern: "news.example".into(),
                    strategy: FetchStrategy::Static,
                    wait_selector: None,
                    shortcut: None,
                },
                SitePolicy::rendered("example"),
            ],
            DEFAULT_WAIT_SELECTOR,
        );
        assert_eq!(reg.classify("https://news.example/a"), FetchStrategy::Static);
        assert_eq!(reg.classify("https://shop.example/a"), FetchStrategy::Rendered);
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let p: SitePolicy = serde_json::from_str(r#"{"pattern": "shop.test"}"#).unwrap();
        assert_eq!(p.strategy, FetchStrategy::Rendered);
        assert!(p.wait_selector.is_none());
        assert!(p.shortcut.is_none());

        let p: SitePolicy = serde_json::from_str(
            r#"{"pattern": "api.test", "shortcut": {"url": "https://api.test/x", "referer": "https://api.test/", "sentinel": "raw"}}"#,
        )
        .unwrap();
        let sc = p.shortcut.unwrap();
        assert_eq!(sc.accept, "application/json, text/javascript, */*; q=0.01");
    }
}
