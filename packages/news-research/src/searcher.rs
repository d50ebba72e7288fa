//! News search trait and providers.
//!
//! The fetcher only needs "issuer in, raw results out". `SerpApiSearcher`
//! talks to SerpAPI's Google News engine; `MockNewsSearcher` keeps tests
//! offline.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;

use crate::error::{NewsError, Result};

/// A search hit as the provider reports it: date still a raw string.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNewsResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// News search provider.
#[async_trait]
pub trait NewsSearcher: Send + Sync {
    /// Search recent news for an issuer.
    async fn search(&self, issuer_name: &str, limit: usize) -> Result<Vec<RawNewsResult>>;
}

/// SerpAPI-backed news search (Google News engine, last year).
pub struct SerpApiSearcher {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl SerpApiSearcher {
    /// Create a new searcher with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: "https://serpapi.com".to_string(),
        }
    }

    /// Create from the `SERPAPI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERPAPI_API_KEY")
            .map_err(|_| NewsError::Search("SERPAPI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl NewsSearcher for SerpApiSearcher {
    async fn search(&self, issuer_name: &str, limit: usize) -> Result<Vec<RawNewsResult>> {
        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            news_results: Vec<RawNewsResult>,
        }

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("google_domain", "google.com"),
                ("q", &format!("{} company", issuer_name)),
                ("tbm", "nws"),
                ("num", &limit.to_string()),
                // Restrict to the last year.
                ("as_qdr", "y"),
                ("api_key", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(issuer = issuer_name, error = %e, "news search request failed");
                NewsError::Search(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Search(format!(
                "search API error {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Search(e.to_string()))?;

        Ok(parsed.news_results)
    }
}

/// Mock searcher for tests: canned results per issuer.
#[derive(Default)]
pub struct MockNewsSearcher {
    results: RwLock<HashMap<String, Vec<RawNewsResult>>>,
}

impl MockNewsSearcher {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register results for an issuer.
    pub fn with_results(self, issuer_name: &str, results: Vec<RawNewsResult>) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(issuer_name.to_string(), results);
        self
    }
}

#[async_trait]
impl NewsSearcher for MockNewsSearcher {
    async fn search(&self, issuer_name: &str, limit: usize) -> Result<Vec<RawNewsResult>> {
        let mut results = self
            .results
            .read()
            .unwrap()
            .get(issuer_name)
            .cloned()
            .unwrap_or_default();
        results.truncate(limit);
        Ok(results)
    }
}
