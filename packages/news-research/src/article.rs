//! Article body retrieval.
//!
//! Fetches the linked page and strips it down to readable text. Sites that
//! block scrapers or time out yield `None`; the consumer falls back to the
//! search snippet in that case.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Fetches readable article text for a link.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetch and clean the article at `url`; `None` when unavailable.
    async fn fetch_text(&self, url: &str) -> Result<Option<String>>;
}

/// HTTP fetcher with a browser user agent and plain-regex HTML stripping.
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl Default for HttpArticleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpArticleFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
        }
    }
}

/// Strip an HTML page down to whitespace-collapsed text.
pub fn html_to_text(html: &str) -> String {
    // Script and style bodies first, then every remaining tag.
    let scripts = Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>").unwrap();
    let tags = Regex::new(r"(?s)<[^>]+>").unwrap();
    let whitespace = Regex::new(r"\s+").unwrap();

    let text = scripts.replace_all(html, " ");
    let text = tags.replace_all(&text, " ");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    whitespace.replace_all(&text, " ").trim().to_string()
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "article fetch failed");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "article fetch rejected");
            return Ok(None);
        }

        let html = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(url, error = %e, "article body read failed");
                return Ok(None);
            }
        };

        let text = html_to_text(&html);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text))
    }
}

/// Mock fetcher for tests: canned text per URL.
#[derive(Default)]
pub struct MockArticleFetcher {
    pages: RwLock<HashMap<String, String>>,
}

impl MockArticleFetcher {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register article text for a URL.
    pub fn with_page(self, url: &str, text: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl ArticleFetcher for MockArticleFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        Ok(self.pages.read().unwrap().get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup() {
        let html = r#"<html><head><style>body { color: red; }</style>
            <script type="text/javascript">var x = "<div>";</script></head>
            <body><h1>Acme raises &amp; grows</h1>
            <p>The   round closed
            on Tuesday.</p></body></html>"#;
        assert_eq!(
            html_to_text(html),
            "Acme raises & grows The round closed on Tuesday."
        );
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(html_to_text("a &lt;b&gt; &quot;c&quot;&nbsp;d"), "a <b> \"c\" d");
    }

    #[tokio::test]
    async fn test_mock_fetcher_misses_return_none() {
        let fetcher = MockArticleFetcher::new().with_page("https://a", "body");
        assert_eq!(
            fetcher.fetch_text("https://a").await.unwrap().as_deref(),
            Some("body")
        );
        assert!(fetcher.fetch_text("https://b").await.unwrap().is_none());
    }
}
