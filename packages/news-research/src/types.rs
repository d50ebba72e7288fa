//! Pipeline message and record types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::evaluation::{EvalMetric, EvalScore};

/// Request to research one issuer, enqueued by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerRequest {
    pub issuer_name: String,
    pub number_of_articles: usize,
    pub want_summary: bool,
}

impl IssuerRequest {
    /// Request with the usual defaults (10 articles, summary on).
    pub fn new(issuer_name: impl Into<String>) -> Self {
        Self {
            issuer_name: issuer_name.into(),
            number_of_articles: 10,
            want_summary: true,
        }
    }
}

/// A news item after fetch-side normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub issuer_name: String,
    pub title: String,
    pub link: String,
    pub source: Option<String>,
    /// Publication date after relative-date normalization; `None` when the
    /// provider's date string was unparseable.
    pub date: Option<NaiveDate>,
    pub snippet: Option<String>,
}

impl NewsItem {
    /// Deduplication key: same issuer, link and date means same item.
    pub fn dedupe_key(&self) -> String {
        let date = self
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("{}-{}-{}", self.issuer_name, self.link, date)
    }
}

/// A fresh item forwarded from the fetcher to the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedNews {
    pub item: NewsItem,
    pub want_summary: bool,
}

/// Consumer output: one analyzed news item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsAnalysis {
    pub item: NewsItem,
    /// Model identifier recorded with the results (e.g. "gpt-4o").
    pub model_handle: String,
    /// Raw article text, `None` when the fetch failed.
    pub raw_text: Option<String>,
    pub summary: Option<String>,
    pub reliability: Option<i64>,
    pub sentiment: Option<i64>,
    pub relevance: Option<i64>,
    pub controversy: Option<i64>,
    pub tags: Vec<String>,
}

impl NewsAnalysis {
    /// Empty analysis shell for an item.
    pub fn new(item: NewsItem, model_handle: impl Into<String>) -> Self {
        Self {
            item,
            model_handle: model_handle.into(),
            raw_text: None,
            summary: None,
            reliability: None,
            sentiment: None,
            relevance: None,
            controversy: None,
            tags: Vec::new(),
        }
    }
}

/// Evaluation output: rubric scores for one analyzed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub issuer_name: String,
    pub dedupe_key: String,
    /// Judge model identifier.
    pub model_handle: String,
    pub scores: Vec<(EvalMetric, EvalScore)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_key_shape() {
        let item = NewsItem {
            issuer_name: "Acme".into(),
            title: "Acme raises".into(),
            link: "https://news.example.com/acme".into(),
            source: None,
            date: NaiveDate::from_ymd_opt(2026, 8, 20),
            snippet: None,
        };
        assert_eq!(
            item.dedupe_key(),
            "Acme-https://news.example.com/acme-2026-08-20"
        );
    }

    #[test]
    fn test_dedupe_key_without_date() {
        let item = NewsItem {
            issuer_name: "Acme".into(),
            title: "t".into(),
            link: "l".into(),
            source: None,
            date: None,
            snippet: None,
        };
        assert!(item.dedupe_key().ends_with("-unknown"));
    }
}
