//! Duplicate-suppressing item store and analysis record sink.
//!
//! `NewsStore` is the fetcher's dedup ledger: one conditional write per item,
//! keyed by [`NewsItem::dedupe_key`]. `RecordSink` persists consumer and
//! evaluation output as JSON documents under date- and issuer-partitioned
//! keys. [`MemoryStore`] implements both for tests; the `sqlite` feature adds
//! a persistent [`SqliteStore`] backend for the dedup ledger.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
#[cfg(feature = "sqlite")]
use crate::error::NewsError;
use crate::types::{EvaluationRecord, NewsAnalysis, NewsItem};

/// Dedup ledger for fetched news items.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Write the item only if its dedupe key has not been seen.
    ///
    /// Returns `true` when the item is fresh (written), `false` when an item
    /// with the same key already exists. The check and the write are one
    /// atomic conditional operation.
    async fn put_if_absent(&self, item: &NewsItem) -> Result<bool>;
}

/// Sink for analysis and evaluation records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one analysis record, returning the key it was written under.
    async fn put_analysis(&self, analysis: &NewsAnalysis) -> Result<String>;

    /// Persist one evaluation record, returning the key it was written under.
    async fn put_evaluation(&self, record: &EvaluationRecord) -> Result<String>;
}

fn issuer_slug(issuer_name: &str) -> String {
    issuer_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Key for an analysis record: partitioned by run date and model.
pub fn analysis_key(analysis: &NewsAnalysis) -> String {
    format!(
        "news-articles/{}-{}/{}/news_record_{}.json",
        Utc::now().format("%Y%m%d"),
        analysis.model_handle,
        issuer_slug(&analysis.item.issuer_name),
        Uuid::new_v4()
    )
}

/// Key for an evaluation record: partitioned by issuer.
pub fn evaluation_key(record: &EvaluationRecord) -> String {
    format!(
        "news-evaluation/{}/llm_evaluation_{}_{}.json",
        issuer_slug(&record.issuer_name),
        Utc::now().format("%Y%m%dT%H%M%S"),
        Uuid::new_v4()
    )
}

/// In-memory store for tests and single-node runs.
#[derive(Default)]
pub struct MemoryStore {
    seen: RwLock<HashSet<String>>,
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct items written through `put_if_absent`.
    pub fn item_count(&self) -> usize {
        self.seen.read().unwrap().len()
    }

    /// Persisted record JSON by key, for assertions.
    pub fn record(&self, key: &str) -> Option<String> {
        self.records.read().unwrap().get(key).cloned()
    }

    /// All persisted record keys with the given prefix.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .records
            .read()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn put_if_absent(&self, item: &NewsItem) -> Result<bool> {
        let mut seen = self.seen.write().unwrap();
        Ok(seen.insert(item.dedupe_key()))
    }
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn put_analysis(&self, analysis: &NewsAnalysis) -> Result<String> {
        let key = analysis_key(analysis);
        let body = serde_json::to_string_pretty(analysis)?;
        self.records.write().unwrap().insert(key.clone(), body);
        Ok(key)
    }

    async fn put_evaluation(&self, record: &EvaluationRecord) -> Result<String> {
        let key = evaluation_key(record);
        let body = serde_json::to_string_pretty(record)?;
        self.records.write().unwrap().insert(key.clone(), body);
        Ok(key)
    }
}

/// SQLite-backed dedup ledger.
#[cfg(feature = "sqlite")]
pub struct SqliteStore {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "sqlite")]
impl SqliteStore {
    /// Connect and ensure the ledger table exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::SqlitePool::connect(url)
            .await
            .map_err(|e| NewsError::Storage(Box::new(e)))?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS news_items (
                dedupe_key TEXT PRIMARY KEY,
                issuer_name TEXT NOT NULL,
                title TEXT NOT NULL,
                link TEXT NOT NULL,
                date TEXT
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| NewsError::Storage(Box::new(e)))?;
        Ok(Self { pool })
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl NewsStore for SqliteStore {
    async fn put_if_absent(&self, item: &NewsItem) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO news_items (dedupe_key, issuer_name, title, link, date)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(item.dedupe_key())
        .bind(&item.issuer_name)
        .bind(&item.title)
        .bind(&item.link)
        .bind(item.date.map(|d| d.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|e| NewsError::Storage(Box::new(e)))?;
        Ok(result.rows_affected() > 0)
    }
}
