//! Fetch stage: search, normalize, deduplicate, forward.
//!
//! One issuer request in, at most `number_of_articles` fresh items out. A
//! conditional write against the item store decides freshness, so re-running
//! discovery for the same issuer only forwards items not seen before.

use chrono::Utc;
use tracing::{info, warn};

use crate::dates::normalize_date;
use crate::error::Result;
use crate::queue::Queue;
use crate::searcher::NewsSearcher;
use crate::store::NewsStore;
use crate::types::{FetchedNews, IssuerRequest, NewsItem};

/// Outcome counts for one issuer fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Results the search provider returned.
    pub fetched: usize,
    /// Fresh items written and forwarded.
    pub stored: usize,
    /// Items suppressed by the dedup ledger.
    pub duplicates: usize,
}

/// The fetch stage worker.
pub struct NewsFetcher<'a> {
    searcher: &'a dyn NewsSearcher,
    store: &'a dyn NewsStore,
    consumer_queue: &'a dyn Queue<FetchedNews>,
}

impl<'a> NewsFetcher<'a> {
    pub fn new(
        searcher: &'a dyn NewsSearcher,
        store: &'a dyn NewsStore,
        consumer_queue: &'a dyn Queue<FetchedNews>,
    ) -> Self {
        Self {
            searcher,
            store,
            consumer_queue,
        }
    }

    /// Search news for one issuer, store fresh items and forward them.
    pub async fn fetch_issuer(&self, request: &IssuerRequest) -> Result<FetchStats> {
        let results = self
            .searcher
            .search(&request.issuer_name, request.number_of_articles)
            .await?;

        let now = Utc::now();
        let mut stats = FetchStats {
            fetched: results.len(),
            ..FetchStats::default()
        };

        for raw in results {
            let date = raw.date.as_deref().and_then(|d| normalize_date(d, now));
            let item = NewsItem {
                issuer_name: request.issuer_name.clone(),
                title: raw.title,
                link: raw.link,
                source: raw.source,
                date,
                snippet: raw.snippet,
            };

            // One bad item must not sink the rest of the batch.
            let fresh = match self.store.put_if_absent(&item).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!(link = item.link, error = %e, "item store write failed");
                    continue;
                }
            };
            if !fresh {
                stats.duplicates += 1;
                continue;
            }

            self.consumer_queue
                .send(FetchedNews {
                    item,
                    want_summary: request.want_summary,
                })
                .await?;
            stats.stored += 1;
        }

        info!(
            issuer = request.issuer_name,
            fetched = stats.fetched,
            stored = stats.stored,
            duplicates = stats.duplicates,
            "issuer fetch complete"
        );
        Ok(stats)
    }

    /// Drain up to `max` requests from the issuer queue and fetch each.
    ///
    /// A failed issuer is logged and skipped so the batch always completes.
    pub async fn process_batch(
        &self,
        issuer_queue: &dyn Queue<IssuerRequest>,
        max: usize,
    ) -> Result<FetchStats> {
        let requests = issuer_queue.recv_batch(max).await?;
        let mut total = FetchStats::default();

        for request in &requests {
            match self.fetch_issuer(request).await {
                Ok(stats) => {
                    total.fetched += stats.fetched;
                    total.stored += stats.stored;
                    total.duplicates += stats.duplicates;
                }
                Err(e) => {
                    warn!(issuer = request.issuer_name, error = %e, "issuer fetch failed");
                }
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;
    use crate::searcher::{MockNewsSearcher, RawNewsResult};
    use crate::store::MemoryStore;

    fn raw(title: &str, link: &str, date: Option<&str>) -> RawNewsResult {
        RawNewsResult {
            title: title.into(),
            link: link.into(),
            source: Some("Example Wire".into()),
            date: date.map(|d| d.to_string()),
            snippet: Some("snippet".into()),
        }
    }

    #[tokio::test]
    async fn test_fetch_normalizes_and_forwards() {
        let searcher = MockNewsSearcher::new().with_results(
            "Acme",
            vec![
                raw("funding", "https://a", Some("Jul 29, 2015")),
                raw("launch", "https://b", Some("not a date")),
            ],
        );
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        let fetcher = NewsFetcher::new(&searcher, &store, &queue);

        let stats = fetcher.fetch_issuer(&IssuerRequest::new("Acme")).await.unwrap();
        assert_eq!(
            stats,
            FetchStats {
                fetched: 2,
                stored: 2,
                duplicates: 0
            }
        );

        let forwarded = queue.recv_batch(10).await.unwrap();
        assert_eq!(forwarded.len(), 2);
        assert_eq!(
            forwarded[0].item.date,
            chrono::NaiveDate::from_ymd_opt(2015, 7, 29)
        );
        assert_eq!(forwarded[1].item.date, None);
        assert!(forwarded[0].want_summary);
    }

    #[tokio::test]
    async fn test_second_run_suppresses_duplicates() {
        let searcher = MockNewsSearcher::new()
            .with_results("Acme", vec![raw("funding", "https://a", Some("Jul 29, 2015"))]);
        let store = MemoryStore::new();
        let queue = MemoryQueue::new();
        let fetcher = NewsFetcher::new(&searcher, &store, &queue);
        let request = IssuerRequest::new("Acme");

        fetcher.fetch_issuer(&request).await.unwrap();
        let second = fetcher.fetch_issuer(&request).await.unwrap();
        assert_eq!(
            second,
            FetchStats {
                fetched: 1,
                stored: 0,
                duplicates: 1
            }
        );
        // Only the first run forwarded.
        assert_eq!(queue.len(), 1);
    }
}
