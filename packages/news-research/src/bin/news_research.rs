// Research recent news for one or more issuers.
//
// Usage: news_research <issuer-name> [<issuer-name> ...]
//
// Runs the whole pipeline in-process (discovery, fetch, consume, evaluate)
// and writes the JSON records under NEWS_OUTPUT_DIR (default "news-output").
// Requires SERPAPI_API_KEY and OPENAI_API_KEY.

use anyhow::{bail, Context, Result};
use llm_client::OpenAiClient;
use news_research::{
    enqueue_issuers, HttpArticleFetcher, MemoryQueue, MemoryStore, NewsConsumer, NewsEvaluator,
    NewsFetcher, SerpApiSearcher,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,news_research=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let issuers: Vec<String> = std::env::args().skip(1).collect();
    if issuers.is_empty() {
        bail!("usage: news_research <issuer-name> [<issuer-name> ...]");
    }
    let output_dir =
        std::env::var("NEWS_OUTPUT_DIR").unwrap_or_else(|_| "news-output".to_string());

    let searcher = SerpApiSearcher::from_env().context("SERPAPI_API_KEY not configured")?;
    let model = OpenAiClient::from_env().context("OPENAI_API_KEY not configured")?;
    let articles = HttpArticleFetcher::new();
    let store = MemoryStore::new();
    let issuer_queue = MemoryQueue::new();
    let consumer_queue = MemoryQueue::new();

    let enqueued = enqueue_issuers(&issuers, &issuer_queue).await?;

    let fetcher = NewsFetcher::new(&searcher, &store, &consumer_queue);
    let stats = fetcher.process_batch(&issuer_queue, enqueued).await?;
    tracing::info!(
        fetched = stats.fetched,
        stored = stats.stored,
        duplicates = stats.duplicates,
        "fetch stage complete"
    );

    let consumer = NewsConsumer::new(&model, &articles, &store);
    let analyzed = consumer.process_batch(&consumer_queue, stats.stored).await?;
    tracing::info!(analyzed = analyzed.len(), "consumer stage complete");

    let evaluator = NewsEvaluator::new(&model, &store);
    for (_, analysis) in &analyzed {
        evaluator.evaluate(analysis).await?;
    }

    let mut written = 0;
    for prefix in ["news-articles/", "news-evaluation/"] {
        for key in store.keys_with_prefix(prefix) {
            let body = store.record(&key).context("record vanished")?;
            let path = Path::new(&output_dir).join(&key);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
            written += 1;
        }
    }
    tracing::info!(written, output_dir, "records written");

    Ok(())
}
