//! Issuer news research pipeline.
//!
//! Four stages, loosely coupled through queues and stores so each can run in
//! its own worker:
//!
//! 1. **discovery** - fan issuer names out onto the issuer queue
//! 2. **fetcher** - per issuer: search news, normalize relative dates, write
//!    each item with a duplicate-suppressing conditional put, forward only
//!    fresh items
//! 3. **consumer** - per item: fetch the article, run each requested metric
//!    (summary, reliability, sentiment, relevance, controversy, tags) through
//!    a chat model, persist the analysis
//! 4. **evaluation** - re-score consumer summaries against rubric judges
//!    (relevance, coherence, consistency, fluency), persist a second record
//!
//! Delivery, retry and dead-lettering semantics belong to the queue
//! infrastructure, not this crate; [`queue::MemoryQueue`] is a plain FIFO
//! stand-in.

pub mod article;
pub mod consumer;
pub mod dates;
pub mod discovery;
pub mod error;
pub mod evaluation;
pub mod fetcher;
pub mod prompts;
pub mod queue;
pub mod searcher;
pub mod store;
pub mod types;

pub use article::{ArticleFetcher, HttpArticleFetcher, MockArticleFetcher};
pub use consumer::NewsConsumer;
pub use discovery::enqueue_issuers;
pub use error::{NewsError, Result};
pub use evaluation::{build_eval_prompt, EvalMetric, EvalScore, NewsEvaluator};
pub use fetcher::{FetchStats, NewsFetcher};
pub use prompts::{Metric, PromptLibrary};
pub use queue::{MemoryQueue, Queue};
pub use searcher::{MockNewsSearcher, NewsSearcher, RawNewsResult, SerpApiSearcher};
pub use store::{MemoryStore, NewsStore, RecordSink};
pub use types::{EvaluationRecord, FetchedNews, IssuerRequest, NewsAnalysis, NewsItem};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
