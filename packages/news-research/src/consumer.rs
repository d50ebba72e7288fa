//! Consumer stage: per-item LLM enrichment.
//!
//! For each fresh item: fetch the article body (falling back to the search
//! snippet when the site blocks us), run one chat completion per metric, and
//! persist the assembled analysis. A metric that fails is logged and left
//! unset rather than failing the item.

use llm_client::{extract_score, strip_assistant_preamble, ChatModel};
use tracing::{info, warn};

use crate::article::ArticleFetcher;
use crate::error::Result;
use crate::prompts::{Metric, PromptLibrary};
use crate::queue::Queue;
use crate::store::RecordSink;
use crate::types::{FetchedNews, NewsAnalysis};

const SCORE_MIN: i64 = 1;
const SCORE_MAX: i64 = 5;

/// The consumer stage worker.
pub struct NewsConsumer<'a> {
    model: &'a dyn ChatModel,
    articles: &'a dyn ArticleFetcher,
    sink: &'a dyn RecordSink,
    prompts: PromptLibrary,
}

impl<'a> NewsConsumer<'a> {
    pub fn new(
        model: &'a dyn ChatModel,
        articles: &'a dyn ArticleFetcher,
        sink: &'a dyn RecordSink,
    ) -> Self {
        Self {
            model,
            articles,
            sink,
            prompts: PromptLibrary::builtin(),
        }
    }

    /// Swap the prompt library.
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    /// Analyze one item and persist the record, returning it with its key.
    pub async fn process(&self, fetched: &FetchedNews) -> Result<(String, NewsAnalysis)> {
        let item = &fetched.item;
        let mut analysis = NewsAnalysis::new(item.clone(), self.model.model_handle());

        analysis.raw_text = self.articles.fetch_text(&item.link).await?;

        // Snippet stands in when the article body is unavailable.
        let content = analysis
            .raw_text
            .clone()
            .or_else(|| item.snippet.clone())
            .unwrap_or_else(|| item.title.clone());
        let source = item.source.as_deref().unwrap_or("unknown");

        if fetched.want_summary {
            analysis.summary = self.run_text_metric(Metric::Summary, &content, source).await;
        }

        for metric in Metric::SCORED {
            let score = self.run_scored_metric(metric, &content, source).await;
            match metric {
                Metric::Reliability => analysis.reliability = score,
                Metric::Sentiment => analysis.sentiment = score,
                Metric::Relevance => analysis.relevance = score,
                Metric::Controversy => analysis.controversy = score,
                _ => {}
            }
        }

        if let Some(tags) = self.run_text_metric(Metric::Tags, &content, source).await {
            analysis.tags = tags
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }

        let key = self.sink.put_analysis(&analysis).await?;
        info!(
            issuer = item.issuer_name,
            link = item.link,
            key,
            "news item analyzed"
        );
        Ok((key, analysis))
    }

    /// Drain up to `max` items from the queue and process each.
    pub async fn process_batch(
        &self,
        queue: &dyn Queue<FetchedNews>,
        max: usize,
    ) -> Result<Vec<(String, NewsAnalysis)>> {
        let items = queue.recv_batch(max).await?;
        let mut out = Vec::with_capacity(items.len());
        for fetched in &items {
            match self.process(fetched).await {
                Ok(result) => out.push(result),
                Err(e) => {
                    warn!(link = fetched.item.link, error = %e, "item analysis failed");
                }
            }
        }
        Ok(out)
    }

    async fn run_text_metric(
        &self,
        metric: Metric,
        content: &str,
        source: &str,
    ) -> Option<String> {
        let prompt = self.prompts.render(metric, content, source);
        match self.model.complete(&prompt).await {
            Ok(completion) => Some(strip_assistant_preamble(&completion).trim().to_string()),
            Err(e) => {
                warn!(metric = metric.label(), error = %e, "metric completion failed");
                None
            }
        }
    }

    async fn run_scored_metric(&self, metric: Metric, content: &str, source: &str) -> Option<i64> {
        let prompt = self.prompts.render(metric, content, source);
        match self.model.complete(&prompt).await {
            Ok(completion) => {
                let score = extract_score(&completion, SCORE_MIN, SCORE_MAX);
                if score.is_none() {
                    warn!(
                        metric = metric.label(),
                        completion, "no score in metric completion"
                    );
                }
                score
            }
            Err(e) => {
                warn!(metric = metric.label(), error = %e, "metric completion failed");
                None
            }
        }
    }
}
