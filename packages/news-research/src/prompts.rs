//! Per-metric prompt templates for the consumer.
//!
//! Templates carry `{content}` and `{source}` slots. The built-in set is the
//! current production version; `with_template` swaps individual metrics for
//! experiments without touching the rest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One enrichment metric run against an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Summary,
    Reliability,
    Sentiment,
    Relevance,
    Controversy,
    Tags,
}

impl Metric {
    /// Metrics that answer with an integer score on a 1-5 scale.
    pub const SCORED: [Metric; 4] = [
        Metric::Reliability,
        Metric::Sentiment,
        Metric::Relevance,
        Metric::Controversy,
    ];

    /// Snake-case label used in keys and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Summary => "summary",
            Metric::Reliability => "reliability",
            Metric::Sentiment => "sentiment",
            Metric::Relevance => "relevance",
            Metric::Controversy => "controversy",
            Metric::Tags => "tags",
        }
    }
}

/// Prompt template set, one per metric.
pub struct PromptLibrary {
    templates: IndexMap<Metric, String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptLibrary {
    /// The built-in production templates.
    pub fn builtin() -> Self {
        let mut templates = IndexMap::new();
        templates.insert(
            Metric::Summary,
            "Summarize the following news article in 3-4 sentences. Focus on \
             facts about the company: funding, products, leadership, financial \
             performance. Do not editorialize.\n\nArticle:\n{content}"
                .to_string(),
        );
        templates.insert(
            Metric::Reliability,
            "Rate the reliability of the news source \"{source}\" on a scale \
             from 1 to 5, where 1 is an unreliable or promotional outlet and 5 \
             is a major outlet with strong editorial standards. Answer with a \
             single integer.\n\nArticle:\n{content}"
                .to_string(),
        );
        templates.insert(
            Metric::Sentiment,
            "Rate the sentiment of this article toward the company it covers \
             on a scale from 1 to 5, where 1 is strongly negative and 5 is \
             strongly positive. Answer with a single integer.\n\nArticle:\n{content}"
                .to_string(),
        );
        templates.insert(
            Metric::Relevance,
            "Rate how relevant this article is to assessing the company as an \
             investment on a scale from 1 to 5, where 1 is irrelevant (passing \
             mention, unrelated topic) and 5 is directly material (funding, \
             revenue, leadership, legal). Answer with a single integer.\n\n\
             Article:\n{content}"
                .to_string(),
        );
        templates.insert(
            Metric::Controversy,
            "Rate how controversial the events described in this article are \
             for the company on a scale from 1 to 5, where 1 is routine news \
             and 5 is a major scandal, lawsuit or regulatory action. Answer \
             with a single integer.\n\nArticle:\n{content}"
                .to_string(),
        );
        templates.insert(
            Metric::Tags,
            "List 3-6 short topic tags for this article, comma separated, \
             lowercase (e.g. funding, product launch, lawsuit). Answer with \
             the tags only.\n\nArticle:\n{content}"
                .to_string(),
        );
        Self { templates }
    }

    /// Replace the template for one metric.
    pub fn with_template(mut self, metric: Metric, template: impl Into<String>) -> Self {
        self.templates.insert(metric, template.into());
        self
    }

    /// Render the prompt for a metric.
    pub fn render(&self, metric: Metric, content: &str, source: &str) -> String {
        self.templates
            .get(&metric)
            .map(|t| t.replace("{content}", content).replace("{source}", source))
            .unwrap_or_default()
    }
}
