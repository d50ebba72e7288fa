//! Summary evaluation against rubric judges.
//!
//! Each consumer summary is re-scored on four rubric dimensions by a judge
//! model. The judge sees the source document and the summary side by side,
//! with the rubric's criteria and evaluation steps inlined in the prompt.
//! A judge reply with no usable number is kept verbatim rather than dropped,
//! so prompt regressions stay visible in the records.

use llm_client::{extract_score, ChatModel};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::store::RecordSink;
use crate::types::{EvaluationRecord, NewsAnalysis};

const SCORE_MIN: i64 = 1;
const SCORE_MAX: i64 = 5;

/// One rubric dimension a summary is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalMetric {
    Relevance,
    Coherence,
    Consistency,
    Fluency,
}

impl EvalMetric {
    /// All rubric dimensions, in report order.
    pub const ALL: [EvalMetric; 4] = [
        EvalMetric::Relevance,
        EvalMetric::Coherence,
        EvalMetric::Consistency,
        EvalMetric::Fluency,
    ];

    /// Label used in prompts and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EvalMetric::Relevance => "relevance",
            EvalMetric::Coherence => "coherence",
            EvalMetric::Consistency => "consistency",
            EvalMetric::Fluency => "fluency",
        }
    }

    /// What the dimension measures, as shown to the judge.
    pub fn criteria(&self) -> &'static str {
        match self {
            EvalMetric::Relevance => {
                "Relevance (1-5) - selection of important content from the source. \
                 The summary should include only important information from the \
                 source document. Penalize summaries which contain redundancies \
                 and excess information."
            }
            EvalMetric::Coherence => {
                "Coherence (1-5) - the collective quality of all sentences. The \
                 summary should be well-structured and well-organized, building \
                 from sentence to sentence into a coherent body of information \
                 about the topic, not just a heap of related facts."
            }
            EvalMetric::Consistency => {
                "Consistency (1-5) - factual alignment between the summary and \
                 the source document. A factually consistent summary contains \
                 only statements entailed by the source. Penalize summaries that \
                 contain hallucinated facts."
            }
            EvalMetric::Fluency => {
                "Fluency (1-5) - the quality of individual sentences: grammar, \
                 spelling, punctuation, word choice and sentence structure."
            }
        }
    }

    /// Evaluation steps the judge is told to follow.
    pub fn steps(&self) -> &'static str {
        match self {
            EvalMetric::Relevance => {
                "1. Read the summary and the source document carefully.\n\
                 2. Compare the summary to the source and identify its main points.\n\
                 3. Assess how well the summary covers the main points and how much \
                 irrelevant or redundant information it contains.\n\
                 4. Assign a relevance score from 1 to 5."
            }
            EvalMetric::Coherence => {
                "1. Read the source document carefully and identify the main topic \
                 and key points.\n\
                 2. Read the summary and check whether it presents them in a clear \
                 and logical order.\n\
                 3. Assign a coherence score from 1 to 5."
            }
            EvalMetric::Consistency => {
                "1. Read the source document carefully and identify the main facts \
                 and details it presents.\n\
                 2. Read the summary and compare it to the source; check for factual \
                 errors or statements not supported by the source.\n\
                 3. Assign a consistency score from 1 to 5."
            }
            EvalMetric::Fluency => {
                "1. Read the summary and evaluate its grammar, spelling, \
                 punctuation, word choice and sentence structure.\n\
                 2. Assign a fluency score from 1 to 5."
            }
        }
    }
}

/// One judged score: a number when the judge answered with one, otherwise the
/// raw completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvalScore {
    Score(i64),
    Raw(String),
}

/// Build the judge prompt for one rubric dimension.
pub fn build_eval_prompt(metric: EvalMetric, document: &str, summary: &str) -> String {
    format!(
        "You will be given one summary written for a news article. Your task is \
         to rate the summary on one metric. Please make sure you read and \
         understand these instructions carefully.\n\n\
         Evaluation Criteria:\n\n{}\n\n\
         Evaluation Steps:\n\n{}\n\n\
         Source Document:\n\n{}\n\n\
         Summary:\n\n{}\n\n\
         Evaluation Form (scores ONLY - answer with a single integer):\n\n\
         - {}:",
        metric.criteria(),
        metric.steps(),
        document,
        summary,
        metric.label()
    )
}

/// The evaluation stage worker.
pub struct NewsEvaluator<'a> {
    judge: &'a dyn ChatModel,
    sink: &'a dyn RecordSink,
}

impl<'a> NewsEvaluator<'a> {
    pub fn new(judge: &'a dyn ChatModel, sink: &'a dyn RecordSink) -> Self {
        Self { judge, sink }
    }

    /// Judge one analysis and persist the record.
    ///
    /// Returns `None` when the analysis has no article text or no summary to
    /// judge against (nothing to evaluate is not an error).
    pub async fn evaluate(
        &self,
        analysis: &NewsAnalysis,
    ) -> Result<Option<(String, EvaluationRecord)>> {
        let (document, summary) = match (&analysis.raw_text, &analysis.summary) {
            (Some(document), Some(summary)) => (document, summary),
            _ => {
                info!(
                    link = analysis.item.link,
                    "skipping evaluation: no article text or no summary"
                );
                return Ok(None);
            }
        };

        let mut scores = Vec::with_capacity(EvalMetric::ALL.len());
        for metric in EvalMetric::ALL {
            let prompt = build_eval_prompt(metric, document, summary);
            let completion = self.judge.complete(&prompt).await?;
            let score = match extract_score(&completion, SCORE_MIN, SCORE_MAX) {
                Some(value) => EvalScore::Score(value),
                None => {
                    warn!(
                        metric = metric.label(),
                        completion, "judge gave no numeric score"
                    );
                    EvalScore::Raw(completion)
                }
            };
            scores.push((metric, score));
        }

        let record = EvaluationRecord {
            issuer_name: analysis.item.issuer_name.clone(),
            dedupe_key: analysis.item.dedupe_key(),
            model_handle: self.judge.model_handle().to_string(),
            scores,
        };
        let key = self.sink.put_evaluation(&record).await?;
        info!(issuer = record.issuer_name, key, "summary evaluated");
        Ok(Some((key, record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::NewsItem;
    use llm_client::MockChatModel;

    fn analysis(raw_text: Option<&str>, summary: Option<&str>) -> NewsAnalysis {
        let mut analysis = NewsAnalysis::new(
            NewsItem {
                issuer_name: "Acme".into(),
                title: "Acme raises".into(),
                link: "https://a".into(),
                source: None,
                date: None,
                snippet: None,
            },
            "gpt-4o",
        );
        analysis.raw_text = raw_text.map(String::from);
        analysis.summary = summary.map(String::from);
        analysis
    }

    #[tokio::test]
    async fn test_evaluate_scores_every_dimension() {
        let judge = MockChatModel::new()
            .with_response("- relevance:", "4")
            .with_response("- coherence:", "5")
            .with_response("- consistency:", "3")
            .with_response("- fluency:", "5");
        let sink = MemoryStore::new();
        let evaluator = NewsEvaluator::new(&judge, &sink);

        let (key, record) = evaluator
            .evaluate(&analysis(Some("doc"), Some("summary")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.scores.len(), 4);
        assert_eq!(
            record.scores[0],
            (EvalMetric::Relevance, EvalScore::Score(4))
        );
        assert_eq!(
            record.scores[2],
            (EvalMetric::Consistency, EvalScore::Score(3))
        );
        assert!(key.starts_with("news-evaluation/acme/llm_evaluation_"));
        assert!(sink.record(&key).is_some());
    }

    #[tokio::test]
    async fn test_non_numeric_judge_reply_kept_raw() {
        let judge = MockChatModel::new()
            .with_response("- relevance:", "I cannot rate this.")
            .with_response("- coherence:", "5")
            .with_response("- consistency:", "5")
            .with_response("- fluency:", "5");
        let sink = MemoryStore::new();
        let evaluator = NewsEvaluator::new(&judge, &sink);

        let (_, record) = evaluator
            .evaluate(&analysis(Some("doc"), Some("summary")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            record.scores[0].1,
            EvalScore::Raw("I cannot rate this.".into())
        );
    }

    #[tokio::test]
    async fn test_missing_summary_skips() {
        let judge = MockChatModel::new();
        let sink = MemoryStore::new();
        let evaluator = NewsEvaluator::new(&judge, &sink);

        assert!(evaluator
            .evaluate(&analysis(Some("doc"), None))
            .await
            .unwrap()
            .is_none());
        assert!(evaluator
            .evaluate(&analysis(None, Some("s")))
            .await
            .unwrap()
            .is_none());
    }
}
