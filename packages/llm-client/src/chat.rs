//! Provider-agnostic chat trait.
//!
//! The pipelines only ever need "prompt in, text out". Implementations wrap
//! specific providers and handle request shape and auth; [`MockChatModel`]
//! keeps tests offline.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{LlmError, Result};

/// Single-turn chat completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a prompt and return the completion text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Identifier recorded alongside persisted outputs (e.g. "gpt-4o").
    fn model_handle(&self) -> &str;
}

/// Mock chat model for tests.
///
/// Two modes, checked in order:
/// 1. canned responses returned when the prompt contains a registered
///    substring,
/// 2. a scripted FIFO of responses consumed one per call.
///
/// A call matching neither is an error, so tests fail loudly on an
/// unexpected prompt.
#[derive(Default)]
pub struct MockChatModel {
    canned: Vec<(String, String)>,
    scripted: Mutex<VecDeque<String>>,
}

impl MockChatModel {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` for any prompt containing `needle`.
    pub fn with_response(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.canned.push((needle.into(), response.into()));
        self
    }

    /// Queue a response returned by the next unmatched call.
    pub fn with_scripted(self, response: impl Into<String>) -> Self {
        self.scripted.lock().unwrap().push_back(response.into());
        self
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        for (needle, response) in &self.canned {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        if let Some(response) = self.scripted.lock().unwrap().pop_front() {
            return Ok(response);
        }
        Err(LlmError::Api(format!(
            "MockChatModel has no response for prompt: {}",
            prompt.chars().take(120).collect::<String>()
        )))
    }

    fn model_handle(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response() {
        let mock = MockChatModel::new().with_response("sentiment", "4");
        let out = mock.complete("rate the sentiment of this").await.unwrap();
        assert_eq!(out, "4");
    }

    #[tokio::test]
    async fn test_scripted_fifo() {
        let mock = MockChatModel::new().with_scripted("first").with_scripted("second");
        assert_eq!(mock.complete("a").await.unwrap(), "first");
        assert_eq!(mock.complete("b").await.unwrap(), "second");
        assert!(mock.complete("c").await.is_err());
    }

    #[tokio::test]
    async fn test_unmatched_multibyte_prompt_is_error_not_panic() {
        // Truncation in the error message must respect char boundaries.
        let mock = MockChatModel::new();
        // Byte 120 lands mid-'€' here.
        let prompt = format!("a{}", "€".repeat(100));
        assert!(mock.complete(&prompt).await.is_err());
    }
}
