//! Minimal REST clients for hosted chat models.
//!
//! A clean client layer with no domain-specific logic. The research pipelines
//! talk to models exclusively through the [`ChatModel`] trait, so provider
//! choice (OpenAI, Anthropic, a mock in tests) is a wiring decision, not a
//! code change.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatModel, OpenAiClient};
//!
//! let client = OpenAiClient::from_env()?.with_model("gpt-4o");
//! let completion = client.complete("Summarize this filing: ...").await?;
//! ```
//!
//! # Modules
//!
//! - [`openai`] - OpenAI chat completions client
//! - [`anthropic`] - Anthropic messages client
//! - [`chat`] - Provider-agnostic [`ChatModel`] trait and [`MockChatModel`]
//! - [`output`] - Lenient parsing of model completions (fenced JSON, scores)

pub mod anthropic;
pub mod chat;
pub mod error;
pub mod openai;
pub mod output;

pub use anthropic::AnthropicClient;
pub use chat::{ChatModel, MockChatModel};
pub use error::{LlmError, Result};
pub use openai::{ChatRequest, ChatResponse, Message, OpenAiClient, ResponseFormat, Usage};
pub use output::{extract_json_object, extract_score, strip_assistant_preamble};
