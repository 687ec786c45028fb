//! Chat-completions client for OpenAI-compatible LLM providers.
//!
//! The generation engine drives this client to draft marketing content.
//! Transient failures (network, timeout, 429, 5xx) retry with exponential
//! backoff; everything else surfaces immediately.

mod client;
mod config;

pub use client::{ChatMessage, ChatResponse, LlmClient, LlmError};
pub use config::LlmConfig;
