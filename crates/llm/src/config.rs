//! LLM provider configuration from environment variables.

use crate::client::LlmError;

/// Default base URL when `LLM_BASE_URL` is unset.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model when `LLM_MODEL` is unset.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for an OpenAI-compatible provider.
///
/// | Variable       | Default                  | Meaning                     |
/// |----------------|--------------------------|-----------------------------|
/// | `LLM_API_KEY`  | (required)               | Bearer token                |
/// | `LLM_BASE_URL` | `https://api.openai.com` | Provider base URL, no path  |
/// | `LLM_MODEL`    | `gpt-4o-mini`            | Model sent in every request |
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl LlmConfig {
    /// Load from the environment. Fails when `LLM_API_KEY` is missing.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("LLM_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}
