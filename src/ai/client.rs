//! LLM (`OpenAI`) API client module
//!
//! Wraps the chat completions endpoint behind [`CompletionProvider`] so the
//! task extractor can be driven by a fake in tests.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::core::config::{AppConfig, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_OPENAI_BASE_URL};
use crate::errors::BookingError;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// A language-generation capability: role-tagged messages in, free text out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationFailed` when the upstream call fails for any reason,
    /// including an empty completion.
    async fn complete(&self, prompt: Vec<ChatCompletionMessage>) -> Result<String, BookingError>;
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for &T {
    async fn complete(&self, prompt: Vec<ChatCompletionMessage>) -> Result<String, BookingError> {
        (**self).complete(prompt).await
    }
}

/// LLM API client for JSON-mode chat completions
pub struct LlmClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
    timeout: Duration,
}

impl LlmClient {
    #[must_use]
    pub fn new(api_key: String, org_id: Option<String>, model_name: String) -> Self {
        Self {
            api_key,
            org_id,
            model_name,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_org_id.clone(),
            config.openai_model.clone(),
        )
        .with_base_url(&config.openai_base_url)
        .with_timeout(Duration::from_secs(config.llm_timeout_secs))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &Url) -> Self {
        self.base_url = base_url.as_str().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Request body for a JSON-object-mode chat completion.
    #[must_use]
    pub fn build_request_body(&self, prompt: &[ChatCompletionMessage]) -> Value {
        json!({
            "model": self.model_name,
            "messages": build_chat_messages(prompt),
            "response_format": { "type": "json_object" }
        })
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, prompt: Vec<ChatCompletionMessage>) -> Result<String, BookingError> {
        #[cfg(feature = "debug-logs")]
        info!("Using completion prompt:\n{:?}", prompt);

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();

        info!(
            model = %self.model_name,
            messages = prompt.len(),
            estimated_input_tokens,
            "Requesting chat completion"
        );

        let request_body = self.build_request_body(&prompt);

        let client = Client::builder().timeout(self.timeout).build().map_err(|e| {
            BookingError::GenerationFailed(format!("Failed to build OpenAI HTTP client: {e}"))
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key).parse().map_err(|e| {
            BookingError::GenerationFailed(format!("Invalid Authorization header: {e}"))
        })?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                BookingError::GenerationFailed(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        let response = client
            .post(self.completions_url())
            .headers(headers)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BookingError::GenerationFailed(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(BookingError::GenerationFailed(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            BookingError::GenerationFailed(format!("Failed to parse OpenAI response: {e}"))
        })?;

        extract_message_content(&response_json)
            .ok_or_else(|| BookingError::GenerationFailed("No content in response".to_string()))
    }
}

/// Converts a chat-style prompt into the wire `messages` array. Image parts
/// are not used by this service and are dropped.
pub(crate) fn build_chat_messages(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };
            match &m.content {
                Content::Text(t) => Some(json!({ "role": role_str, "content": t })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// `choices[0].message.content`, when present and non-blank.
#[must_use]
pub fn extract_message_content(response_json: &Value) -> Option<String> {
    response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(std::string::ToString::to_string)
}
