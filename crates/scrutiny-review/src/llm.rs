//! OpenAI-compatible chat completions client.
//!
//! Review generation favors repeatability over creativity: low temperature,
//! bounded output. Works with any provider exposing the
//! `/v1/chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use scrutiny_core::ScrutinyError;

const MAX_OUTPUT_TOKENS: u32 = 4000;
const TEMPERATURE: f64 = 0.3;

/// Text-generation collaborator used by the review invoker.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given system and user prompts.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Llm`] on transport, quota, or response
    /// errors. The invoker converts these into a fallback review text; they
    /// never abort the pipeline.
    async fn generate(&self, system: &str, user: &str) -> Result<String, ScrutinyError>;

    /// The model identifier requests are made with.
    fn model(&self) -> &str;
}

/// Chat completions client for OpenAI-compatible endpoints.
///
/// # Examples
///
/// ```
/// use scrutiny_review::llm::OpenAiClient;
///
/// let client = OpenAiClient::new("sk-test", "gpt-4o", None).unwrap();
/// ```
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for `model`, optionally against a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScrutinyError::Llm`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, model: &str, base_url: Option<&str>) -> Result<Self, ScrutinyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ScrutinyError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.unwrap_or("https://api.openai.com").to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, ScrutinyError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrutinyError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScrutinyError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScrutinyError::Llm(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ScrutinyError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
