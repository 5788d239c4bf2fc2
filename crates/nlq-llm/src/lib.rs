//! # nlq-llm
//!
//! [`SqlGenerator`] backed by an OpenAI-compatible `chat/completions`
//! endpoint.
//!
//! Provider failures never surface as `Err`: they come back as text starting
//! with `Error:`, which the pipeline reports as a generation failure.

pub mod error;
pub mod prompt;

use async_trait::async_trait;
use nlq_core::{LlmConfig, SchemaSnapshot};
use nlq_runtime::SqlGenerator;
use serde_json::{Value, json};

pub use error::LlmError;
pub use prompt::{CANNOT_ANSWER, build_prompt, clean_sql};

/// Sentinel returned when the call could not be completed at all.
pub const CALL_FAILED: &str = "Error: An exception occurred during the LLM call.";

pub struct LlmSqlGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl LlmSqlGenerator {
    /// Build a generator from configuration. The API key is read from the
    /// environment variable named by `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn call_llm(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt::system_prompt()},
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&text)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
            });
        }

        let response_json: Value = response.json().await.map_err(LlmError::Transport)?;
        response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::Response("no content in completion".to_string()))
    }
}

#[async_trait]
impl SqlGenerator for LlmSqlGenerator {
    async fn generate(&self, question: &str, schema: &SchemaSnapshot) -> anyhow::Result<String> {
        let prompt = build_prompt(question, schema);

        match self.call_llm(&prompt).await {
            Ok(content) => Ok(clean_sql(&content)),
            Err(LlmError::Api { status, message }) => {
                tracing::error!(status, message = %message, "LLM API call failed");
                Ok(format!("Error: LLM API call failed with message: {}", message))
            }
            Err(e) => {
                tracing::error!(error = %e, "LLM call failed");
                Ok(CALL_FAILED.to_string())
            }
        }
    }
}

// `{"error": {"message": ...}}` is the usual shape; some providers use a
// top-level `message`.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]["message"]
        .as_str()
        .or_else(|| value["message"].as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_shapes() {
        assert_eq!(
            api_error_message(r#"{"error": {"message": "Invalid API-key provided."}}"#).as_deref(),
            Some("Invalid API-key provided.")
        );
        assert_eq!(
            api_error_message(r#"{"code": "Throttling", "message": "Requests rate limit exceeded"}"#)
                .as_deref(),
            Some("Requests rate limit exceeded")
        );
        assert_eq!(api_error_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: "NLQ_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            LlmSqlGenerator::from_config(&config),
            Err(LlmError::MissingApiKey(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_sentinel() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9/v1/".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let generator = LlmSqlGenerator::new(&config, "test-key").unwrap();

        let text = generator
            .generate("List all courses", &SchemaSnapshot::new())
            .await
            .unwrap();
        assert_eq!(text, CALL_FAILED);
        assert!(nlq_runtime::is_error_sentinel(&text));
    }
}
