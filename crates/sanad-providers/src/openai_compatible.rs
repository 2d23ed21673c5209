//! Chat completions against any OpenAI-compatible API.

use async_trait::async_trait;
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::provider::{GenerateParams, Generator};
use serde_json::{Value, json};

use crate::endpoint::Endpoint;

/// A generative model reached over the OpenAI chat completions format.
pub struct OpenAiCompatibleProvider {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(endpoint: Endpoint, client: reqwest::Client) -> Self {
        Self { endpoint, client }
    }
}

/// Pull the assistant text out of a chat completions response body.
///
/// Empty or whitespace-only content is an upstream failure: callers rely on
/// a successful completion always carrying text.
pub fn parse_chat_response(provider: &str, json: &Value) -> Result<String> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| SanadError::Upstream(format!("{provider}: no choices in response")))?;

    let content = choice["message"]["content"].as_str().unwrap_or("").trim();
    if content.is_empty() {
        return Err(SanadError::Upstream(format!("{provider}: empty completion")));
    }
    Ok(content.to_string())
}

#[async_trait]
impl Generator for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.endpoint.name
    }

    async fn complete(&self, system: &str, user: &str, params: &GenerateParams) -> Result<String> {
        let body = json!({
            "model": params.model,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let url = self.endpoint.chat_url();
        let resp = self
            .endpoint
            .post(&self.client, &url)?
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SanadError::Upstream(format!("{} connection failed ({}): {}", self.endpoint.name, url, e))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SanadError::Upstream(format!(
                "{} API error {}: {}",
                self.endpoint.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| SanadError::Upstream(format!("{}: invalid response: {e}", self.endpoint.name)))?;

        let text = parse_chat_response(&self.endpoint.name, &json)?;
        tracing::debug!("{} completion: {} chars", self.endpoint.name, text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::test_endpoint;

    #[test]
    fn test_parse_chat_response() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Event A is on Monday.  " } }]
        });
        assert_eq!(parse_chat_response("openai", &body).unwrap(), "Event A is on Monday.");
    }

    #[test]
    fn test_parse_empty_completion_is_upstream_error() {
        let body = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(matches!(parse_chat_response("openai", &body), Err(SanadError::Upstream(_))));

        let body = json!({ "choices": [] });
        assert!(matches!(parse_chat_response("openai", &body), Err(SanadError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let provider = OpenAiCompatibleProvider::new(
            test_endpoint("http://127.0.0.1:9", ""),
            reqwest::Client::new(),
        );
        let err = provider
            .complete("system", "user", &GenerateParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SanadError::ApiKeyMissing(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_upstream_error() {
        let provider = OpenAiCompatibleProvider::new(
            test_endpoint("http://127.0.0.1:9", "key"),
            reqwest::Client::new(),
        );
        let err = provider
            .complete("system", "user", &GenerateParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SanadError::Upstream(_)));
    }
}
