//! Resolved connection details for one OpenAI-compatible backend.

use sanad_core::error::{Result, SanadError};
use std::time::Duration;

use crate::provider_registry::{self, AuthStyle, ProviderConfig};

/// Where to send requests and how to authenticate them.
///
/// The API key is resolved on every call rather than at construction, so a
/// key exported after startup is picked up and a missing key fails the call
/// instead of the process.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub base_url: String,
    pub chat_path: String,
    pub embeddings_path: Option<String>,
    pub auth_style: AuthStyle,
    configured_key: String,
    env_keys: Vec<String>,
    /// Send no auth instead of failing when no key is found.
    key_optional: bool,
}

impl Endpoint {
    /// Resolve a provider name ("openai", "custom:https://host/v1", ...).
    ///
    /// Resolution order:
    /// - Base URL: `endpoint_override` > env override > registry default
    /// - API key (at call time): `api_key` > provider env vars
    pub fn resolve(provider: &str, endpoint_override: &str, api_key: &str) -> Result<Self> {
        if let Some(custom) = provider.strip_prefix("custom:") {
            return Ok(Self::custom(custom, api_key));
        }

        let registry = provider_registry::get_provider_config(provider)
            .ok_or_else(|| SanadError::Config(format!("Unknown provider: {provider}")))?;
        Ok(Self::from_registry(registry, endpoint_override, api_key))
    }

    pub fn from_registry(registry: &ProviderConfig, endpoint_override: &str, api_key: &str) -> Self {
        let base_url = if !endpoint_override.is_empty() {
            endpoint_override.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST and friends are usually given without /v1
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        Self {
            name: registry.name.to_string(),
            base_url,
            chat_path: registry.chat_path.to_string(),
            embeddings_path: registry.embeddings_path.map(String::from),
            auth_style: registry.auth_style,
            configured_key: api_key.to_string(),
            env_keys: registry.env_keys.iter().map(|k| k.to_string()).collect(),
            key_optional: false,
        }
    }

    /// A self-hosted endpoint. Auth is only sent when a key is available.
    pub fn custom(base_url: &str, api_key: &str) -> Self {
        Self {
            name: "custom".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_path: "/chat/completions".to_string(),
            embeddings_path: Some("/embeddings".to_string()),
            auth_style: AuthStyle::Bearer,
            configured_key: api_key.to_string(),
            env_keys: vec!["CUSTOM_API_KEY".to_string()],
            key_optional: true,
        }
    }

    /// Current API key, or `ApiKeyMissing` when the provider needs one.
    pub fn api_key(&self) -> Result<Option<String>> {
        if self.auth_style == AuthStyle::None {
            return Ok(None);
        }
        if !self.configured_key.is_empty() {
            return Ok(Some(self.configured_key.clone()));
        }
        let from_env = self
            .env_keys
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        match from_env {
            Some(key) => Ok(Some(key)),
            None if self.key_optional => Ok(None),
            None => Err(SanadError::ApiKeyMissing(self.name.clone())),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn embeddings_url(&self) -> Result<String> {
        self.embeddings_path
            .as_ref()
            .map(|path| format!("{}{}", self.base_url, path))
            .ok_or_else(|| SanadError::Config(format!("{} has no embeddings API", self.name)))
    }

    /// Build a POST request with auth attached.
    pub fn post(&self, client: &reqwest::Client, url: &str) -> Result<reqwest::RequestBuilder> {
        let req = client.post(url).header("Content-Type", "application/json");
        Ok(match self.api_key()? {
            Some(key) => req.header("Authorization", format!("Bearer {key}")),
            None => req,
        })
    }
}

/// HTTP client with the configured request timeout.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SanadError::Config(format!("Failed to create HTTP client: {e}")))
}

#[cfg(test)]
pub(crate) fn test_endpoint(base_url: &str, key: &str) -> Endpoint {
    Endpoint {
        name: "test".to_string(),
        base_url: base_url.to_string(),
        chat_path: "/chat/completions".to_string(),
        embeddings_path: Some("/embeddings".to_string()),
        auth_style: AuthStyle::Bearer,
        configured_key: key.to_string(),
        env_keys: vec!["SANAD_TEST_KEY_THAT_IS_NEVER_SET".to_string()],
        key_optional: false,
    }
}
