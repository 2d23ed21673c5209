//! WhatsApp Business Cloud API delivery.
//!
//! Outbound only: inbound messages arrive through whatever webhook or
//! bridge the deployment uses and are handed to the conversation handler
//! as `IncomingMessage`s.

use async_trait::async_trait;
use sanad_core::config::WhatsAppConfig;
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::DeliverySink;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";

pub struct WhatsAppSink {
    access_token: String,
    phone_number_id: String,
    max_message_len: usize,
    base_url: String,
    client: reqwest::Client,
}

impl WhatsAppSink {
    /// Fails with a configuration error when credentials are missing.
    pub fn new(config: &WhatsAppConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(SanadError::Config("WhatsApp access_token not configured".into()));
        }
        if config.phone_number_id.is_empty() {
            return Err(SanadError::Config("WhatsApp phone_number_id not configured".into()));
        }
        Ok(Self {
            access_token: config.access_token.clone(),
            phone_number_id: config.phone_number_id.clone(),
            max_message_len: config.max_message_len.max(1),
            base_url: GRAPH_API_BASE.to_string(),
            client: reqwest::Client::new(),
        })
    }

    /// Point at a different Graph API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.base_url, self.phone_number_id)
    }

    /// Send one text message, returning the platform message id.
    pub async fn send_text_message(&self, to: &str, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": text
            }
        });

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SanadError::Channel(format!("WhatsApp API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SanadError::Channel(format!(
                "WhatsApp API error {status}: {error_text}"
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SanadError::Channel(format!("Invalid WhatsApp response: {e}")))?;

        let msg_id = result["messages"][0]["id"]
            .as_str()
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!("WhatsApp message sent: {msg_id} → {to}");
        Ok(msg_id)
    }
}

#[async_trait]
impl DeliverySink for WhatsAppSink {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn max_message_len(&self) -> usize {
        self.max_message_len
    }

    async fn deliver(&self, conversation_id: &str, text: &str) -> Result<()> {
        self.send_text_message(conversation_id, text).await?;
        Ok(())
    }
}
