//! Conversation-side collaborators: reply delivery and first-contact flags.

use async_trait::async_trait;

use crate::error::Result;

/// Delivers a reply string to a conversation on some transport.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    fn name(&self) -> &str;

    /// Largest message the transport accepts, in characters.
    fn max_message_len(&self) -> usize {
        4096
    }

    async fn deliver(&self, conversation_id: &str, text: &str) -> Result<()>;
}

/// Remembers which conversations have already been greeted.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn is_seen(&self, conversation_id: &str) -> Result<bool>;

    async fn mark_seen(&self, conversation_id: &str) -> Result<()>;
}
