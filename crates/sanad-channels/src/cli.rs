//! Terminal delivery for the interactive `chat` command.

use async_trait::async_trait;
use sanad_core::error::Result;
use sanad_core::traits::DeliverySink;
use std::io::Write;

/// Prints each reply part to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl DeliverySink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn max_message_len(&self) -> usize {
        usize::MAX
    }

    async fn deliver(&self, _conversation_id: &str, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "🤖 {text}\n")?;
        out.flush()?;
        Ok(())
    }
}
