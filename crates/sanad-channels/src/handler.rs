//! Conversation handler: turns one inbound chat message into replies.
//!
//! Order of checks: transport noise (groups, own messages) is dropped,
//! first contact gets the about text, then fixed commands, then the
//! retrieval pipeline.

use sanad_core::config::IdentityConfig;
use sanad_core::error::Result;
use sanad_core::traits::{DeliverySink, SeenStore};
use sanad_core::types::{IncomingMessage, LanguageTag, ResponseTier};
use sanad_knowledge::{Retriever, lang};
use std::sync::Arc;
use std::time::Duration;

use crate::split::split_message;
use crate::store::FileAboutText;

pub const DEFAULT_PART_DELAY: Duration = Duration::from_millis(1000);

/// Fixed chat commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `about`, `projects`, `services` and their Arabic forms.
    About,
    Help,
}

/// Parse a command, ignoring case and surrounding whitespace.
pub fn parse_command(text: &str) -> Option<Command> {
    match text.trim().to_lowercase().as_str() {
        "about" | "عن" | "من نحن" | "projects" | "services" | "المشاريع" | "الخدمات" => {
            Some(Command::About)
        }
        "help" | "مساعدة" | "مساعده" => Some(Command::Help),
        _ => None,
    }
}

/// What the handler did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledAs {
    Skipped,
    Welcome,
    Command(Command),
    Answer(ResponseTier),
    /// The pipeline failed and the error text was sent instead.
    Failed,
}

pub fn error_text(language: LanguageTag) -> &'static str {
    match language {
        LanguageTag::En => "Sorry, an error occurred. Please try again.",
        LanguageTag::Ar => "عذراً، حدث خطأ. يرجى المحاولة مرة أخرى.",
    }
}

pub struct ConversationHandler {
    retriever: Arc<Retriever>,
    seen: Arc<dyn SeenStore>,
    sink: Arc<dyn DeliverySink>,
    about: FileAboutText,
    identity: IdentityConfig,
    part_delay: Duration,
}

impl ConversationHandler {
    pub fn new(
        retriever: Arc<Retriever>,
        seen: Arc<dyn SeenStore>,
        sink: Arc<dyn DeliverySink>,
        about: FileAboutText,
        identity: IdentityConfig,
    ) -> Self {
        Self {
            retriever,
            seen,
            sink,
            about,
            identity,
            part_delay: DEFAULT_PART_DELAY,
        }
    }

    /// Pause between the parts of a split reply.
    pub fn with_part_delay(mut self, delay: Duration) -> Self {
        self.part_delay = delay;
        self
    }

    pub fn help_text(&self, language: LanguageTag) -> String {
        match language {
            LanguageTag::Ar => format!(
                "مرحباً! أنا مساعدك في {}.\n\n\
                 الأوامر المتاحة:\n\
                 • \"about\" أو \"عن\" - معلومات عن الشركة\n\
                 • \"projects\" أو \"المشاريع\" - خدماتنا\n\
                 • \"help\" أو \"مساعدة\" - هذه الرسالة\n\n\
                 يمكنك أيضاً طرح أي سؤال وسأحاول مساعدتك!",
                self.identity.org_name_ar
            ),
            LanguageTag::En => format!(
                "Hello! I'm your assistant at {}.\n\n\
                 Available commands:\n\
                 • \"about\" - Company information\n\
                 • \"projects\" or \"services\" - Our services\n\
                 • \"help\" - This message\n\n\
                 You can also ask any question and I'll try to help!",
                self.identity.org_name_en
            ),
        }
    }

    /// Handle one inbound message. Only delivery and store failures are
    /// returned; pipeline failures are reported to the user instead.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Result<HandledAs> {
        if message.is_group || message.from_me {
            return Ok(HandledAs::Skipped);
        }

        let chat = message.conversation_id.as_str();
        let language = lang::detect(&message.text);
        let preview: String = message.text.chars().take(50).collect();
        tracing::info!("Received message from {chat}: {preview}");

        if !self.seen.is_seen(chat).await? {
            tracing::info!("First contact from {chat}, sending welcome message");
            let about = self.about.get(language).await?;
            self.deliver(chat, &about).await?;
            self.seen.mark_seen(chat).await?;
            return Ok(HandledAs::Welcome);
        }

        if message.text.trim().is_empty() {
            return Ok(HandledAs::Skipped);
        }

        if let Some(command) = parse_command(&message.text) {
            tracing::info!("Command detected: {command:?}");
            let reply = match command {
                Command::About => self.about.get(language).await?,
                Command::Help => self.help_text(language),
            };
            self.deliver(chat, &reply).await?;
            return Ok(HandledAs::Command(command));
        }

        match self.retriever.answer_with_outcome(&message.text).await {
            Ok(outcome) => {
                self.deliver(chat, &outcome.reply).await?;
                Ok(HandledAs::Answer(outcome.tier))
            }
            Err(e) => {
                tracing::error!("Error generating reply for {chat}: {e}");
                self.deliver(chat, error_text(language)).await?;
                Ok(HandledAs::Failed)
            }
        }
    }

    /// Send `text`, split to the sink's size cap. Blank text is dropped.
    pub async fn deliver(&self, conversation_id: &str, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            tracing::warn!("Attempted to send empty message to {conversation_id}");
            return Ok(());
        }

        let parts = split_message(text, self.sink.max_message_len());
        if parts.len() > 1 {
            tracing::info!("Splitting message into {} parts", parts.len());
        }
        for (i, part) in parts.iter().enumerate() {
            if i > 0 && !self.part_delay.is_zero() {
                tokio::time::sleep(self.part_delay).await;
            }
            self.sink.deliver(conversation_id, part).await?;
        }
        tracing::debug!(
            "Sent {} chars to {conversation_id} via {}",
            text.chars().count(),
            self.sink.name()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonSeenStore, default_about};
    use async_trait::async_trait;
    use sanad_core::error::SanadError;
    use sanad_core::traits::Embedder;
    use sanad_core::types::EmbeddingVector;
    use sanad_knowledge::{Chunker, InMemoryCorpus, Synthesizer, SynthesizerConfig};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MemorySink {
        max_len: usize,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl MemorySink {
        fn new(max_len: usize) -> Self {
            Self {
                max_len,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl DeliverySink for MemorySink {
        fn name(&self) -> &str {
            "memory"
        }

        fn max_message_len(&self) -> usize {
            self.max_len
        }

        async fn deliver(&self, conversation_id: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((conversation_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct KeywordEmbedder {
        keywords: Vec<&'static str>,
        fail: AtomicBool,
    }

    impl KeywordEmbedder {
        fn vector(&self, text: &str) -> EmbeddingVector {
            let text = text.to_lowercase();
            self.keywords
                .iter()
                .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(SanadError::Upstream("embedding service down".into()));
            }
            Ok(texts.iter().map(|t| self.vector(t)).collect())
        }
    }

    struct Fixture {
        handler: ConversationHandler,
        sink: Arc<MemorySink>,
        embedder: Arc<KeywordEmbedder>,
        _dir: tempfile::TempDir,
    }

    fn fixture(corpus: &str, max_len: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let embedder = Arc::new(KeywordEmbedder {
            keywords: vec!["monday", "friday"],
            fail: AtomicBool::new(false),
        });
        let retriever = Arc::new(Retriever::new(
            Arc::new(InMemoryCorpus::new(corpus)),
            embedder.clone(),
            Synthesizer::new(None, SynthesizerConfig::default()),
            Chunker::new(30, 0),
            3,
        ));
        let sink = Arc::new(MemorySink::new(max_len));
        let handler = ConversationHandler::new(
            retriever,
            Arc::new(JsonSeenStore::open(dir.path())),
            sink.clone(),
            FileAboutText::new(dir.path()),
            IdentityConfig::default(),
        )
        .with_part_delay(Duration::ZERO);
        Fixture {
            handler,
            sink,
            embedder,
            _dir: dir,
        }
    }

    const CORPUS: &str = "Event A is Monday. Event B is Friday.";

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  About "), Some(Command::About));
        assert_eq!(parse_command("SERVICES"), Some(Command::About));
        assert_eq!(parse_command("من نحن"), Some(Command::About));
        assert_eq!(parse_command("الخدمات"), Some(Command::About));
        assert_eq!(parse_command("Help"), Some(Command::Help));
        assert_eq!(parse_command("مساعده"), Some(Command::Help));
        assert_eq!(parse_command("help me find a job"), None);
    }

    #[tokio::test]
    async fn test_skips_groups_and_own_messages() {
        let f = fixture(CORPUS, 4096);
        let mut group = IncomingMessage::direct("g1", "hello");
        group.is_group = true;
        let mut own = IncomingMessage::direct("c1", "hello");
        own.from_me = true;

        assert_eq!(f.handler.handle_message(&group).await.unwrap(), HandledAs::Skipped);
        assert_eq!(f.handler.handle_message(&own).await.unwrap(), HandledAs::Skipped);
        assert!(f.sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_first_contact_gets_welcome_once() {
        let f = fixture(CORPUS, 4096);
        let msg = IncomingMessage::direct("c1", "When is Event A on monday?");

        assert_eq!(f.handler.handle_message(&msg).await.unwrap(), HandledAs::Welcome);
        assert_eq!(f.sink.texts(), vec![default_about(LanguageTag::En)]);

        let second = f.handler.handle_message(&msg).await.unwrap();
        assert_eq!(second, HandledAs::Answer(ResponseTier::RawChunks));
        assert_eq!(f.sink.texts()[1], "Event A is Monday.");
    }

    #[tokio::test]
    async fn test_arabic_first_contact_and_help() {
        let f = fixture(CORPUS, 4096);
        let msg = IncomingMessage::direct("c2", "مرحبا");
        f.handler.handle_message(&msg).await.unwrap();
        assert_eq!(f.sink.texts(), vec![default_about(LanguageTag::Ar)]);

        let help = IncomingMessage::direct("c2", "مساعدة");
        assert_eq!(
            f.handler.handle_message(&help).await.unwrap(),
            HandledAs::Command(Command::Help)
        );
        assert!(f.sink.texts()[1].contains("الأوامر المتاحة"));
    }

    #[tokio::test]
    async fn test_about_command() {
        let f = fixture(CORPUS, 4096);
        f.handler.handle_message(&IncomingMessage::direct("c1", "hi")).await.unwrap();
        let out = f
            .handler
            .handle_message(&IncomingMessage::direct("c1", "Projects"))
            .await
            .unwrap();
        assert_eq!(out, HandledAs::Command(Command::About));
        assert_eq!(f.sink.texts()[1], default_about(LanguageTag::En));
    }

    #[tokio::test]
    async fn test_pipeline_failure_sends_error_text() {
        let f = fixture(CORPUS, 4096);
        f.handler.handle_message(&IncomingMessage::direct("c1", "hi")).await.unwrap();
        f.embedder.fail.store(true, Ordering::SeqCst);

        let out = f
            .handler
            .handle_message(&IncomingMessage::direct("c1", "متى الحدث؟"))
            .await
            .unwrap();
        assert_eq!(out, HandledAs::Failed);
        assert_eq!(f.sink.texts()[1], error_text(LanguageTag::Ar));
    }

    #[tokio::test]
    async fn test_empty_corpus_answers_with_apology() {
        let f = fixture("", 4096);
        f.handler.handle_message(&IncomingMessage::direct("c1", "hi")).await.unwrap();
        let out = f
            .handler
            .handle_message(&IncomingMessage::direct("c1", "Anything on friday?"))
            .await
            .unwrap();
        assert_eq!(out, HandledAs::Answer(ResponseTier::Apology));
        assert_eq!(f.sink.texts().len(), 2);
    }

    #[tokio::test]
    async fn test_long_reply_is_split_in_order() {
        let f = fixture(CORPUS, 10);
        f.handler.deliver("c1", "abcd. efgh ijkl").await.unwrap();
        assert_eq!(f.sink.texts(), vec!["abcd.", "efgh ijkl"]);
    }

    #[tokio::test]
    async fn test_whatsapp_delivery_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let config = sanad_core::config::WhatsAppConfig {
            access_token: "token".into(),
            phone_number_id: "12345".into(),
            ..Default::default()
        };
        let sink = crate::whatsapp::WhatsAppSink::new(&config)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let embedder = Arc::new(KeywordEmbedder {
            keywords: vec!["monday"],
            fail: AtomicBool::new(false),
        });
        let retriever = Arc::new(Retriever::new(
            Arc::new(InMemoryCorpus::new(CORPUS)),
            embedder,
            Synthesizer::new(None, SynthesizerConfig::default()),
            Chunker::default(),
            3,
        ));
        let handler = ConversationHandler::new(
            retriever,
            Arc::new(JsonSeenStore::open(dir.path())),
            Arc::new(sink),
            FileAboutText::new(dir.path()),
            IdentityConfig::default(),
        );

        let err = handler
            .handle_message(&IncomingMessage::direct("201000000000", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, SanadError::Channel(_)));
        // Not marked seen, so the welcome is retried next time.
        assert!(!JsonSeenStore::open(dir.path()).is_seen("201000000000").await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_text_not_delivered() {
        let f = fixture(CORPUS, 4096);
        f.handler.deliver("c1", "  \n ").await.unwrap();
        assert!(f.sink.texts().is_empty());
    }
}
