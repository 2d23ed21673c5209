//! File-backed stores under the data directory.
//!
//! Plain text and pretty-printed JSON, so an operator can inspect or edit
//! any of them by hand.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sanad_core::error::{Result, SanadError};
use sanad_core::traits::{CorpusSource, SeenStore};
use sanad_core::types::LanguageTag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const SOURCE_FILE: &str = "source.txt";
pub const STATE_FILE: &str = "state.json";

const DEFAULT_ABOUT_EN: &str = "🤖 Bilingual Customer Assistant (WhatsApp Web)\n\
• Answers questions in English & Arabic.\n\
• Explains our projects and services.\n\
• 24/7 fast, concise replies.\n\
Send any question or type \"projects\".";

const DEFAULT_ABOUT_AR: &str = "🤖 المساعد ثنائي اللغة (واتساب ويب)\n\
• يجيب على الأسئلة بالعربية والإنجليزية.\n\
• يشرح مشاريعنا وخدماتنا.\n\
• متاح 24/7 بردود سريعة ومختصرة.\n\
أرسل سؤالك أو اكتب «المشاريع».";

/// Read a data file, treating a missing file as empty.
async fn read_or_empty(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

async fn write_creating_dirs(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// Corpus text kept in `<data_dir>/source.txt`.
pub struct FileCorpusSource {
    path: PathBuf,
}

impl FileCorpusSource {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SOURCE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSource for FileCorpusSource {
    async fn corpus_text(&self) -> Result<String> {
        read_or_empty(&self.path).await
    }

    async fn set_corpus_text(&self, text: &str) -> Result<()> {
        write_creating_dirs(&self.path, text).await?;
        tracing::info!(
            "💾 Saved corpus ({} chars) to {}",
            text.chars().count(),
            self.path.display()
        );
        Ok(())
    }
}

/// On-disk shape of `state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeenState {
    #[serde(default)]
    seen_chats: Vec<String>,
    #[serde(default = "Utc::now")]
    last_updated: DateTime<Utc>,
}

impl Default for SeenState {
    fn default() -> Self {
        Self {
            seen_chats: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Summary of the seen-conversation registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenStats {
    pub seen_chats: usize,
    pub last_updated: DateTime<Utc>,
}

/// Conversations that already got the welcome text, persisted to
/// `<data_dir>/state.json` on every change.
pub struct JsonSeenStore {
    path: PathBuf,
    state: Mutex<SeenState>,
}

impl JsonSeenStore {
    /// Open the store, starting empty when the file is missing or corrupt.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(STATE_FILE);
        let state = Self::load(&path);
        tracing::info!("Loaded state with {} seen chats", state.seen_chats.len());
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn load(path: &Path) -> SeenState {
        if !path.exists() {
            return SeenState::default();
        }
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse {}: {e}", path.display());
                SeenState::default()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", path.display());
                SeenState::default()
            }
        }
    }

    async fn save(&self, state: &mut SeenState) -> Result<()> {
        state.last_updated = Utc::now();
        let json = serde_json::to_string_pretty(&*state)?;
        write_creating_dirs(&self.path, &json).await
    }

    pub async fn seen_chats(&self) -> Vec<String> {
        self.state.lock().await.seen_chats.clone()
    }

    /// Forget every conversation so each gets the welcome text again.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.seen_chats.clear();
        self.save(&mut state).await?;
        tracing::info!("Cleared all seen chats");
        Ok(())
    }

    pub async fn stats(&self) -> SeenStats {
        let state = self.state.lock().await;
        SeenStats {
            seen_chats: state.seen_chats.len(),
            last_updated: state.last_updated,
        }
    }
}

#[async_trait]
impl SeenStore for JsonSeenStore {
    async fn is_seen(&self, conversation_id: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.seen_chats.iter().any(|id| id == conversation_id))
    }

    async fn mark_seen(&self, conversation_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.seen_chats.iter().any(|id| id == conversation_id) {
            return Ok(());
        }
        state.seen_chats.push(conversation_id.to_string());
        self.save(&mut state).await?;
        tracing::info!("Marked chat {conversation_id} as seen");
        Ok(())
    }
}

/// Operator-editable welcome text in `about.en.txt` / `about.ar.txt`.
pub struct FileAboutText {
    dir: PathBuf,
}

impl FileAboutText {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.to_path_buf(),
        }
    }

    pub fn file_name(language: LanguageTag) -> &'static str {
        match language {
            LanguageTag::En => "about.en.txt",
            LanguageTag::Ar => "about.ar.txt",
        }
    }

    /// The about text for `language`, or the built-in default when the
    /// file is missing or blank.
    pub async fn get(&self, language: LanguageTag) -> Result<String> {
        let text = read_or_empty(&self.dir.join(Self::file_name(language))).await?;
        if text.trim().is_empty() {
            return Ok(default_about(language).to_string());
        }
        Ok(text)
    }

    pub async fn set(&self, language: LanguageTag, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(SanadError::Config("about text must not be empty".into()));
        }
        write_creating_dirs(&self.dir.join(Self::file_name(language)), text).await
    }
}

pub fn default_about(language: LanguageTag) -> &'static str {
    match language {
        LanguageTag::En => DEFAULT_ABOUT_EN,
        LanguageTag::Ar => DEFAULT_ABOUT_AR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_corpus_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = FileCorpusSource::new(dir.path());
        assert_eq!(corpus.corpus_text().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_corpus_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = FileCorpusSource::new(&dir.path().join("nested"));
        corpus.set_corpus_text("Event A is Monday.").await.unwrap();
        assert_eq!(corpus.corpus_text().await.unwrap(), "Event A is Monday.");
        assert!(corpus.path().ends_with("source.txt"));
    }

    #[tokio::test]
    async fn test_seen_store_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonSeenStore::open(dir.path());
            assert!(!store.is_seen("201000000000").await.unwrap());
            store.mark_seen("201000000000").await.unwrap();
            store.mark_seen("201000000000").await.unwrap();
            assert!(store.is_seen("201000000000").await.unwrap());
        }

        let reopened = JsonSeenStore::open(dir.path());
        assert!(reopened.is_seen("201000000000").await.unwrap());
        assert_eq!(reopened.seen_chats().await, vec!["201000000000"]);

        let raw = std::fs::read_to_string(dir.path().join(STATE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["seenChats"][0], "201000000000");
        assert!(value["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_seen_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "{not json").unwrap();
        let store = JsonSeenStore::open(dir.path());
        assert_eq!(store.stats().await.seen_chats, 0);
    }

    #[tokio::test]
    async fn test_seen_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSeenStore::open(dir.path());
        store.mark_seen("a").await.unwrap();
        store.mark_seen("b").await.unwrap();
        assert_eq!(store.stats().await.seen_chats, 2);

        store.clear().await.unwrap();
        assert_eq!(store.stats().await.seen_chats, 0);
        assert!(!JsonSeenStore::open(dir.path()).is_seen("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_about_defaults_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let about = FileAboutText::new(dir.path());
        assert_eq!(about.get(LanguageTag::En).await.unwrap(), DEFAULT_ABOUT_EN);
        assert_eq!(about.get(LanguageTag::Ar).await.unwrap(), DEFAULT_ABOUT_AR);

        about.set(LanguageTag::Ar, "نحن فرع أسيوط.").await.unwrap();
        assert_eq!(about.get(LanguageTag::Ar).await.unwrap(), "نحن فرع أسيوط.");
        assert_eq!(about.get(LanguageTag::En).await.unwrap(), DEFAULT_ABOUT_EN);
        assert!(about.set(LanguageTag::En, "  ").await.is_err());
    }
}
