//! Sanad configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SanadError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SanadConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

impl SanadConfig {
    /// Load config from the default path (~/.sanad/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SanadError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SanadError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| SanadError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Sanad home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sanad")
    }
}

/// Generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Registry name ("openai", "groq", ...) or "custom:<base url>".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Overrides the registry base URL when non-empty.
    #[serde(default)]
    pub endpoint: String,
    /// Falls back to the provider's env keys when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String { "openai".into() }
fn default_chat_model() -> String { "gpt-3.5-turbo".into() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 500 }
fn default_timeout_secs() -> u64 { 60 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String { "text-embedding-3-small".into() }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            api_key: String::new(),
            model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chunking and ranking knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Raw chunks must score strictly above this to be returned verbatim.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
    #[serde(default = "default_source_name")]
    pub source_name: String,
}

fn default_chunk_size() -> usize { 800 }
fn default_chunk_overlap() -> usize { 100 }
fn default_top_k() -> usize { 3 }
fn default_relevance_threshold() -> f32 { 0.5 }
fn default_source_name() -> String { "source.txt".into() }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            relevance_threshold: default_relevance_threshold(),
            source_name: default_source_name(),
        }
    }
}

/// Who the assistant speaks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_org_name_en")]
    pub org_name_en: String,
    #[serde(default = "default_org_name_ar")]
    pub org_name_ar: String,
}

fn default_org_name_en() -> String { "Family Jobs Egypt - Assiut Branch".into() }
fn default_org_name_ar() -> String { "عائلة الوظائف مصر - فرع أسيوط".into() }

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            org_name_en: default_org_name_en(),
            org_name_ar: default_org_name_ar(),
        }
    }
}

/// On-disk locations for corpus text and conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
}

fn default_data_dir() -> String { "~/.sanad/data".into() }

impl DataConfig {
    /// Data directory with `~` and env vars expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).as_ref())
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: default_data_dir() }
    }
}

/// WhatsApp Business Cloud API delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Pause between parts of a split reply.
    #[serde(default = "default_part_delay_ms")]
    pub part_delay_ms: u64,
}

fn default_max_message_len() -> usize { 4096 }
fn default_part_delay_ms() -> u64 { 1000 }

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            max_message_len: default_max_message_len(),
            part_delay_ms: default_part_delay_ms(),
        }
    }
}
