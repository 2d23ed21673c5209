//! # Sanad Channels
//!
//! The conversation layer around the retrieval pipeline: first-contact
//! welcome, chat commands, reply splitting and delivery, plus the
//! file-backed stores a deployment keeps under its data directory.

pub mod cli;
pub mod handler;
pub mod split;
pub mod store;
pub mod whatsapp;

pub use cli::StdoutSink;
pub use handler::{Command, ConversationHandler, HandledAs};
pub use split::split_message;
pub use store::{FileAboutText, FileCorpusSource, JsonSeenStore};
pub use whatsapp::WhatsAppSink;
