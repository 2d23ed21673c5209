//! # Sanad Core
//!
//! Shared vocabulary for the Sanad workspace: configuration, the error
//! taxonomy, domain types (chunks, ranked results, language tags) and the
//! traits behind which every external collaborator sits (embedding model,
//! generative model, corpus text, seen-conversation flags, delivery sink).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::SanadConfig;
pub use error::{Result, SanadError};
