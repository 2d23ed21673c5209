//! Seams to the external collaborators the pipeline depends on.

pub mod channel;
pub mod corpus;
pub mod provider;

pub use channel::{DeliverySink, SeenStore};
pub use corpus::CorpusSource;
pub use provider::{Embedder, GenerateParams, Generator};
