//! Error types shared across the crate.
//!
//! Search-specific errors live next to the search types in
//! [`crate::search::types`]; this module holds the embedding-side errors
//! that cross the [`Embedder`](crate::embedding::Embedder) trait boundary.

use thiserror::Error;

/// Errors that can occur while producing an embedding.
///
/// The engine performs no I/O of its own; embedding inference is a local,
/// blocking call, and a failure here is fatal to the search that triggered
/// it (there is no partial-result recovery mid-search).
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// The embedding computation itself failed
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    /// The embedder was constructed with an unusable configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
