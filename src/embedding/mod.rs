//! Embedding abstractions.
//!
//! The engine never looks up an embedding model through global state; it
//! receives one through the [`Embedder`] trait as an explicitly owned
//! dependency. This keeps model choice (a transformer served in-process, a
//! remote inference client, or the built-in [`HashedBigramEmbedder`]) out
//! of the index code entirely.

mod hashed;

pub use hashed::HashedBigramEmbedder;

use crate::error::EmbedError;

/// Trait for text embedding models.
///
/// Implementations must be `Send + Sync` so a single model instance can be
/// shared behind an `Arc` by every index that needs it.
///
/// Vectors returned by an embedder are *not* required to be unit length;
/// the semantic index normalizes every vector at encode time so the
/// unit-length invariant holds regardless of the model.
pub trait Embedder: Send + Sync {
    /// Output dimension of this model. Fixed for the model's lifetime;
    /// changing dimension means a different embedder and a full rebuild.
    fn dimension(&self) -> usize;

    /// Embeds a single text into a vector of [`dimension`](Self::dimension)
    /// length.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embeds a batch of texts.
    ///
    /// The default implementation loops over [`embed`](Self::embed); models
    /// with real batch inference should override it.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Scales `v` in place to unit L2 length.
///
/// A zero vector is left untouched; it scores 0 against everything, which
/// is the correct "no signal" behavior for empty content.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
