//! # linker-kb
//!
//! Hybrid knowledge-base retrieval engine for the AI-Linker policy agent.
//!
//! Combines two independent in-memory indexes over one authoritative
//! document store:
//!
//! - a sparse TF-IDF lexical index for exact/overlapping-vocabulary
//!   matching, scored by cosine similarity
//! - a dense embedding index (HNSW over unit vectors) for paraphrase-level
//!   matching, scored by inner product
//!
//! and merges their rankings with Reciprocal Rank Fusion. The agent loop,
//! HTTP layer, and crawler are external collaborators: they feed documents
//! in through [`KnowledgeBase::add_document`] /
//! [`KnowledgeBase::synchronize`] and consume ranked document ids from
//! [`KnowledgeBase::hybrid_search`].
//!
//! ## Modules
//!
//! - [`engine`] - [`KnowledgeBase`]: lifecycle, rebuilds, and the hybrid
//!   query path
//! - [`search`] - the two index types and the fusion algorithm
//! - [`store`] - authoritative insertion-ordered document store
//! - [`sync`] - diff-based synchronization against an external policy list
//! - [`embedding`] - the [`Embedder`] seam and the built-in hashed model
//! - [`config`] / [`error`] - constants and embedding-side errors
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use linker_kb::{HashedBigramEmbedder, KnowledgeBase, Metadata};
//!
//! # fn main() -> Result<(), linker_kb::SearchError> {
//! let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
//!
//! // Batch load with a deferred build, then rebuild once.
//! kb.add_document("p1", "소상공인 정책자금 대출 지원", Metadata::new(), false)?;
//! kb.add_document("p2", "청년 창업 지원금 안내", Metadata::new(), false)?;
//! kb.rebuild()?;
//!
//! let ids = kb.hybrid_search("창업 지원", 2)?;
//! assert_eq!(ids.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod search;
pub mod store;
pub mod sync;

pub use embedding::{Embedder, HashedBigramEmbedder};
pub use engine::KnowledgeBase;
pub use error::EmbedError;
pub use search::{ScoredDoc, SearchError};
pub use store::{DocumentRecord, DocumentStore, Metadata};
pub use sync::{PolicyRecord, SyncPlan, SyncReport};
