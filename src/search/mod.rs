//! Hybrid search: lexical TF-IDF, semantic HNSW, and rank fusion.
//!
//! - [`types`]: scored results, errors, and the corpus snapshot arena
//! - [`lexical`]: sparse term-weighted index scored by cosine similarity
//! - [`semantic`]: dense embedding index with approximate nearest-neighbor
//!   retrieval over unit vectors
//! - [`fusion`]: Reciprocal Rank Fusion merging the two rankings
//!
//! The two index types score in incompatible spaces (lexical cosine in
//! `[0, 1]`, semantic inner product in `[-1, 1]`) and are only ever
//! combined by rank. Both are rebuilt together from one store snapshot by
//! [`KnowledgeBase`](crate::engine::KnowledgeBase); neither supports
//! incremental updates.

pub mod fusion;
pub mod lexical;
pub mod semantic;
pub mod types;

pub use fusion::{reciprocal_rank_fusion, RRF_K};
pub use lexical::LexicalIndex;
pub use semantic::SemanticIndex;
pub use types::{validate_dimension, ScoredDoc, SearchError};
