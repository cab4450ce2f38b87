//! Knowledge-base engine: document lifecycle, index rebuilds, and the
//! hybrid query path.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::embedding::Embedder;
use crate::search::fusion::{reciprocal_rank_fusion, RRF_K};
use crate::search::lexical::LexicalIndex;
use crate::search::semantic::SemanticIndex;
use crate::search::types::{ScoredDoc, SearchError};
use crate::store::{DocumentStore, Metadata};

/// The lexical and semantic indexes as one value.
///
/// The two indexes are only consistent with each other when built from the
/// same store state at the same instant, so they are never rebuilt
/// piecewise: `rebuild` captures one snapshot and feeds it to both.
pub(crate) struct IndexPair {
    lexical: LexicalIndex,
    semantic: SemanticIndex,
}

impl IndexPair {
    fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            lexical: LexicalIndex::new(),
            semantic: SemanticIndex::new(embedder),
        }
    }

    fn rebuild(&mut self, store: &DocumentStore) -> Result<(), SearchError> {
        let corpus: Vec<(String, String)> = store
            .iter()
            .map(|(id, record)| (id.to_string(), record.content.clone()))
            .collect();
        // Semantic first: its build embeds everything before mutating any
        // structure, so a model failure here leaves both indexes on the
        // previous snapshot.
        self.semantic.build(&corpus)?;
        self.lexical.build(&corpus);
        Ok(())
    }
}

/// Hybrid knowledge-base retrieval engine.
///
/// Owns the authoritative [`DocumentStore`] and an [`IndexPair`] of
/// derived indexes, with the embedding model injected at construction.
/// Mutations never touch the indexes implicitly: after any `add`/`delete`
/// with a deferred build, searches keep answering from the old corpus
/// until [`rebuild`](Self::rebuild) runs. Rebuild cost is linear in corpus
/// size and dominated by embedding, which is why every mutation entry
/// point can defer it.
///
/// All calls block the caller for their full duration; mutation+rebuild
/// sequences must be serialized by the caller (single-writer discipline).
pub struct KnowledgeBase {
    store: DocumentStore,
    indexes: IndexPair,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base using `embedder` for the semantic
    /// channel.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: DocumentStore::new(),
            indexes: IndexPair::new(embedder),
        }
    }

    /// Inserts or overwrites a document.
    ///
    /// With `build_index = false` the indexes are left stale so callers
    /// can batch many mutations and pay for one rebuild.
    #[instrument(skip_all, fields(%doc_id, build_index))]
    pub fn add_document(
        &mut self,
        doc_id: &str,
        content: impl Into<String>,
        metadata: Metadata,
        build_index: bool,
    ) -> Result<(), SearchError> {
        info!(%doc_id, "adding document");
        self.store.add(doc_id, content, metadata);
        if build_index {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Deletes a document if present; absent identifiers are a no-op and
    /// never trigger a rebuild.
    ///
    /// Returns whether a document was actually removed.
    #[instrument(skip_all, fields(%doc_id, build_index))]
    pub fn delete_document(&mut self, doc_id: &str, build_index: bool) -> Result<bool, SearchError> {
        if !self.store.delete(doc_id) {
            return Ok(false);
        }
        info!(%doc_id, "deleted document");
        if build_index {
            self.rebuild()?;
        }
        Ok(true)
    }

    /// Rebuilds both indexes from the current store snapshot.
    ///
    /// Full and non-incremental; this is the only way the indexes become
    /// consistent with the store. Idempotent on an unchanged corpus.
    #[instrument(skip_all, fields(documents = self.store.len()))]
    pub fn rebuild(&mut self) -> Result<(), SearchError> {
        self.indexes.rebuild(&self.store)?;
        info!(documents = self.store.len(), "indexes rebuilt");
        Ok(())
    }

    /// Term-overlap search against the lexical index.
    ///
    /// Scores are cosines in `[0, 1]`; rows sharing no vocabulary with the
    /// query are excluded.
    pub fn lexical_search(&self, query: &str, k: usize) -> Vec<ScoredDoc> {
        self.indexes.lexical.search(query, k)
    }

    /// Similarity search against the semantic index.
    ///
    /// Scores are inner products of unit vectors in `[-1, 1]`.
    pub fn semantic_search(&mut self, query: &str, k: usize) -> Result<Vec<ScoredDoc>, SearchError> {
        self.indexes.semantic.search(query, k)
    }

    /// Single-index fallback search; delegates to the semantic index.
    ///
    /// Callers that gate "no result found" on a fixed score cutoff apply
    /// it to the scores returned here, not to hybrid output.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<ScoredDoc>, SearchError> {
        self.semantic_search(query, k)
    }

    /// Hybrid search: both indexes queried independently, rankings merged
    /// by Reciprocal Rank Fusion, top `k` document ids returned.
    ///
    /// Each index is asked for `2k` candidates so the fusion step has
    /// enough overlap to work with. The semantic list is fused first, so
    /// equal fused scores resolve toward the semantic ranking. Scores are
    /// dropped from the result: hybrid callers work in id space.
    #[instrument(skip_all, fields(k))]
    pub fn hybrid_search(&mut self, query: &str, k: usize) -> Result<Vec<String>, SearchError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let candidates = k.saturating_mul(2);
        let semantic = self.indexes.semantic.search(query, candidates)?;
        let lexical = self.indexes.lexical.search(query, candidates);
        if semantic.is_empty() && lexical.is_empty() {
            return Ok(Vec::new());
        }

        let fused = reciprocal_rank_fusion(&[semantic.as_slice(), lexical.as_slice()], RRF_K);
        Ok(fused.into_iter().take(k).map(|(id, _)| id).collect())
    }

    /// Record for `doc_id`, if present.
    pub fn document(&self, doc_id: &str) -> Option<&crate::store::DocumentRecord> {
        self.store.get(doc_id)
    }

    /// Returns `true` if `doc_id` is stored.
    pub fn contains_document(&self, doc_id: &str) -> bool {
        self.store.contains(doc_id)
    }

    /// All `(doc_id, record)` pairs in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &crate::store::DocumentRecord)> {
        self.store.iter()
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` when the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub(crate) fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Logs a full dump of the knowledge base for inspection.
    pub fn dump(&self) {
        if self.store.is_empty() {
            warn!("knowledge base is empty");
            return;
        }
        for (doc_id, record) in self.store.iter() {
            info!(
                %doc_id,
                content = %record.content,
                metadata = %serde_json::Value::Object(record.metadata.clone()),
                "document"
            );
        }
    }
}
