//! Authoritative document store.
//!
//! [`DocumentStore`] owns the corpus: the mapping from document identifier
//! to content and metadata. The search indexes hold only derived,
//! rebuildable representations and must never be treated as the source of
//! truth. Mutations here have no side effect on any index; both indexes
//! are stale after any mutation until the caller rebuilds them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Arbitrary string-keyed metadata attached to a document.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Content and metadata stored for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Searchable text content
    pub content: String,
    /// Associated metadata (source, required documents, ...)
    pub metadata: Metadata,
}

/// Insertion-ordered in-memory document store.
///
/// Iteration order is insertion order; overwriting an existing identifier
/// keeps its original position. That order is what the indexes capture as
/// their corpus snapshot, so it must be stable across overwrites.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: IndexMap<String, DocumentRecord>,
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record for `doc_id`.
    pub fn add(&mut self, doc_id: impl Into<String>, content: impl Into<String>, metadata: Metadata) {
        let doc_id = doc_id.into();
        debug!(%doc_id, "store add");
        self.documents.insert(
            doc_id,
            DocumentRecord {
                content: content.into(),
                metadata,
            },
        );
    }

    /// Removes the record for `doc_id`, preserving the order of the rest.
    ///
    /// Returns `false` (not an error) when the identifier is absent.
    pub fn delete(&mut self, doc_id: &str) -> bool {
        let removed = self.documents.shift_remove(doc_id).is_some();
        if removed {
            debug!(%doc_id, "store delete");
        }
        removed
    }

    /// Returns the record for `doc_id`, if present.
    pub fn get(&self, doc_id: &str) -> Option<&DocumentRecord> {
        self.documents.get(doc_id)
    }

    /// Returns `true` if `doc_id` is present.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.documents.contains_key(doc_id)
    }

    /// All document identifiers in insertion order.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// All `(doc_id, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentRecord)> {
        self.documents.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` when the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
