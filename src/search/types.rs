//! Core search types: errors, scored results, and the corpus snapshot.

use std::collections::HashMap;

use thiserror::Error;

use crate::error::EmbedError;

/// A single search hit: similarity score and document identifier.
///
/// Semantic scores are inner products of unit vectors in `[-1, 1]`;
/// lexical scores are cosines of non-negative weighted vectors in
/// `[0, 1]`. The two spaces are not comparable by value and may only be
/// combined by rank (see [`fusion`](crate::search::fusion)).
pub type ScoredDoc = (f32, String);

/// Error types for search operations.
///
/// Empty corpora, empty result sets, and absent index structures are NOT
/// errors; they yield empty result sequences.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Embedding inference failed; fatal to the search that triggered it
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),
    /// Vector dimension mismatch (expected vs actual)
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension
        expected: usize,
        /// Actual embedding dimension received
        actual: usize,
    },
}

/// Validates that a vector has the expected dimension.
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), SearchError> {
    if actual == expected {
        Ok(())
    } else {
        Err(SearchError::DimensionMismatch { expected, actual })
    }
}

/// Bidirectional arena between internal row indices and document ids.
///
/// Captured from the store at build time and replaced wholesale on every
/// rebuild; it is the only way integer row positions (TF-IDF matrix rows,
/// HNSW insertion ids) map back to document identifiers. Holding the
/// mapping in one value rules out dangling row indices after deletes: a
/// rebuild throws the whole arena away along with the rows it described.
#[derive(Debug, Default, Clone)]
pub(crate) struct CorpusSnapshot {
    rows: Vec<String>,
    positions: HashMap<String, usize>,
}

impl CorpusSnapshot {
    /// Captures the given identifiers in order as rows 0..n.
    pub(crate) fn capture<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let rows: Vec<String> = ids.into_iter().map(Into::into).collect();
        let positions = rows
            .iter()
            .enumerate()
            .map(|(row, id)| (id.clone(), row))
            .collect();
        Self { rows, positions }
    }

    /// Identifier at `row`, if in range.
    pub(crate) fn doc_id(&self, row: usize) -> Option<&str> {
        self.rows.get(row).map(String::as_str)
    }

    /// Row index of `doc_id`, if captured.
    #[allow(dead_code)] // Inverse lookup of the arena
    pub(crate) fn row_of(&self, doc_id: &str) -> Option<usize> {
        self.positions.get(doc_id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
