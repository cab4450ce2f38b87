//! HNSW semantic index over unit-normalized embeddings.
//!
//! Every document is encoded by the injected [`Embedder`] and normalized
//! to unit length before entering the graph, so inner product equals
//! cosine similarity and scores land in `[-1, 1]`. The graph is rebuilt
//! whole from a corpus snapshot; insertion order is row order, which keeps
//! HNSW item ids aligned with the snapshot arena.

use std::sync::Arc;

use hnsw::{Hnsw, Searcher};
use space::{Metric, Neighbor};
use tracing::{debug, instrument};

use super::types::{validate_dimension, CorpusSnapshot, ScoredDoc, SearchError};
use crate::embedding::{l2_normalize, Embedder};

/// Minimum ef parameter for HNSW queries.
///
/// ef controls the recall/speed tradeoff; `max(2k, MIN_EF_SEARCH)` scales
/// with the requested result count while keeping a quality floor on small
/// requests.
const MIN_EF_SEARCH: usize = 50;

/// Inner-product metric for unit vectors.
///
/// Both sides are unit length, so `1 - dot` is a distance in `[0, 2]`;
/// it is scaled to `u32` for the graph and mapped back to a similarity in
/// `[-1, 1]` when results are returned.
struct UnitDot;

impl Metric<Box<[f32]>> for UnitDot {
    type Unit = u32;

    fn distance(&self, a: &Box<[f32]>, b: &Box<[f32]>) -> u32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let distance = (1.0 - dot).clamp(0.0, 2.0);
        (distance * (u32::MAX as f32 / 2.0)) as u32
    }
}

fn similarity_from(distance: u32) -> f32 {
    1.0 - (distance as f32) / (u32::MAX as f32 / 2.0)
}

/// Dense embedding index with approximate nearest-neighbor retrieval.
///
/// M=16 bidirectional links per node (M0=32 at layer 0) per the HNSW
/// paper's recommendation for balanced recall and memory.
pub struct SemanticIndex {
    index: Hnsw<UnitDot, Box<[f32]>, rand::rngs::StdRng, 16, 32>,
    /// Searcher state, mutated during queries
    searcher: Searcher<u32>,
    snapshot: CorpusSnapshot,
    embedder: Arc<dyn Embedder>,
    dimension: usize,
}

impl SemanticIndex {
    /// Creates an empty index bound to `embedder`.
    ///
    /// The embedder's dimension fixes the index dimensionality; it cannot
    /// change without constructing a new index.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let dimension = embedder.dimension();
        Self {
            index: Hnsw::new(UnitDot),
            searcher: Searcher::default(),
            snapshot: CorpusSnapshot::default(),
            embedder,
            dimension,
        }
    }

    /// Encodes the whole corpus and repopulates the graph.
    ///
    /// All embeddings are computed before any structure is touched, so an
    /// inference failure leaves the previous index intact. An empty corpus
    /// resets to a valid empty state.
    #[instrument(skip_all, fields(corpus_len = corpus.len()))]
    pub fn build(&mut self, corpus: &[(String, String)]) -> Result<(), SearchError> {
        let contents: Vec<&str> = corpus.iter().map(|(_, c)| c.as_str()).collect();
        let mut embeddings = self.embedder.embed_batch(&contents)?;
        for embedding in &mut embeddings {
            validate_dimension(self.dimension, embedding.len())?;
            l2_normalize(embedding);
        }

        self.index = Hnsw::new(UnitDot);
        self.searcher = Searcher::default();
        self.snapshot = CorpusSnapshot::capture(corpus.iter().map(|(id, _)| id.clone()));
        for embedding in embeddings {
            self.index
                .insert(embedding.into_boxed_slice(), &mut self.searcher);
        }

        debug!(rows = self.snapshot.len(), "semantic index built");
        Ok(())
    }

    /// Returns the `k` nearest rows to `query` by inner product, in
    /// descending similarity order.
    ///
    /// An empty structure yields an empty list, never an error; embedding
    /// failures propagate.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<ScoredDoc>, SearchError> {
        let found = k.min(self.snapshot.len());
        if found == 0 {
            return Ok(Vec::new());
        }

        let mut query_embedding = self.embedder.embed(query)?;
        validate_dimension(self.dimension, query_embedding.len())?;
        l2_normalize(&mut query_embedding);

        let mut neighbors = vec![
            Neighbor {
                index: !0,
                distance: !0,
            };
            found
        ];
        let ef = (k * 2).max(MIN_EF_SEARCH);
        self.index.nearest(
            &query_embedding.into_boxed_slice(),
            ef,
            &mut self.searcher,
            &mut neighbors,
        );

        // nearest() fills ascending by distance; unfilled slots keep the
        // sentinel index and are dropped rather than reported as errors.
        Ok(neighbors
            .into_iter()
            .filter(|n| n.index != !0)
            .filter_map(|n| {
                self.snapshot
                    .doc_id(n.index)
                    .map(|id| (similarity_from(n.distance), id.to_string()))
            })
            .collect())
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Returns `true` when nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}
