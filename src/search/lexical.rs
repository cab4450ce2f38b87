//! TF-IDF lexical index for overlapping-vocabulary matching.
//!
//! A term-weighting model is fit over the whole corpus at build time; the
//! vocabulary is corpus-dependent and invalidated by every rebuild.
//! Queries are vectorized against that vocabulary and scored by cosine
//! similarity against every corpus row, which bounds scores to `[0, 1]`
//! (all weights are non-negative). A score of exactly 0 means no shared
//! vocabulary and is not a hit.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::types::{CorpusSnapshot, ScoredDoc};

/// Minimum characters for a token to enter the vocabulary.
///
/// Single characters are overwhelmingly particles and punctuation noise in
/// the policy corpus; two characters is the shortest meaningful unit.
const MIN_TOKEN_CHARS: usize = 2;

/// Splits text into lowercased alphanumeric runs of at least
/// [`MIN_TOKEN_CHARS`] characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Sparse term-weighted index scored by cosine similarity.
///
/// Rows are L2-normalized at build time and queries at search time, so the
/// sparse dot product below is cosine similarity directly.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    /// term -> column, in first-seen order
    vocabulary: HashMap<String, usize>,
    /// smoothed inverse document frequency per column
    idf: Vec<f32>,
    /// one sparse L2-normalized weight vector per corpus row
    rows: Vec<Vec<(usize, f32)>>,
    snapshot: CorpusSnapshot,
}

impl LexicalIndex {
    /// Creates an empty, not-built index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fits the term-weighting model over `corpus` and replaces all rows.
    ///
    /// An empty corpus leaves the index in a valid "not built" state where
    /// every search returns an empty result list.
    #[instrument(skip_all, fields(corpus_len = corpus.len()))]
    pub fn build(&mut self, corpus: &[(String, String)]) {
        self.vocabulary.clear();
        self.idf.clear();
        self.rows.clear();
        self.snapshot = CorpusSnapshot::capture(corpus.iter().map(|(id, _)| id.clone()));
        if corpus.is_empty() {
            return;
        }

        // Term counts per row, vocabulary in first-seen order, document
        // frequency per column.
        let mut counts: Vec<HashMap<usize, f32>> = Vec::with_capacity(corpus.len());
        let mut document_frequency: Vec<f32> = Vec::new();
        for (_, content) in corpus {
            let mut row_counts: HashMap<usize, f32> = HashMap::new();
            for token in tokenize(content) {
                let next_column = self.vocabulary.len();
                let column = *self.vocabulary.entry(token).or_insert(next_column);
                if column == document_frequency.len() {
                    document_frequency.push(0.0);
                }
                *row_counts.entry(column).or_insert(0.0) += 1.0;
            }
            for &column in row_counts.keys() {
                document_frequency[column] += 1.0;
            }
            counts.push(row_counts);
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1, never zero, so every
        // indexed term contributes.
        let n = corpus.len() as f32;
        self.idf = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df)).ln() + 1.0)
            .collect();

        self.rows = counts
            .into_iter()
            .map(|row_counts| {
                let mut row: Vec<(usize, f32)> = row_counts
                    .into_iter()
                    .map(|(column, tf)| (column, tf * self.idf[column]))
                    .collect();
                row.sort_by_key(|&(column, _)| column);
                let norm: f32 = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        debug!(
            terms = self.vocabulary.len(),
            rows = self.rows.len(),
            "lexical index built"
        );
    }

    /// Scores `query` against every corpus row and returns the `k` best.
    ///
    /// Rows scoring `<= 0` are excluded; if `k` exceeds the corpus size all
    /// scoring rows are returned. Ties at equal score are stable by
    /// ascending row index (first-built order).
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredDoc> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        let mut query_weights: HashMap<usize, f32> = HashMap::new();
        for token in tokenize(query) {
            if let Some(&column) = self.vocabulary.get(&token) {
                *query_weights.entry(column).or_insert(0.0) += self.idf[column];
            }
        }
        if query_weights.is_empty() {
            return Vec::new();
        }
        let norm: f32 = query_weights.values().map(|w| w * w).sum::<f32>().sqrt();
        for w in query_weights.values_mut() {
            *w /= norm;
        }

        let mut hits: Vec<(f32, usize)> = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(row_index, row)| {
                let score: f32 = row
                    .iter()
                    .filter_map(|(column, weight)| {
                        query_weights.get(column).map(|qw| qw * weight)
                    })
                    .sum();
                (score > 0.0).then_some((score, row_index))
            })
            .collect();

        hits.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        hits.truncate(k);

        hits.into_iter()
            .filter_map(|(score, row_index)| {
                self.snapshot
                    .doc_id(row_index)
                    .map(|id| (score, id.to_string()))
            })
            .collect()
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
