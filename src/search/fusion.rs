//! Reciprocal Rank Fusion (RRF).
//!
//! Merges ranked lists from scoring spaces whose raw scores are not
//! comparable (bounded lexical cosine vs embedding inner product) by
//! working on ranks alone: a document at 1-indexed rank `r` in a list
//! contributes `1 / (K + r)`; its fused score is the sum over all lists it
//! appears in. Documents that rank well under either retrieval strategy
//! surface without any cross-space score calibration.

use std::collections::HashMap;
use std::hash::Hash;

/// Standard RRF smoothing constant from the literature (Cormack, Clarke &
/// Buettcher, SIGIR 2009). Discounts the influence of low ranks without
/// excluding them.
pub const RRF_K: f32 = 60.0;

/// Fuses ranked `(score, id)` lists into one descending-score ordering.
///
/// Input scores are discarded beyond the ordering they already encode.
/// The tie-break is an explicit total order: sort key is
/// `(-fused_score, first_seen)`, where `first_seen` is the order in which
/// an id is first encountered while iterating `lists` front to back. The
/// caller's list order therefore decides ties; no container iteration
/// order is involved.
pub fn reciprocal_rank_fusion<T>(lists: &[&[(f32, T)]], k: f32) -> Vec<(T, f32)>
where
    T: Clone + Eq + Hash,
{
    struct Entry {
        score: f32,
        first_seen: usize,
    }

    let mut fused: HashMap<T, Entry> = HashMap::new();
    let mut next_seen = 0usize;

    for list in lists {
        for (rank, (_score, id)) in list.iter().enumerate() {
            let contribution = 1.0 / (k + (rank + 1) as f32);
            fused
                .entry(id.clone())
                .and_modify(|entry| entry.score += contribution)
                .or_insert_with(|| {
                    let entry = Entry {
                        score: contribution,
                        first_seen: next_seen,
                    };
                    next_seen += 1;
                    entry
                });
        }
    }

    let mut combined: Vec<(T, Entry)> = fused.into_iter().collect();
    combined.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.first_seen.cmp(&b.1.first_seen))
    });
    combined
        .into_iter()
        .map(|(id, entry)| (id, entry.score))
        .collect()
}
