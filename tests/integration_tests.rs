//! End-to-end tests for the hybrid retrieval engine.
//!
//! These exercise the full workflow the agent's knowledge-base tools rely
//! on: document mutation with deferred builds, full rebuilds, lexical /
//! semantic / hybrid queries, stale-index reads, and crawler
//! synchronization.

use std::sync::Arc;

use linker_kb::{HashedBigramEmbedder, KnowledgeBase, Metadata, PolicyRecord};

/// Knowledge base preloaded with the two-policy corpus used throughout.
fn policy_kb() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    kb.add_document("p1", "소상공인 정책자금 대출 지원", Metadata::new(), false)
        .unwrap();
    kb.add_document("p2", "청년 창업 지원금 안내", Metadata::new(), false)
        .unwrap();
    kb.rebuild().unwrap();
    kb
}

fn record(id: &str, title: &str, summary: &str) -> PolicyRecord {
    PolicyRecord {
        policy_id: Some(id.to_string()),
        title: title.to_string(),
        summary: summary.to_string(),
        required_docs: vec!["사업자등록증".to_string()],
    }
}

// ============================================================================
// Empty-corpus and bound properties
// ============================================================================

#[test]
fn empty_corpus_returns_empty_for_any_query_and_k() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    kb.rebuild().unwrap();

    for k in [0, 1, 10] {
        assert!(kb.lexical_search("대출", k).is_empty());
        assert!(kb.semantic_search("대출", k).unwrap().is_empty());
        assert!(kb.hybrid_search("대출", k).unwrap().is_empty());
    }
}

#[test]
fn result_lengths_never_exceed_k() {
    let mut kb = policy_kb();

    for k in [0, 1, 2, 5] {
        assert!(kb.lexical_search("지원", k).len() <= k);
        assert!(kb.semantic_search("지원", k).unwrap().len() <= k);
        assert!(kb.hybrid_search("지원", k).unwrap().len() <= k);
    }
}

#[test]
fn rebuild_is_idempotent_on_unchanged_corpus() {
    let mut kb = policy_kb();

    let lexical_before = kb.lexical_search("대출", 2);
    let semantic_before = kb.semantic_search("창업 지원", 2).unwrap();
    let hybrid_before = kb.hybrid_search("창업 지원", 2).unwrap();

    kb.rebuild().unwrap();

    assert_eq!(kb.lexical_search("대출", 2), lexical_before);
    assert_eq!(kb.semantic_search("창업 지원", 2).unwrap(), semantic_before);
    assert_eq!(kb.hybrid_search("창업 지원", 2).unwrap(), hybrid_before);
}

// ============================================================================
// Scenario A: lexical exact-term match with zero-score exclusion
// ============================================================================

#[test]
fn lexical_query_returns_only_overlapping_document() {
    let kb = policy_kb();

    let results = kb.lexical_search("대출", 2);
    assert_eq!(results.len(), 1, "p2 shares no vocabulary and must be excluded");
    assert_eq!(results[0].1, "p1");

    // Even a k far beyond corpus size never surfaces the zero-score row.
    let results = kb.lexical_search("대출", 100);
    assert!(results.iter().all(|(_, id)| id != "p2"));
}

// ============================================================================
// Scenario B: hybrid fusion ranks the stronger combined match first
// ============================================================================

#[test]
fn hybrid_search_ranks_grant_notice_first_for_startup_query() {
    let mut kb = policy_kb();

    let ids = kb.hybrid_search("창업 지원", 2).unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"p1".to_string()));
    assert!(ids.contains(&"p2".to_string()));
    assert_eq!(ids[0], "p2", "p2 has the stronger combined relevance");
}

// ============================================================================
// Scenario C: stale reads until rebuild, then full disappearance
// ============================================================================

#[test]
fn deleted_document_stays_visible_until_rebuild() {
    let mut kb = policy_kb();

    kb.delete_document("p1", false).unwrap();

    // The store mutated but the indexes still serve the old corpus.
    let stale = kb.lexical_search("대출", 2);
    assert!(stale.iter().any(|(_, id)| id == "p1"));
    let stale = kb.semantic_search("소상공인 정책자금 대출 지원", 2).unwrap();
    assert!(stale.iter().any(|(_, id)| id == "p1"));

    kb.rebuild().unwrap();

    assert!(kb.lexical_search("대출", 2).iter().all(|(_, id)| id != "p1"));
    assert!(kb
        .semantic_search("소상공인 정책자금 대출 지원", 2)
        .unwrap()
        .iter()
        .all(|(_, id)| id != "p1"));
    assert!(!kb.hybrid_search("대출", 2).unwrap().contains(&"p1".to_string()));
}

// ============================================================================
// Scenario D and synchronization behavior
// ============================================================================

#[test]
fn synchronize_with_identical_source_is_a_noop() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    let source = vec![
        record("p1", "소상공인 정책자금", "저금리 대출 지원"),
        record("p2", "청년 창업 지원금", "창업 초기 자금 안내"),
    ];

    let first = kb.synchronize(&source).unwrap();
    assert_eq!(first.added, 2);
    assert_eq!(first.updated, 0);
    assert_eq!(first.deleted_reported, 0);

    let second = kb.synchronize(&source).unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.deleted_reported, 0);
}

#[test]
fn synchronize_applies_updates_as_overwrite_and_makes_them_searchable() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    kb.synchronize(&[record("p1", "소상공인 정책자금", "저금리 대출 지원")])
        .unwrap();

    let report = kb
        .synchronize(&[record("p1", "소상공인 정책자금", "금리 인하 확대 개편")])
        .unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.updated, 1);

    let stored = kb.document("p1").unwrap();
    assert_eq!(stored.content, "소상공인 정책자금: 금리 인하 확대 개편");

    // The deferred rebuild ran exactly once at the end of the sync, so the
    // new content is immediately searchable.
    let results = kb.lexical_search("개편", 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1, "p1");
}

#[test]
fn synchronize_reports_deletions_without_applying_them() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    kb.add_document("legacy", "구 정책 문서", Metadata::new(), true)
        .unwrap();

    let report = kb
        .synchronize(&[record("p1", "신규 정책", "새로 수집된 정책")])
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.deleted_reported, 1);

    // The orphaned document survives; only the report mentions it.
    assert!(kb.contains_document("legacy"));
    assert_eq!(kb.document_count(), 2);
}

#[test]
fn synchronize_attaches_source_metadata() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));
    kb.synchronize(&[record("p1", "소상공인 정책자금", "저금리 대출 지원")])
        .unwrap();

    let metadata = &kb.document("p1").unwrap().metadata;
    assert_eq!(
        metadata.get("source").and_then(|v| v.as_str()),
        Some("소진공(자동 동기화)")
    );
    assert_eq!(
        metadata
            .get("required_docs")
            .and_then(|v| v.as_array())
            .map(Vec::len),
        Some(1)
    );
}

// ============================================================================
// Batch loading
// ============================================================================

#[test]
fn batch_load_with_single_rebuild() {
    let mut kb = KnowledgeBase::new(Arc::new(HashedBigramEmbedder::default()));

    for i in 0..10 {
        kb.add_document(
            &format!("p{i}"),
            &format!("정책 문서 {i}번 창업 지원"),
            Metadata::new(),
            false,
        )
        .unwrap();
    }
    // Nothing searchable yet.
    assert!(kb.lexical_search("창업", 10).is_empty());

    kb.rebuild().unwrap();
    assert_eq!(kb.lexical_search("창업", 20).len(), 10);
    assert_eq!(kb.hybrid_search("창업 지원", 10).unwrap().len(), 10);
}

// ============================================================================
// Retrieval-tool contract: raw scores stay exposed for the caller's cutoff
// ============================================================================

#[test]
fn single_index_scores_support_external_threshold() {
    let mut kb = policy_kb();

    // The retrieval tool treats scores below its fixed cutoff as "not
    // found"; the engine must hand scores through untouched.
    let results = kb.search("소상공인 정책자금 대출 지원", 1).unwrap();
    assert_eq!(results.len(), 1);
    let (score, id) = &results[0];
    assert_eq!(id, "p1");
    assert!(*score > 0.1);

    for (score, _) in kb.semantic_search("낚시하는 법", 2).unwrap() {
        assert!((-1.0..=1.0).contains(&score));
    }
    for (score, _) in kb.lexical_search("지원", 2) {
        assert!((0.0..=1.0).contains(&score));
    }
}
