//! Synchronization against an external authoritative policy source.
//!
//! The crawler hands over the latest policy list; this module diffs it
//! against the store, applies additions and content changes with one
//! deferred rebuild, and reports deletions without ever applying them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::SYNC_SOURCE_TAG;
use crate::engine::KnowledgeBase;
use crate::search::types::SearchError;
use crate::store::{DocumentStore, Metadata};

/// One policy entry from the external source.
///
/// Records without a `policy_id` cannot be keyed and are skipped silently
/// during planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    /// Stable identifier of the policy
    #[serde(default)]
    pub policy_id: Option<String>,
    /// Policy title
    #[serde(default)]
    pub title: String,
    /// One-paragraph summary
    #[serde(default)]
    pub summary: String,
    /// Names of the supporting documents an application requires
    #[serde(default)]
    pub required_docs: Vec<String>,
}

impl PolicyRecord {
    /// Content string stored for this record. Comparison during planning
    /// is byte-for-byte on this exact derivation.
    pub fn derived_content(&self) -> String {
        format!("{}: {}", self.title, self.summary)
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), serde_json::json!(SYNC_SOURCE_TAG));
        metadata.insert(
            "required_docs".to_string(),
            serde_json::json!(self.required_docs),
        );
        metadata
    }
}

/// Minimal mutation plan computed from store vs source id sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Source ids absent from the store, in source order
    pub to_add: Vec<String>,
    /// Shared ids whose derived content differs byte-for-byte, in source order
    pub to_update: Vec<String>,
    /// Store ids absent from the source, in store order; reported only
    pub to_delete: Vec<String>,
}

impl SyncPlan {
    /// Diffs `records` against `store`.
    ///
    /// Shared ids with identical derived content are skipped entirely;
    /// that short-circuit is what makes a byte-identical source a no-op.
    /// Duplicate source ids keep their first position; the last record
    /// wins on content.
    pub fn compute(store: &DocumentStore, records: &[PolicyRecord]) -> Self {
        let mut source_ids: Vec<&str> = Vec::new();
        let mut latest: HashMap<&str, &PolicyRecord> = HashMap::new();
        for record in records {
            let Some(id) = record.policy_id.as_deref() else {
                warn!("sync record without policy_id skipped");
                continue;
            };
            if latest.insert(id, record).is_none() {
                source_ids.push(id);
            }
        }

        let mut plan = SyncPlan::default();
        for &id in &source_ids {
            let record = latest[id];
            match store.get(id) {
                None => plan.to_add.push(id.to_string()),
                Some(existing) => {
                    if existing.content != record.derived_content() {
                        plan.to_update.push(id.to_string());
                    }
                }
            }
        }

        let source_set: HashSet<&str> = source_ids.iter().copied().collect();
        plan.to_delete = store
            .all_ids()
            .filter(|id| !source_set.contains(id))
            .map(str::to_string)
            .collect();

        plan
    }

    fn is_mutating(&self) -> bool {
        !self.to_add.is_empty() || !self.to_update.is_empty()
    }
}

/// Result counts of one synchronization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Documents newly added
    pub added: usize,
    /// Documents overwritten with changed content
    pub updated: usize,
    /// Documents that would be deleted by a destructive sync; not applied
    pub deleted_reported: usize,
}

impl KnowledgeBase {
    /// Synchronizes the store with `records` and rebuilds once.
    ///
    /// Additions and updates are applied as overwrites with the rebuild
    /// deferred to a single pass at the end; an update is an in-place
    /// overwrite, never delete-then-insert, so no search can observe a
    /// transiently missing document. Deletions are computed and reported
    /// but deliberately not executed. When the plan is empty no rebuild
    /// runs at all.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn synchronize(&mut self, records: &[PolicyRecord]) -> Result<SyncReport, SearchError> {
        let plan = SyncPlan::compute(self.store(), records);
        info!(
            add = plan.to_add.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "sync plan"
        );

        let latest: HashMap<&str, &PolicyRecord> = records
            .iter()
            .filter_map(|r| r.policy_id.as_deref().map(|id| (id, r)))
            .collect();

        for id in plan.to_add.iter().chain(plan.to_update.iter()) {
            let Some(record) = latest.get(id.as_str()) else {
                continue;
            };
            self.add_document(id, record.derived_content(), record.metadata(), false)?;
        }

        if plan.is_mutating() {
            self.rebuild()?;
        }

        for id in &plan.to_delete {
            warn!(doc_id = %id, "absent from sync source; deletion reported, not applied");
        }

        Ok(SyncReport {
            added: plan.to_add.len(),
            updated: plan.to_update.len(),
            deleted_reported: plan.to_delete.len(),
        })
    }
}
