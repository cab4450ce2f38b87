//! Engine configuration constants.

/// Default output dimension of the built-in hashed embedder.
///
/// 256 buckets keeps collision probability negligible for the short
/// policy titles and summaries this engine serves while staying cheap to
/// score exhaustively.
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Metadata source tag attached to documents ingested by synchronization.
pub const SYNC_SOURCE_TAG: &str = "소진공(자동 동기화)";
