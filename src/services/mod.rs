pub mod enrichment;
pub mod export;
pub mod search;
pub mod snapshots;

pub use enrichment::{CancelToken, EnrichmentPipeline, ProgressFn};
pub use export::{ExportFile, ExportFormat, ExportService};
pub use search::{SearchOutcome, SearchService};
pub use snapshots::{DbSnapshotStore, SnapshotStore, StoredSnapshot};

use thiserror::Error;

/// Error taxonomy for the search core. Per-entity enrichment failures and
/// cache failures never surface here; they are absorbed by the pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid filters: {0}")]
    InvalidFilters(String),

    #[error("registry error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The advanced search endpoint is unreachable for this credential.
    /// Distinct from a generic upstream failure so callers can degrade.
    #[error("advanced search capability unavailable")]
    CapabilityUnavailable,

    #[error("search cancelled by caller")]
    Cancelled,

    #[error("snapshot {0} not found or expired")]
    SnapshotNotFound(String),

    #[error("snapshot store: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SearchError {
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
