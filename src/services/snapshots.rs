use crate::db::Store;
use crate::models::company::CompanyRecord;
use crate::models::filters::SearchFilters;
use crate::services::SearchError;

/// A stored result set, reloadable by token until the retention window
/// closes.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub token: String,
    pub filters: SearchFilters,
    pub items: Vec<CompanyRecord>,
    pub created_at: String,
}

/// Engine-facing contract with the snapshot persistence collaborator.
/// The engine only ever stores a full result set once and loads it back
/// whole; retention is the store's concern.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn store(
        &self,
        token: &str,
        filters: &SearchFilters,
        items: &[CompanyRecord],
    ) -> Result<(), SearchError>;

    /// Fails with [`SearchError::SnapshotNotFound`] for unknown tokens and
    /// for snapshots past the retention window.
    async fn load(&self, token: &str) -> Result<StoredSnapshot, SearchError>;
}

pub struct DbSnapshotStore {
    store: Store,
}

impl DbSnapshotStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for DbSnapshotStore {
    async fn store(
        &self,
        token: &str,
        filters: &SearchFilters,
        items: &[CompanyRecord],
    ) -> Result<(), SearchError> {
        let filters_json =
            serde_json::to_string(filters).map_err(|e| SearchError::Snapshot(e.to_string()))?;
        let items_json =
            serde_json::to_string(items).map_err(|e| SearchError::Snapshot(e.to_string()))?;

        self.store
            .insert_snapshot(token, &filters_json, &items_json)
            .await
            .map_err(|e| SearchError::Snapshot(e.to_string()))
    }

    async fn load(&self, token: &str) -> Result<StoredSnapshot, SearchError> {
        let row = self
            .store
            .get_snapshot(token)
            .await
            .map_err(|e| SearchError::Snapshot(e.to_string()))?
            .ok_or_else(|| SearchError::SnapshotNotFound(token.to_string()))?;

        let filters = serde_json::from_str(&row.filters_json)
            .map_err(|e| SearchError::Snapshot(e.to_string()))?;
        let items = serde_json::from_str(&row.items_json)
            .map_err(|e| SearchError::Snapshot(e.to_string()))?;

        Ok(StoredSnapshot {
            token: row.token,
            filters,
            items,
            created_at: row.created_at,
        })
    }
}
