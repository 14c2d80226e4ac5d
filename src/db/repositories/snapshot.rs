use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::constants;
use crate::entities::{prelude::*, search_snapshot};

/// Persistence for exported search result sets. Snapshots are written
/// once, never updated, and disappear after the retention window.
pub struct SnapshotRepository {
    conn: DatabaseConnection,
}

impl SnapshotRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&self, token: &str, filters_json: &str, items_json: &str) -> Result<()> {
        let model = search_snapshot::ActiveModel {
            token: Set(token.to_string()),
            filters_json: Set(filters_json.to_string()),
            items_json: Set(items_json.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        SearchSnapshot::insert(model).exec(&self.conn).await?;
        Ok(())
    }

    /// Returns the snapshot only while it is inside the retention window;
    /// anything older is purged and reported as absent.
    pub async fn get(&self, token: &str) -> Result<Option<search_snapshot::Model>> {
        let cutoff = (chrono::Utc::now()
            - chrono::Duration::hours(constants::retention::SNAPSHOT_HOURS))
        .to_rfc3339();

        let _ = SearchSnapshot::delete_many()
            .filter(search_snapshot::Column::CreatedAt.lt(&cutoff))
            .exec(&self.conn)
            .await;

        let row = SearchSnapshot::find()
            .filter(search_snapshot::Column::Token.eq(token))
            .filter(search_snapshot::Column::CreatedAt.gte(&cutoff))
            .one(&self.conn)
            .await?;

        Ok(row)
    }
}
