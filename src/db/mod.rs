use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::search_snapshot;
use crate::models::company::{CompanyRecord, OfficerList};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn entity_cache_repo(&self) -> repositories::cache::EntityCacheRepository {
        repositories::cache::EntityCacheRepository::new(self.conn.clone())
    }

    fn snapshot_repo(&self) -> repositories::snapshot::SnapshotRepository {
        repositories::snapshot::SnapshotRepository::new(self.conn.clone())
    }

    pub async fn get_cached_company(&self, company_number: &str) -> Result<Option<CompanyRecord>> {
        self.entity_cache_repo().get_company(company_number).await
    }

    pub async fn cache_company(&self, record: &CompanyRecord) -> Result<()> {
        self.entity_cache_repo().set_company(record).await
    }

    pub async fn get_cached_officers(&self, company_number: &str) -> Result<Option<OfficerList>> {
        self.entity_cache_repo().get_officers(company_number).await
    }

    pub async fn cache_officers(
        &self,
        company_number: &str,
        officers: &OfficerList,
    ) -> Result<()> {
        self.entity_cache_repo()
            .set_officers(company_number, officers)
            .await
    }

    pub async fn insert_snapshot(
        &self,
        token: &str,
        filters_json: &str,
        items_json: &str,
    ) -> Result<()> {
        self.snapshot_repo()
            .insert(token, filters_json, items_json)
            .await
    }

    pub async fn get_snapshot(&self, token: &str) -> Result<Option<search_snapshot::Model>> {
        self.snapshot_repo().get(token).await
    }
}
