use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::constants;
use crate::entities::{company_cache, officer_cache, prelude::*};
use crate::models::company::{CompanyRecord, OfficerList};

/// Durable cache tier for the filter-invariant registry entities
/// (company profiles and officer lists). Rows past `expires_at` are
/// treated as absent and swept opportunistically on read.
pub struct EntityCacheRepository {
    conn: DatabaseConnection,
}

impl EntityCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_company(&self, company_number: &str) -> Result<Option<CompanyRecord>> {
        let now = chrono::Utc::now().to_rfc3339();

        let _ = CompanyCache::delete_many()
            .filter(company_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await;

        let entry = CompanyCache::find()
            .filter(company_cache::Column::CompanyNumber.eq(company_number))
            .filter(company_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        match entry {
            Some(e) => Ok(Some(serde_json::from_str(&e.record_json)?)),
            None => Ok(None),
        }
    }

    pub async fn set_company(&self, record: &CompanyRecord) -> Result<()> {
        let now = chrono::Utc::now();
        let expires_at =
            (now + chrono::Duration::days(constants::cache::ENTITY_DURABLE_TTL_DAYS)).to_rfc3339();

        let model = company_cache::ActiveModel {
            company_number: Set(record.company_number.clone()),
            record_json: Set(serde_json::to_string(record)?),
            fetched_at: Set(now.to_rfc3339()),
            expires_at: Set(expires_at),
        };

        CompanyCache::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(company_cache::Column::CompanyNumber)
                    .update_columns([
                        company_cache::Column::RecordJson,
                        company_cache::Column::FetchedAt,
                        company_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn get_officers(&self, company_number: &str) -> Result<Option<OfficerList>> {
        let now = chrono::Utc::now().to_rfc3339();

        let _ = OfficerCache::delete_many()
            .filter(officer_cache::Column::ExpiresAt.lt(&now))
            .exec(&self.conn)
            .await;

        let entry = OfficerCache::find()
            .filter(officer_cache::Column::CompanyNumber.eq(company_number))
            .filter(officer_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        match entry {
            Some(e) => Ok(Some(serde_json::from_str(&e.officers_json)?)),
            None => Ok(None),
        }
    }

    pub async fn set_officers(&self, company_number: &str, officers: &OfficerList) -> Result<()> {
        let now = chrono::Utc::now();
        let expires_at =
            (now + chrono::Duration::days(constants::cache::ENTITY_DURABLE_TTL_DAYS)).to_rfc3339();

        let model = officer_cache::ActiveModel {
            company_number: Set(company_number.to_string()),
            officers_json: Set(serde_json::to_string(officers)?),
            total_results: Set(officers.total_results),
            active_count: Set(officers.active_count),
            resigned_count: Set(officers.resigned_count),
            fetched_at: Set(now.to_rfc3339()),
            expires_at: Set(expires_at),
        };

        OfficerCache::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(officer_cache::Column::CompanyNumber)
                    .update_columns([
                        officer_cache::Column::OfficersJson,
                        officer_cache::Column::TotalResults,
                        officer_cache::Column::ActiveCount,
                        officer_cache::Column::ResignedCount,
                        officer_cache::Column::FetchedAt,
                        officer_cache::Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
