use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::clients::KeywordPage;
use crate::constants;
use crate::db::Store;
use crate::models::company::{CompanyRecord, OfficerList};

struct VolatileEntry {
    payload: String,
    expires_at: DateTime<Utc>,
}

/// Two-tier cache over registry lookups. Reads check the durable SQLite
/// tier first, then the in-process tier; a miss in both means the caller
/// fetches upstream and writes through to both tiers. Every write is
/// best-effort: a failed write only skips caching for that entry.
///
/// Search pages live in the volatile tier alone (they go stale in
/// minutes); company profiles and officer lists are filter-invariant
/// facts and also persist across restarts.
pub struct ResultCache {
    volatile: RwLock<HashMap<String, VolatileEntry>>,
    durable: Option<Store>,
}

impl ResultCache {
    #[must_use]
    pub fn new(durable: Option<Store>) -> Self {
        Self {
            volatile: RwLock::new(HashMap::new()),
            durable,
        }
    }

    fn search_key(keyword: &str, page: u32, page_size: u32) -> String {
        format!("search:{keyword}:{page}:{page_size}")
    }

    pub async fn get_search_page(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> Option<KeywordPage> {
        self.volatile_get(&Self::search_key(keyword, page, page_size))
            .await
    }

    pub async fn put_search_page(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
        result: &KeywordPage,
    ) {
        self.volatile_put(
            Self::search_key(keyword, page, page_size),
            result,
            Duration::minutes(constants::cache::SEARCH_TTL_MINUTES),
        )
        .await;
    }

    pub async fn get_company(&self, company_number: &str) -> Option<CompanyRecord> {
        if let Some(store) = &self.durable {
            match store.get_cached_company(company_number).await {
                Ok(Some(record)) => return Some(record),
                Ok(None) => {}
                Err(e) => debug!("Durable cache read failed for {}: {}", company_number, e),
            }
        }
        self.volatile_get(&format!("company:{company_number}")).await
    }

    pub async fn put_company(&self, record: &CompanyRecord) {
        if let Some(store) = &self.durable
            && let Err(e) = store.cache_company(record).await
        {
            debug!(
                "Durable cache write failed for {}: {}",
                record.company_number, e
            );
        }
        self.volatile_put(
            format!("company:{}", record.company_number),
            record,
            Duration::hours(constants::cache::ENTITY_VOLATILE_TTL_HOURS),
        )
        .await;
    }

    pub async fn get_officers(&self, company_number: &str) -> Option<OfficerList> {
        if let Some(store) = &self.durable {
            match store.get_cached_officers(company_number).await {
                Ok(Some(officers)) => return Some(officers),
                Ok(None) => {}
                Err(e) => debug!("Durable cache read failed for {}: {}", company_number, e),
            }
        }
        self.volatile_get(&format!("officers:{company_number}"))
            .await
    }

    pub async fn put_officers(&self, company_number: &str, officers: &OfficerList) {
        if let Some(store) = &self.durable
            && let Err(e) = store.cache_officers(company_number, officers).await
        {
            debug!(
                "Durable cache write failed for {}: {}",
                company_number, e
            );
        }
        self.volatile_put(
            format!("officers:{company_number}"),
            officers,
            Duration::hours(constants::cache::ENTITY_VOLATILE_TTL_HOURS),
        )
        .await;
    }

    async fn volatile_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.volatile.read().await;
        let entry = map.get(key)?;
        // Expired entries are treated as absent; the writer overwrites
        // them on the next fetch rather than a sweeper removing them.
        if entry.expires_at <= Utc::now() {
            return None;
        }
        serde_json::from_str(&entry.payload).ok()
    }

    async fn volatile_put<T: Serialize>(&self, key: String, value: &T, ttl: Duration) {
        let Ok(payload) = serde_json::to_string(value) else {
            debug!("Volatile cache serialization failed for {}", key);
            return;
        };
        let mut map = self.volatile.write().await;
        map.insert(
            key,
            VolatileEntry {
                payload,
                expires_at: Utc::now() + ttl,
            },
        );
    }

    #[cfg(test)]
    async fn volatile_put_with_expiry<T: Serialize>(
        &self,
        key: String,
        value: &T,
        expires_at: DateTime<Utc>,
    ) {
        let payload = serde_json::to_string(value).unwrap();
        let mut map = self.volatile.write().await;
        map.insert(
            key,
            VolatileEntry {
                payload,
                expires_at,
            },
        );
    }
}
