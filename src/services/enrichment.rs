use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::ResultCache;
use crate::clients::{KeywordPage, RegistryClient};
use crate::config::SearchConfig;
use crate::models::company::{CompanyRecord, OfficerList};
use crate::models::filters::SearchFilters;
use crate::services::SearchError;

/// Observer for incremental progress from a long scan: called with
/// `(processed, total_candidates)` after every batch. Best-effort UI
/// feedback, not a completion signal.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Cooperative cancellation flag shared between a caller and an in-flight
/// scan. Checked between batches; in-flight fetches run to completion.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a candidate scan. `truncated` marks the accuracy boundary:
/// the upstream had more matches than the ceiling allowed us to collect.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub candidates: Vec<CompanyRecord>,
    pub truncated: bool,
}

/// Fetches supplementary per-entity data in bounded batches and applies
/// the predicates the upstream search cannot. One logical worker drives
/// the pipeline; concurrency exists only inside a batch.
pub struct EnrichmentPipeline {
    registry: Arc<dyn RegistryClient>,
    cache: Arc<ResultCache>,
    tuning: SearchConfig,
}

impl EnrichmentPipeline {
    #[must_use]
    pub const fn new(
        registry: Arc<dyn RegistryClient>,
        cache: Arc<ResultCache>,
        tuning: SearchConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            tuning,
        }
    }

    /// Pages through the advanced index until the upstream runs out of
    /// matches or the candidate ceiling is reached. Duplicated company
    /// numbers across pages are dropped, first occurrence wins.
    pub async fn collect_advanced_candidates(
        &self,
        filters: &SearchFilters,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, SearchError> {
        let ceiling = self.tuning.candidate_ceiling;
        let page_size = self.tuning.scan_page_size;

        let mut candidates: Vec<CompanyRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut start_index = 0u32;
        let mut truncated = false;

        loop {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let page = self
                .registry
                .advanced_search(filters, start_index, page_size)
                .await?;
            let fetched = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
            if fetched == 0 {
                break;
            }
            start_index += fetched;

            for record in page.items {
                if seen.insert(record.company_number.clone()) {
                    candidates.push(record);
                }
            }

            if i64::try_from(start_index).unwrap_or(i64::MAX) >= page.hits {
                break;
            }
            if candidates.len() >= ceiling {
                truncated = true;
                break;
            }
        }

        candidates.truncate(ceiling);
        debug!(
            "Collected {} advanced-search candidates (truncated: {})",
            candidates.len(),
            truncated
        );
        Ok(ScanOutcome {
            candidates,
            truncated,
        })
    }

    /// Keyword-search variant of the candidate scan, used when the
    /// advanced index is unavailable. Pages come through the search cache.
    pub async fn collect_keyword_candidates(
        &self,
        keyword: &str,
        cancel: &CancelToken,
    ) -> Result<ScanOutcome, SearchError> {
        let ceiling = self.tuning.candidate_ceiling;
        let page_size = self.tuning.scan_page_size;

        let mut candidates: Vec<CompanyRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_number = 1u32;
        let mut truncated = false;

        loop {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let page = self
                .fetch_search_page(keyword, page_number, page_size)
                .await?;
            if page.items.is_empty() {
                break;
            }
            page_number += 1;

            for record in page.items {
                if seen.insert(record.company_number.clone()) {
                    candidates.push(record);
                }
            }

            if i64::try_from(candidates.len()).unwrap_or(i64::MAX) >= page.total_results {
                break;
            }
            if candidates.len() >= ceiling {
                truncated = true;
                break;
            }
        }

        candidates.truncate(ceiling);
        Ok(ScanOutcome {
            candidates,
            truncated,
        })
    }

    /// Replaces each candidate with its full profile (batches of
    /// `profile_batch_size`) and keeps the ones matching the filter set.
    /// A failed fetch drops that one entity and the pipeline carries on.
    pub async fn filter_by_profile(
        &self,
        candidates: Vec<CompanyRecord>,
        filters: &SearchFilters,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<Vec<CompanyRecord>, SearchError> {
        let total = candidates.len();
        let batch_size = self.tuning.profile_batch_size.max(1);
        let mut matched = Vec::new();
        let mut processed = 0usize;

        for batch in candidates.chunks(batch_size) {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let fetches = batch
                .iter()
                .map(|candidate| self.fetch_profile(&candidate.company_number));
            let results = futures::future::join_all(fetches).await;

            for (candidate, result) in batch.iter().zip(results) {
                match result {
                    Ok(profile) => {
                        if filters.matches_record(&profile) {
                            matched.push(profile);
                        }
                    }
                    Err(e) => warn!(
                        "Profile enrichment failed for {}: {}",
                        candidate.company_number, e
                    ),
                }
            }

            processed += batch.len();
            if let Some(report) = progress {
                report(processed, total);
            }
            if processed < total {
                tokio::time::sleep(Duration::from_millis(self.tuning.batch_delay_ms)).await;
            }
        }

        Ok(matched)
    }

    /// Keeps the candidates with at least one active officer born strictly
    /// before `birth_year` (batches of `officer_batch_size`).
    pub async fn filter_by_officer_birth_year(
        &self,
        candidates: Vec<CompanyRecord>,
        birth_year: i32,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<Vec<CompanyRecord>, SearchError> {
        let total = candidates.len();
        let batch_size = self.tuning.officer_batch_size.max(1);
        let mut matched = Vec::new();
        let mut processed = 0usize;

        for batch in candidates.chunks(batch_size) {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let fetches = batch
                .iter()
                .map(|candidate| self.fetch_officers(&candidate.company_number));
            let results = futures::future::join_all(fetches).await;

            for (candidate, result) in batch.iter().zip(results) {
                match result {
                    Ok(officers) => {
                        if officers.has_active_officer_born_before(birth_year) {
                            matched.push(candidate.clone());
                        }
                    }
                    Err(e) => warn!(
                        "Officer lookup failed for {}: {}",
                        candidate.company_number, e
                    ),
                }
            }

            processed += batch.len();
            if let Some(report) = progress {
                report(processed, total);
            }
            if processed < total {
                tokio::time::sleep(Duration::from_millis(self.tuning.batch_delay_ms)).await;
            }
        }

        Ok(matched)
    }

    async fn fetch_search_page(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> Result<KeywordPage, SearchError> {
        if let Some(hit) = self.cache.get_search_page(keyword, page, page_size).await {
            return Ok(hit);
        }
        let result = self
            .registry
            .search_companies(keyword, page, page_size)
            .await?;
        self.cache
            .put_search_page(keyword, page, page_size, &result)
            .await;
        Ok(result)
    }

    async fn fetch_profile(&self, company_number: &str) -> Result<CompanyRecord, SearchError> {
        if let Some(hit) = self.cache.get_company(company_number).await {
            return Ok(hit);
        }
        let profile = self.registry.company_profile(company_number).await?;
        self.cache.put_company(&profile).await;
        Ok(profile)
    }

    async fn fetch_officers(&self, company_number: &str) -> Result<OfficerList, SearchError> {
        if let Some(hit) = self.cache.get_officers(company_number).await {
            return Ok(hit);
        }
        let officers = self.registry.company_officers(company_number).await?;
        self.cache.put_officers(company_number, &officers).await;
        Ok(officers)
    }
}
