use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::clients::RegistryClient;
use crate::config::SearchConfig;
use crate::constants;
use crate::models::company::CompanyRecord;
use crate::models::filters::SearchFilters;
use crate::services::enrichment::{CancelToken, EnrichmentPipeline, ProgressFn};
use crate::services::snapshots::SnapshotStore;
use crate::services::SearchError;

/// One resolved search: the requested page, the total across the whole
/// filtered collection, and a token the full set can be re-exported with.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub items: Vec<CompanyRecord>,
    pub total: i64,
    /// True when the candidate ceiling stopped the scan, making `total`
    /// a lower bound rather than an exact count.
    pub truncated: bool,
    pub token: String,
}

/// How a request is served, decided once up front instead of branching
/// through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Every requested filter maps to an advanced-search parameter; one
    /// exactly-sized upstream page answers the request.
    DirectAdvanced,
    /// A filter the upstream cannot express against its search index
    /// (postcode prefix) needs a full scan with local filtering, but no
    /// per-entity fetches.
    AdvancedScan,
    /// The officer constraint needs per-company officer lists.
    OfficerPass,
}

impl Strategy {
    fn select(filters: &SearchFilters) -> Self {
        if filters.requires_officer_pass() {
            Self::OfficerPass
        } else if filters.postcode_prefix.is_some() {
            Self::AdvancedScan
        } else {
            Self::DirectAdvanced
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::DirectAdvanced => "direct",
            Self::AdvancedScan => "advanced_scan",
            Self::OfficerPass => "officer_pass",
        }
    }
}

struct Resolution {
    page_items: Vec<CompanyRecord>,
    collection: Vec<CompanyRecord>,
    total: i64,
    truncated: bool,
}

/// The filter-resolution engine: picks an upstream strategy, runs the
/// enrichment pipeline when a predicate cannot be pushed upstream,
/// paginates the filtered collection, and issues the export token.
pub struct SearchService {
    registry: Arc<dyn RegistryClient>,
    pipeline: EnrichmentPipeline,
    snapshots: Arc<dyn SnapshotStore>,
}

impl SearchService {
    #[must_use]
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        cache: Arc<ResultCache>,
        snapshots: Arc<dyn SnapshotStore>,
        tuning: SearchConfig,
    ) -> Self {
        let pipeline = EnrichmentPipeline::new(registry.clone(), cache, tuning);
        Self {
            registry,
            pipeline,
            snapshots,
        }
    }

    pub async fn resolve(
        &self,
        filters: &SearchFilters,
        page: u32,
        page_size: u32,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<SearchOutcome, SearchError> {
        if page < 1 {
            return Err(SearchError::InvalidFilters(
                "page must be at least 1".to_string(),
            ));
        }
        if !(1..=constants::limits::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(SearchError::InvalidFilters(format!(
                "page_size must be between 1 and {}",
                constants::limits::MAX_PAGE_SIZE
            )));
        }
        filters.validate().map_err(SearchError::InvalidFilters)?;

        let strategy = Strategy::select(filters);
        metrics::counter!("regscout_searches_total", "strategy" => strategy.name()).increment(1);
        info!("Resolving search via {} strategy", strategy.name());

        let resolution = match strategy {
            Strategy::DirectAdvanced => match self.direct(filters, page, page_size).await {
                Err(SearchError::CapabilityUnavailable) => {
                    self.keyword_fallback(filters, page, page_size, progress, cancel)
                        .await?
                }
                other => other?,
            },
            Strategy::AdvancedScan => {
                match self
                    .advanced_scan(filters, page, page_size, cancel)
                    .await
                {
                    Err(SearchError::CapabilityUnavailable) => {
                        self.keyword_fallback(filters, page, page_size, progress, cancel)
                            .await?
                    }
                    other => other?,
                }
            }
            Strategy::OfficerPass => {
                match self
                    .officer_pass(filters, page, page_size, progress, cancel)
                    .await
                {
                    Err(SearchError::CapabilityUnavailable) => {
                        self.keyword_fallback(filters, page, page_size, progress, cancel)
                            .await?
                    }
                    other => other?,
                }
            }
        };

        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        // A fresh token per search, never derived from content: identical
        // searches must yield distinct snapshots.
        let token = generate_token();
        self.snapshots
            .store(&token, filters, &resolution.collection)
            .await?;

        Ok(SearchOutcome {
            items: resolution.page_items,
            total: resolution.total,
            truncated: resolution.truncated,
            token,
        })
    }

    /// Single advanced-search page, sized to the request; the upstream
    /// applies every predicate and reports the total.
    async fn direct(
        &self,
        filters: &SearchFilters,
        page: u32,
        page_size: u32,
    ) -> Result<Resolution, SearchError> {
        let start_index = (page - 1).saturating_mul(page_size);
        let result = self
            .registry
            .advanced_search(filters, start_index, page_size)
            .await?;

        Ok(Resolution {
            collection: result.items.clone(),
            page_items: result.items,
            total: result.hits,
            truncated: false,
        })
    }

    /// Full advanced scan with local record filtering; used when a filter
    /// (postcode prefix) has no upstream parameter but needs no
    /// per-entity fetches either.
    async fn advanced_scan(
        &self,
        filters: &SearchFilters,
        page: u32,
        page_size: u32,
        cancel: &CancelToken,
    ) -> Result<Resolution, SearchError> {
        let scan = self
            .pipeline
            .collect_advanced_candidates(filters, cancel)
            .await?;

        let matched: Vec<CompanyRecord> = scan
            .candidates
            .into_iter()
            .filter(|record| filters.matches_record(record))
            .collect();

        Ok(Self::paginate_collection(
            matched,
            scan.truncated,
            page,
            page_size,
        ))
    }

    /// Advanced scan over every supported filter, then the officer
    /// enrichment pass. A postcode prefix, if present, is applied to the
    /// candidate records before any officer list is fetched.
    async fn officer_pass(
        &self,
        filters: &SearchFilters,
        page: u32,
        page_size: u32,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<Resolution, SearchError> {
        let birth_year = filters
            .officer_birth_year
            .ok_or_else(|| SearchError::InvalidFilters("officer_birth_year missing".to_string()))?;

        let scan = self
            .pipeline
            .collect_advanced_candidates(filters, cancel)
            .await?;

        let candidates: Vec<CompanyRecord> = scan
            .candidates
            .into_iter()
            .filter(|record| filters.matches_record(record))
            .collect();

        let matched = self
            .pipeline
            .filter_by_officer_birth_year(candidates, birth_year, progress, cancel)
            .await?;

        Ok(Self::paginate_collection(
            matched,
            scan.truncated,
            page,
            page_size,
        ))
    }

    /// Degraded path for when the advanced index is unreachable: keyword
    /// scan, record-level predicates, profile enrichment only when a SIC
    /// filter needs the codes keyword results lack, then the officer pass
    /// if one was requested. Requires a keyword; there is deliberately no
    /// sentinel broad query to fall back on.
    async fn keyword_fallback(
        &self,
        filters: &SearchFilters,
        page: u32,
        page_size: u32,
        progress: Option<&ProgressFn>,
        cancel: &CancelToken,
    ) -> Result<Resolution, SearchError> {
        let Some(keyword) = filters.keyword.as_deref() else {
            return Err(SearchError::CapabilityUnavailable);
        };
        warn!("Advanced search unavailable, degrading to keyword scan for '{keyword}'");

        let scan = self
            .pipeline
            .collect_keyword_candidates(keyword, cancel)
            .await?;

        let needs_profiles = filters.sic.as_ref().is_some_and(|codes| !codes.is_empty());

        let matched = if needs_profiles {
            // Cheap record predicates first so only plausible candidates
            // pay for a profile fetch; the profile pass re-applies the
            // full filter set against the enriched records.
            let mut without_sic = filters.clone();
            without_sic.sic = None;
            let plausible: Vec<CompanyRecord> = scan
                .candidates
                .into_iter()
                .filter(|record| without_sic.matches_record(record))
                .collect();
            self.pipeline
                .filter_by_profile(plausible, filters, progress, cancel)
                .await?
        } else {
            scan.candidates
                .into_iter()
                .filter(|record| filters.matches_record(record))
                .collect()
        };

        let matched = if let Some(birth_year) = filters.officer_birth_year {
            self.pipeline
                .filter_by_officer_birth_year(matched, birth_year, progress, cancel)
                .await?
        } else {
            matched
        };

        Ok(Self::paginate_collection(
            matched,
            scan.truncated,
            page,
            page_size,
        ))
    }

    /// 1-based slice over the fully filtered collection. Out-of-range
    /// pages come back empty with the total untouched.
    fn paginate_collection(
        collection: Vec<CompanyRecord>,
        truncated: bool,
        page: u32,
        page_size: u32,
    ) -> Resolution {
        let start = (page as usize - 1) * page_size as usize;
        let page_items = collection
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Resolution {
            total: i64::try_from(collection.len()).unwrap_or(i64::MAX),
            page_items,
            collection,
            truncated,
        }
    }
}

fn generate_token() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().fold(String::with_capacity(32), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_selection_prefers_officer_pass() {
        let filters = SearchFilters {
            officer_birth_year: Some(1950),
            postcode_prefix: Some("SW1".to_string()),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&filters), Strategy::OfficerPass);
    }

    #[test]
    fn strategy_selection_scans_for_postcode() {
        let filters = SearchFilters {
            postcode_prefix: Some("SW1".to_string()),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&filters), Strategy::AdvancedScan);
    }

    #[test]
    fn strategy_selection_defaults_to_direct() {
        let filters = SearchFilters {
            keyword: Some("acme".to_string()),
            company_status: Some(vec!["active".to_string()]),
            ..Default::default()
        };
        assert_eq!(Strategy::select(&filters), Strategy::DirectAdvanced);
    }

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn pagination_slices_the_filtered_collection() {
        let collection: Vec<CompanyRecord> = (0..5)
            .map(|i| CompanyRecord {
                company_number: format!("0000000{i}"),
                company_name: format!("COMPANY {i}"),
                status: "active".to_string(),
                company_type: "ltd".to_string(),
                incorporation_date: None,
                registered_office: crate::models::company::RegisteredOffice::default(),
                sic_codes: Vec::new(),
            })
            .collect();

        let resolution = SearchService::paginate_collection(collection.clone(), false, 2, 2);
        assert_eq!(resolution.total, 5);
        assert_eq!(resolution.page_items.len(), 2);
        assert_eq!(resolution.page_items[0].company_number, "00000002");

        let out_of_range = SearchService::paginate_collection(collection, false, 1000, 2);
        assert_eq!(out_of_range.total, 5);
        assert!(out_of_range.page_items.is_empty());
    }
}
