//! Engine-level tests for strategy selection, local filtering,
//! pagination, and progress reporting, driven against a mock registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use regscout::cache::ResultCache;
use regscout::clients::{AdvancedPage, KeywordPage, RegistryClient};
use regscout::config::SearchConfig;
use regscout::models::company::{
    CompanyRecord, DateOfBirth, OfficerList, OfficerRecord, RegisteredOffice,
};
use regscout::models::filters::SearchFilters;
use regscout::services::{
    CancelToken, SearchError, SearchService, SnapshotStore, StoredSnapshot,
};

fn company(number: &str, name: &str, status: &str) -> CompanyRecord {
    CompanyRecord {
        company_number: number.to_string(),
        company_name: name.to_string(),
        status: status.to_string(),
        company_type: "ltd".to_string(),
        incorporation_date: NaiveDate::from_ymd_opt(2010, 1, 1),
        registered_office: RegisteredOffice {
            locality: Some("London".to_string()),
            postal_code: Some("EC1A 1AA".to_string()),
            region: None,
            country: Some("England".to_string()),
        },
        sic_codes: vec!["62010".to_string()],
    }
}

fn active_officer(birth_year: i32) -> OfficerRecord {
    OfficerRecord {
        name: "SMITH, Alex".to_string(),
        officer_role: "director".to_string(),
        appointed_on: NaiveDate::from_ymd_opt(2010, 5, 1),
        resigned_on: None,
        date_of_birth: Some(DateOfBirth {
            month: Some(3),
            year: birth_year,
        }),
        nationality: Some("British".to_string()),
        occupation: Some("Director".to_string()),
    }
}

fn officers(items: Vec<OfficerRecord>) -> OfficerList {
    let active = items.iter().filter(|o| o.resigned_on.is_none()).count() as i64;
    let total = items.len() as i64;
    OfficerList {
        items,
        active_count: active,
        resigned_count: total - active,
        total_results: total,
    }
}

#[derive(Default)]
struct MockRegistry {
    companies: Vec<CompanyRecord>,
    officer_lists: HashMap<String, OfficerList>,
    advanced_available: bool,
    advanced_calls: AtomicUsize,
    keyword_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    officer_calls: AtomicUsize,
}

impl MockRegistry {
    fn new(companies: Vec<CompanyRecord>) -> Self {
        Self {
            companies,
            advanced_available: true,
            ..Default::default()
        }
    }

    /// What the upstream advanced index would match: every filter it has
    /// a parameter for, so everything except postcode and the officer
    /// constraint.
    fn upstream_matches(filters: &SearchFilters, record: &CompanyRecord) -> bool {
        let mut supported = filters.clone();
        supported.postcode_prefix = None;
        supported.officer_birth_year = None;
        if let Some(keyword) = &supported.keyword
            && !record
                .company_name
                .to_lowercase()
                .contains(&keyword.to_lowercase())
        {
            return false;
        }
        supported.keyword = None;
        supported.matches_record(record)
    }
}

#[async_trait::async_trait]
impl RegistryClient for MockRegistry {
    async fn search_companies(
        &self,
        keyword: &str,
        page: u32,
        items_per_page: u32,
    ) -> Result<KeywordPage, SearchError> {
        self.keyword_calls.fetch_add(1, Ordering::SeqCst);
        let matched: Vec<CompanyRecord> = self
            .companies
            .iter()
            .filter(|c| {
                c.company_name
                    .to_lowercase()
                    .contains(&keyword.to_lowercase())
            })
            .map(|c| {
                let mut record = c.clone();
                // The keyword endpoint never reports SIC codes.
                record.sic_codes = Vec::new();
                record
            })
            .collect();

        let start = ((page - 1) * items_per_page) as usize;
        let items = matched
            .iter()
            .skip(start)
            .take(items_per_page as usize)
            .cloned()
            .collect();
        Ok(KeywordPage {
            items,
            total_results: matched.len() as i64,
        })
    }

    async fn advanced_search(
        &self,
        filters: &SearchFilters,
        start_index: u32,
        size: u32,
    ) -> Result<AdvancedPage, SearchError> {
        self.advanced_calls.fetch_add(1, Ordering::SeqCst);
        if !self.advanced_available {
            return Err(SearchError::CapabilityUnavailable);
        }

        let matched: Vec<CompanyRecord> = self
            .companies
            .iter()
            .filter(|c| Self::upstream_matches(filters, c))
            .cloned()
            .collect();

        let items = matched
            .iter()
            .skip(start_index as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Ok(AdvancedPage {
            items,
            hits: matched.len() as i64,
        })
    }

    async fn company_profile(&self, company_number: &str) -> Result<CompanyRecord, SearchError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.companies
            .iter()
            .find(|c| c.company_number == company_number)
            .cloned()
            .ok_or_else(|| SearchError::Upstream {
                status: 404,
                message: format!("company {company_number} not found"),
            })
    }

    async fn company_officers(&self, company_number: &str) -> Result<OfficerList, SearchError> {
        self.officer_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .officer_lists
            .get(company_number)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct MemorySnapshots {
    stored: Mutex<HashMap<String, (SearchFilters, Vec<CompanyRecord>)>>,
}

impl MemorySnapshots {
    fn len(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn store(
        &self,
        token: &str,
        filters: &SearchFilters,
        items: &[CompanyRecord],
    ) -> Result<(), SearchError> {
        self.stored
            .lock()
            .unwrap()
            .insert(token.to_string(), (filters.clone(), items.to_vec()));
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<StoredSnapshot, SearchError> {
        let stored = self.stored.lock().unwrap();
        let (filters, items) = stored
            .get(token)
            .ok_or_else(|| SearchError::SnapshotNotFound(token.to_string()))?;
        Ok(StoredSnapshot {
            token: token.to_string(),
            filters: filters.clone(),
            items: items.clone(),
            created_at: String::new(),
        })
    }
}

fn tuning() -> SearchConfig {
    SearchConfig {
        batch_delay_ms: 0,
        ..Default::default()
    }
}

fn build_service(
    registry: Arc<MockRegistry>,
    snapshots: Arc<MemorySnapshots>,
    tuning: SearchConfig,
) -> SearchService {
    SearchService::new(
        registry,
        Arc::new(ResultCache::new(None)),
        snapshots,
        tuning,
    )
}

#[tokio::test]
async fn direct_path_never_fetches_profiles_or_officers() {
    let registry = Arc::new(MockRegistry::new(vec![
        company("00000001", "ACME TRADING LTD", "active"),
        company("00000002", "ACME HOLDINGS LTD", "active"),
    ]));
    let service = build_service(registry.clone(), Arc::new(MemorySnapshots::default()), tuning());

    let filters = SearchFilters {
        keyword: Some("acme".to_string()),
        company_status: Some(vec!["active".to_string()]),
        sic: Some(vec!["620".to_string()]),
        ..Default::default()
    };

    let outcome = service
        .resolve(&filters, 1, 20, None, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.total, 2);
    assert_eq!(registry.advanced_calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.profile_calls.load(Ordering::SeqCst), 0);
    assert_eq!(registry.officer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn forty_five_active_matches_paginate_to_twenty() {
    let companies: Vec<CompanyRecord> = (0..45)
        .map(|i| company(&format!("{i:08}"), &format!("ACME {i} LTD"), "active"))
        .collect();
    let registry = Arc::new(MockRegistry::new(companies));
    let snapshots = Arc::new(MemorySnapshots::default());
    let service = build_service(registry, snapshots.clone(), tuning());

    let filters = SearchFilters {
        keyword: Some("acme".to_string()),
        company_status: Some(vec!["active".to_string()]),
        ..Default::default()
    };

    let first = service
        .resolve(&filters, 1, 20, None, &CancelToken::new())
        .await
        .unwrap();
    let second = service
        .resolve(&filters, 1, 20, None, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(first.total, 45);
    assert_eq!(first.items.len(), 20);
    assert!(!first.truncated);
    assert!(!first.token.is_empty());
    // Identical searches get distinct snapshots, never content-derived ids.
    assert_ne!(first.token, second.token);
    assert_eq!(snapshots.len(), 2);
}

#[tokio::test]
async fn officer_filter_keeps_only_qualifying_companies_and_reports_progress() {
    let companies: Vec<CompanyRecord> = (0..12)
        .map(|i| company(&format!("{i:08}"), &format!("HOLDING {i} LTD"), "active"))
        .collect();
    let mut registry = MockRegistry::new(companies);
    // Three companies have an active officer born before 1950; one red
    // herring has a resigned officer born in 1940.
    registry
        .officer_lists
        .insert("00000002".to_string(), officers(vec![active_officer(1949)]));
    registry
        .officer_lists
        .insert("00000005".to_string(), officers(vec![active_officer(1930)]));
    registry
        .officer_lists
        .insert("00000009".to_string(), officers(vec![active_officer(1910)]));
    let mut resigned = active_officer(1940);
    resigned.resigned_on = NaiveDate::from_ymd_opt(2000, 1, 1);
    registry
        .officer_lists
        .insert("00000011".to_string(), officers(vec![resigned]));

    let registry = Arc::new(registry);
    let snapshots = Arc::new(MemorySnapshots::default());
    let service = build_service(registry.clone(), snapshots.clone(), tuning());

    let filters = SearchFilters {
        officer_birth_year: Some(1950),
        ..Default::default()
    };

    let events: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let progress = move |processed: usize, total: usize| {
        events_clone.lock().unwrap().push((processed, total));
    };

    let outcome = service
        .resolve(&filters, 1, 50, Some(&progress), &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.total, 3);
    let numbers: Vec<&str> = outcome
        .items
        .iter()
        .map(|c| c.company_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["00000002", "00000005", "00000009"]);

    let events = events.lock().unwrap();
    assert_eq!(events.last(), Some(&(12, 12)));
    assert!(events.windows(2).all(|w| w[0].0 <= w[1].0));

    // The snapshot holds the full filtered collection.
    let snapshot_items = snapshots
        .load(&outcome.token)
        .await
        .unwrap()
        .items;
    assert_eq!(snapshot_items.len(), 3);
}

#[tokio::test]
async fn identical_searches_resolve_identically() {
    let companies: Vec<CompanyRecord> = (0..30)
        .map(|i| company(&format!("{i:08}"), &format!("NORTHERN {i} LTD"), "active"))
        .collect();
    let registry = Arc::new(MockRegistry::new(companies));
    let service = build_service(registry, Arc::new(MemorySnapshots::default()), tuning());

    // Postcode forces the local-scan path, so pagination runs on the
    // locally filtered collection.
    let filters = SearchFilters {
        keyword: Some("northern".to_string()),
        postcode_prefix: Some("EC1".to_string()),
        ..Default::default()
    };

    let first = service
        .resolve(&filters, 2, 10, None, &CancelToken::new())
        .await
        .unwrap();
    let second = service
        .resolve(&filters, 2, 10, None, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(first.total, second.total);
    assert_eq!(first.items, second.items);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].company_number, "00000010");
}

#[tokio::test]
async fn out_of_range_page_returns_empty_items_with_total() {
    let registry = Arc::new(MockRegistry::new(vec![
        company("00000001", "TRIO ONE LTD", "active"),
        company("00000002", "TRIO TWO LTD", "active"),
        company("00000003", "TRIO THREE LTD", "active"),
    ]));
    let service = build_service(registry, Arc::new(MemorySnapshots::default()), tuning());

    let filters = SearchFilters {
        keyword: Some("trio".to_string()),
        postcode_prefix: Some("EC".to_string()),
        ..Default::default()
    };

    let outcome = service
        .resolve(&filters, 1000, 20, None, &CancelToken::new())
        .await
        .unwrap();

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.total, 3);
}

#[tokio::test]
async fn candidate_ceiling_marks_outcome_truncated() {
    let companies: Vec<CompanyRecord> = (0..25)
        .map(|i| company(&format!("{i:08}"), &format!("BULK {i} LTD"), "active"))
        .collect();
    let registry = Arc::new(MockRegistry::new(companies));
    let service = build_service(
        registry,
        Arc::new(MemorySnapshots::default()),
        SearchConfig {
            candidate_ceiling: 10,
            scan_page_size: 10,
            batch_delay_ms: 0,
            ..Default::default()
        },
    );

    let filters = SearchFilters {
        postcode_prefix: Some("EC1".to_string()),
        ..Default::default()
    };

    let outcome = service
        .resolve(&filters, 1, 50, None, &CancelToken::new())
        .await
        .unwrap();

    assert!(outcome.truncated);
    assert_eq!(outcome.total, 10);
}

#[tokio::test]
async fn keyword_fallback_enriches_profiles_for_sic_filter() {
    let mut sixty_two = company("00000001", "FALLBACK SOFTWARE LTD", "active");
    sixty_two.sic_codes = vec!["62010".to_string()];
    let mut retail = company("00000002", "FALLBACK RETAIL LTD", "active");
    retail.sic_codes = vec!["47110".to_string()];

    let mut registry = MockRegistry::new(vec![sixty_two, retail]);
    registry.advanced_available = false;
    let registry = Arc::new(registry);
    let service = build_service(registry.clone(), Arc::new(MemorySnapshots::default()), tuning());

    let filters = SearchFilters {
        keyword: Some("fallback".to_string()),
        sic: Some(vec!["620".to_string()]),
        ..Default::default()
    };

    let outcome = service
        .resolve(&filters, 1, 20, None, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.items[0].company_number, "00000001");
    assert!(registry.keyword_calls.load(Ordering::SeqCst) > 0);
    assert!(registry.profile_calls.load(Ordering::SeqCst) > 0);
}

#[tokio::test]
async fn keyword_fallback_without_keyword_propagates_capability_error() {
    let mut registry = MockRegistry::new(vec![company("00000001", "ANY LTD", "active")]);
    registry.advanced_available = false;
    let registry = Arc::new(registry);
    let service = build_service(registry, Arc::new(MemorySnapshots::default()), tuning());

    let filters = SearchFilters {
        company_status: Some(vec!["active".to_string()]),
        ..Default::default()
    };

    let err = service
        .resolve(&filters, 1, 20, None, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::CapabilityUnavailable));
}

#[tokio::test]
async fn empty_filter_set_is_rejected() {
    let registry = Arc::new(MockRegistry::new(Vec::new()));
    let service = build_service(registry, Arc::new(MemorySnapshots::default()), tuning());

    let err = service
        .resolve(&SearchFilters::default(), 1, 20, None, &CancelToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidFilters(_)));
}

#[tokio::test]
async fn cancelled_search_produces_no_snapshot() {
    let companies: Vec<CompanyRecord> = (0..5)
        .map(|i| company(&format!("{i:08}"), &format!("SLOW {i} LTD"), "active"))
        .collect();
    let registry = Arc::new(MockRegistry::new(companies));
    let snapshots = Arc::new(MemorySnapshots::default());
    let service = build_service(registry, snapshots.clone(), tuning());

    let filters = SearchFilters {
        officer_birth_year: Some(1950),
        ..Default::default()
    };

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = service
        .resolve(&filters, 1, 20, None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Cancelled));
    assert_eq!(snapshots.len(), 0);
}
