use regex::Regex;
use std::sync::LazyLock;

use super::ApiError;
use crate::constants;
use crate::models::filters::SearchFilters;

const VALID_STATUSES: &[&str] = &[
    "active",
    "dissolved",
    "liquidation",
    "receivership",
    "converted-closed",
    "voluntary-arrangement",
    "insolvency-proceedings",
    "administration",
];

const VALID_TYPES: &[&str] = &[
    "ltd",
    "plc",
    "old-public-company",
    "private-unlimited",
    "private-unlimited-nsc",
    "private-limited-guarant-nsc",
    "private-limited-guarant-nsc-limited-exemption",
    "private-limited-shares-section-30-exemption",
    "llp",
    "limited-partnership",
    "scottish-partnership",
    "charitable-incorporated-organisation",
    "scottish-charitable-incorporated-organisation",
    "industrial-and-provident-society",
    "registered-society-non-jurisdiction",
    "unregistered-company",
    "uk-establishment",
    "protected-cell-company",
    "investment-company-with-variable-capital",
    "other",
];

static SIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,5}$").expect("valid SIC regex"));

static POSTCODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ]{1,8}$").expect("valid postcode regex"));

pub fn validate_pagination(page: u32, page_size: u32) -> Result<(), ApiError> {
    if page < 1 {
        return Err(ApiError::validation("page must be at least 1"));
    }
    if !(1..=constants::limits::MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "page_size must be between 1 and {}",
            constants::limits::MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

/// Shape checks on the primitive filter values. Range/logic checks (date
/// ordering, emptiness) belong to the engine and run there.
pub fn validate_search_filters(filters: &SearchFilters) -> Result<(), ApiError> {
    if let Some(keyword) = &filters.keyword
        && keyword.trim().is_empty()
    {
        return Err(ApiError::validation("keyword must not be blank"));
    }

    if let Some(statuses) = &filters.company_status {
        let invalid: Vec<&str> = statuses
            .iter()
            .map(String::as_str)
            .filter(|s| !VALID_STATUSES.contains(s))
            .collect();
        if !invalid.is_empty() {
            return Err(ApiError::validation(format!(
                "Invalid company_status values: {}",
                invalid.join(", ")
            )));
        }
    }

    if let Some(types) = &filters.company_type {
        let invalid: Vec<&str> = types
            .iter()
            .map(String::as_str)
            .filter(|t| !VALID_TYPES.contains(t))
            .collect();
        if !invalid.is_empty() {
            return Err(ApiError::validation(format!(
                "Invalid company_type values: {}",
                invalid.join(", ")
            )));
        }
    }

    if let Some(codes) = &filters.sic {
        for code in codes {
            if !SIC_PREFIX.is_match(code) {
                return Err(ApiError::validation(format!(
                    "SIC prefix '{}' must be 3 to 5 digits",
                    code
                )));
            }
        }
    }

    if let Some(prefix) = &filters.postcode_prefix
        && !POSTCODE_PREFIX.is_match(prefix)
    {
        return Err(ApiError::validation(format!(
            "Postcode prefix '{}' is not valid",
            prefix
        )));
    }

    Ok(())
}
