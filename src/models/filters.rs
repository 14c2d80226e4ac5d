use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::company::CompanyRecord;
use crate::sic;

/// Declarative filter set accepted by the search endpoint. All fields are
/// optional; [`SearchFilters::validate`] rejects the fully-empty case and
/// inverted date ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub keyword: Option<String>,
    pub company_status: Option<Vec<String>>,
    pub company_type: Option<Vec<String>>,
    /// SIC code prefixes; a company matches when any of its codes
    /// starts with any prefix.
    pub sic: Option<Vec<String>>,
    pub incorporated_from: Option<NaiveDate>,
    pub incorporated_to: Option<NaiveDate>,
    pub postcode_prefix: Option<String>,
    pub locality: Option<String>,
    /// Matches companies with at least one active officer born strictly
    /// before this year. Cannot be expressed upstream; always forces the
    /// officer enrichment pass.
    pub officer_birth_year: Option<i32>,
}

impl SearchFilters {
    #[must_use]
    pub const fn requires_officer_pass(&self) -> bool {
        self.officer_birth_year.is_some()
    }

    /// True when no field at all is set, keyword included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyword.is_none()
            && self.company_status.is_none()
            && self.company_type.is_none()
            && self.sic.is_none()
            && self.incorporated_from.is_none()
            && self.incorporated_to.is_none()
            && self.postcode_prefix.is_none()
            && self.locality.is_none()
            && self.officer_birth_year.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err(
                "at least one filter or a keyword is required; broad unfiltered searches are not supported"
                    .to_string(),
            );
        }

        if let (Some(from), Some(to)) = (self.incorporated_from, self.incorporated_to)
            && from > to
        {
            return Err("incorporated_from must not be after incorporated_to".to_string());
        }

        if let Some(year) = self.officer_birth_year
            && !(1500..=2100).contains(&year)
        {
            return Err(format!("officer_birth_year {year} is out of range"));
        }

        Ok(())
    }

    /// Local predicate over a company record, covering every filter except
    /// the officer constraint (which needs the officer list, not the
    /// record). Records from the keyword endpoint carry no SIC codes, so
    /// callers must enrich before applying a SIC filter through this.
    #[must_use]
    pub fn matches_record(&self, company: &CompanyRecord) -> bool {
        if let Some(statuses) = &self.company_status
            && !statuses.is_empty()
            && !statuses.iter().any(|s| s == &company.status)
        {
            return false;
        }

        if let Some(types) = &self.company_type
            && !types.is_empty()
            && !types.iter().any(|t| t == &company.company_type)
        {
            return false;
        }

        if let Some(prefixes) = &self.sic
            && !prefixes.is_empty()
            && !sic::matches_any_prefix(&company.sic_codes, prefixes)
        {
            return false;
        }

        if self.incorporated_from.is_some() || self.incorporated_to.is_some() {
            let Some(date) = company.incorporation_date else {
                return false;
            };
            if self.incorporated_from.is_some_and(|from| date < from) {
                return false;
            }
            if self.incorporated_to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(prefix) = &self.postcode_prefix {
            let Some(postcode) = &company.registered_office.postal_code else {
                return false;
            };
            if !postcode
                .to_uppercase()
                .starts_with(&prefix.to_uppercase())
            {
                return false;
            }
        }

        if let Some(needle) = &self.locality {
            let Some(locality) = &company.registered_office.locality else {
                return false;
            };
            if !locality.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        true
    }
}
