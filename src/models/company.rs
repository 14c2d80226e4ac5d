use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical company shape used everywhere past the client boundary.
/// `company_number` is the stable registry identifier and the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_number: String,
    pub company_name: String,
    pub status: String,
    pub company_type: String,
    pub incorporation_date: Option<NaiveDate>,
    pub registered_office: RegisteredOffice,
    /// Empty when the source endpoint does not report SIC codes
    /// (keyword search results omit them; profiles carry them).
    pub sic_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredOffice {
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRecord {
    pub name: String,
    pub officer_role: String,
    pub appointed_on: Option<NaiveDate>,
    /// Present when the officer has resigned; active officers carry `None`.
    pub resigned_on: Option<NaiveDate>,
    /// The registry redacts day-of-month; some filings redact it entirely.
    pub date_of_birth: Option<DateOfBirth>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth {
    pub month: Option<u32>,
    pub year: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerList {
    pub items: Vec<OfficerRecord>,
    pub active_count: i64,
    pub resigned_count: i64,
    pub total_results: i64,
}

impl OfficerList {
    /// True if any officer with no resignation date has a known birth year
    /// strictly before `year`.
    #[must_use]
    pub fn has_active_officer_born_before(&self, year: i32) -> bool {
        self.items.iter().any(|officer| {
            officer.resigned_on.is_none()
                && officer.date_of_birth.is_some_and(|dob| dob.year < year)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn officer(resigned: Option<&str>, birth_year: Option<i32>) -> OfficerRecord {
        OfficerRecord {
            name: "SMITH, Jane".to_string(),
            officer_role: "director".to_string(),
            appointed_on: NaiveDate::from_ymd_opt(2010, 1, 4),
            resigned_on: resigned.and_then(|d| d.parse().ok()),
            date_of_birth: birth_year.map(|year| DateOfBirth {
                month: Some(6),
                year,
            }),
            nationality: Some("British".to_string()),
            occupation: Some("Director".to_string()),
        }
    }

    #[test]
    fn active_officer_before_threshold_matches() {
        let list = OfficerList {
            items: vec![officer(None, Some(1948))],
            active_count: 1,
            resigned_count: 0,
            total_results: 1,
        };
        assert!(list.has_active_officer_born_before(1950));
        assert!(!list.has_active_officer_born_before(1948));
    }

    #[test]
    fn resigned_officers_are_ignored() {
        let list = OfficerList {
            items: vec![officer(Some("2019-03-01"), Some(1940))],
            active_count: 0,
            resigned_count: 1,
            total_results: 1,
        };
        assert!(!list.has_active_officer_born_before(1950));
    }

    #[test]
    fn redacted_birth_year_never_matches() {
        let list = OfficerList {
            items: vec![officer(None, None)],
            active_count: 1,
            resigned_count: 0,
            total_results: 1,
        };
        assert!(!list.has_active_officer_born_before(2100));
    }
}
