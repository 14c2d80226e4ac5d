use reqwest::StatusCode;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::config::RegistryConfig;
use crate::models::company::{
    CompanyRecord, DateOfBirth, OfficerList, OfficerRecord, RegisteredOffice,
};
use crate::models::filters::SearchFilters;
use crate::services::SearchError;

/// One page of keyword search results, in upstream order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordPage {
    pub items: Vec<CompanyRecord>,
    pub total_results: i64,
}

/// One page of advanced search results plus the upstream hit count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedPage {
    pub items: Vec<CompanyRecord>,
    pub hits: i64,
}

/// The four upstream operations the engine needs. Implemented by
/// [`CompaniesHouseClient`]; tests substitute their own doubles.
#[async_trait::async_trait]
pub trait RegistryClient: Send + Sync {
    async fn search_companies(
        &self,
        keyword: &str,
        page: u32,
        items_per_page: u32,
    ) -> Result<KeywordPage, SearchError>;

    async fn advanced_search(
        &self,
        filters: &SearchFilters,
        start_index: u32,
        size: u32,
    ) -> Result<AdvancedPage, SearchError>;

    async fn company_profile(&self, company_number: &str) -> Result<CompanyRecord, SearchError>;

    async fn company_officers(&self, company_number: &str) -> Result<OfficerList, SearchError>;
}

pub struct CompaniesHouseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CompaniesHouseClient {
    #[must_use]
    pub fn new(config: &RegistryConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key().unwrap_or_default(),
        }
    }

    /// Issues a GET with the registry credential attached. On a 429 the
    /// call sleeps for the advertised `Retry-After` and retries exactly
    /// once; a second 429 propagates to the caller.
    async fn get(&self, path_and_query: &str) -> Result<reqwest::Response, SearchError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let mut retried = false;

        loop {
            metrics::counter!("regscout_upstream_requests_total").increment(1);

            // Basic auth is attached per request builder, so nothing at the
            // transport layer can override or drop the credential.
            let response = self
                .client
                .get(&url)
                .basic_auth(&self.api_key, Some(""))
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| SearchError::Upstream {
                    status: 500,
                    message: e.to_string(),
                })?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if retried {
                    return Err(SearchError::Upstream {
                        status: 429,
                        message: "registry rate limit exceeded".to_string(),
                    });
                }
                let wait = parse_retry_after(response.headers().get(RETRY_AFTER));
                warn!("Registry rate limit hit, retrying in {}s", wait);
                tokio::time::sleep(Duration::from_secs(wait)).await;
                retried = true;
                continue;
            }

            return Ok(response);
        }
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SearchError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl RegistryClient for CompaniesHouseClient {
    async fn search_companies(
        &self,
        keyword: &str,
        page: u32,
        items_per_page: u32,
    ) -> Result<KeywordPage, SearchError> {
        let start_index = (page.saturating_sub(1)) * items_per_page;
        let path = format!(
            "/search/companies?q={}&items_per_page={}&start_index={}",
            urlencoding::encode(keyword),
            items_per_page,
            start_index
        );

        let response = Self::ensure_success(self.get(&path).await?).await?;
        let raw: RawKeywordResponse = response.json().await.map_err(|e| SearchError::Upstream {
            status: 500,
            message: format!("malformed search response: {e}"),
        })?;

        Ok(KeywordPage {
            items: raw
                .items
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawKeywordItem::into_record)
                .collect(),
            total_results: raw.total_results.unwrap_or(0),
        })
    }

    async fn advanced_search(
        &self,
        filters: &SearchFilters,
        start_index: u32,
        size: u32,
    ) -> Result<AdvancedPage, SearchError> {
        let mut query = vec![format!("size={size}"), format!("start_index={start_index}")];

        // Absent filter fields are omitted entirely, never sent as empty
        // or default values.
        if let Some(keyword) = &filters.keyword {
            query.push(format!(
                "company_name_includes={}",
                urlencoding::encode(keyword)
            ));
        }
        for status in filters.company_status.iter().flatten() {
            query.push(format!("company_status={}", urlencoding::encode(status)));
        }
        for company_type in filters.company_type.iter().flatten() {
            query.push(format!("company_type={}", urlencoding::encode(company_type)));
        }
        for code in filters.sic.iter().flatten() {
            query.push(format!("sic_codes={}", urlencoding::encode(code)));
        }
        if let Some(from) = filters.incorporated_from {
            query.push(format!("incorporated_from={from}"));
        }
        if let Some(to) = filters.incorporated_to {
            query.push(format!("incorporated_to={to}"));
        }
        if let Some(locality) = &filters.locality {
            query.push(format!("location={}", urlencoding::encode(locality)));
        }

        let path = format!("/advanced-search/companies?{}", query.join("&"));
        let response = self.get(&path).await?;

        // A 404 on this endpoint means the capability itself is not
        // reachable for this credential, not that no companies matched.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SearchError::CapabilityUnavailable);
        }

        let response = Self::ensure_success(response).await?;
        let raw: RawAdvancedResponse = response.json().await.map_err(|e| SearchError::Upstream {
            status: 500,
            message: format!("malformed advanced search response: {e}"),
        })?;

        Ok(AdvancedPage {
            items: raw
                .items
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawAdvancedItem::into_record)
                .collect(),
            hits: raw.hits.unwrap_or(0),
        })
    }

    async fn company_profile(&self, company_number: &str) -> Result<CompanyRecord, SearchError> {
        let path = format!("/company/{}", urlencoding::encode(company_number));
        let response = Self::ensure_success(self.get(&path).await?).await?;
        let raw: RawProfile = response.json().await.map_err(|e| SearchError::Upstream {
            status: 500,
            message: format!("malformed company profile: {e}"),
        })?;
        Ok(raw.into_record(company_number))
    }

    async fn company_officers(&self, company_number: &str) -> Result<OfficerList, SearchError> {
        let path = format!("/company/{}/officers", urlencoding::encode(company_number));
        let response = Self::ensure_success(self.get(&path).await?).await?;
        let raw: RawOfficersResponse =
            response.json().await.map_err(|e| SearchError::Upstream {
                status: 500,
                message: format!("malformed officers response: {e}"),
            })?;

        Ok(OfficerList {
            items: raw
                .items
                .unwrap_or_default()
                .into_iter()
                .map(RawOfficer::into_record)
                .collect(),
            active_count: raw.active_count.unwrap_or(0),
            resigned_count: raw.resigned_count.unwrap_or(0),
            total_results: raw.total_results.unwrap_or(0),
        })
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> u64 {
    header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(5)
}

fn parse_date(value: Option<&str>) -> Option<chrono::NaiveDate> {
    value.and_then(|v| chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    locality: Option<String>,
    postal_code: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

impl RawAddress {
    fn into_office(self) -> RegisteredOffice {
        RegisteredOffice {
            locality: self.locality,
            postal_code: self.postal_code,
            region: self.region,
            country: self.country,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawKeywordResponse {
    items: Option<Vec<RawKeywordItem>>,
    total_results: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawKeywordItem {
    company_number: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    company_status: Option<String>,
    company_type: Option<String>,
    date_of_creation: Option<String>,
    address: Option<RawAddress>,
}

impl RawKeywordItem {
    fn into_record(self) -> Option<CompanyRecord> {
        let company_number = self.company_number?;
        Some(CompanyRecord {
            company_number,
            company_name: self.title.or(self.company_name).unwrap_or_default(),
            status: self.company_status.unwrap_or_default(),
            company_type: self.company_type.unwrap_or_default(),
            incorporation_date: parse_date(self.date_of_creation.as_deref()),
            registered_office: self.address.map(RawAddress::into_office).unwrap_or_default(),
            // The keyword endpoint never reports SIC codes; profile
            // enrichment fills these in when a SIC filter needs them.
            sic_codes: Vec::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawAdvancedResponse {
    items: Option<Vec<RawAdvancedItem>>,
    hits: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawAdvancedItem {
    company_number: Option<String>,
    company_name: Option<String>,
    company_status: Option<String>,
    company_type: Option<String>,
    date_of_creation: Option<String>,
    registered_office_address: Option<RawAddress>,
    sic_codes: Option<Vec<String>>,
}

impl RawAdvancedItem {
    fn into_record(self) -> Option<CompanyRecord> {
        let company_number = self.company_number?;
        Some(CompanyRecord {
            company_number,
            company_name: self.company_name.unwrap_or_default(),
            status: self.company_status.unwrap_or_default(),
            company_type: self.company_type.unwrap_or_default(),
            incorporation_date: parse_date(self.date_of_creation.as_deref()),
            registered_office: self
                .registered_office_address
                .map(RawAddress::into_office)
                .unwrap_or_default(),
            sic_codes: self.sic_codes.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    company_name: Option<String>,
    company_number: Option<String>,
    company_status: Option<String>,
    #[serde(rename = "type")]
    company_type: Option<String>,
    date_of_creation: Option<String>,
    registered_office_address: Option<RawAddress>,
    sic_codes: Option<Vec<String>>,
}

impl RawProfile {
    fn into_record(self, requested_number: &str) -> CompanyRecord {
        CompanyRecord {
            company_number: self
                .company_number
                .unwrap_or_else(|| requested_number.to_string()),
            company_name: self.company_name.unwrap_or_default(),
            status: self.company_status.unwrap_or_default(),
            company_type: self.company_type.unwrap_or_default(),
            incorporation_date: parse_date(self.date_of_creation.as_deref()),
            registered_office: self
                .registered_office_address
                .map(RawAddress::into_office)
                .unwrap_or_default(),
            sic_codes: self.sic_codes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOfficersResponse {
    items: Option<Vec<RawOfficer>>,
    active_count: Option<i64>,
    resigned_count: Option<i64>,
    total_results: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawOfficer {
    name: Option<String>,
    officer_role: Option<String>,
    appointed_on: Option<String>,
    resigned_on: Option<String>,
    date_of_birth: Option<RawDateOfBirth>,
    nationality: Option<String>,
    occupation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDateOfBirth {
    month: Option<u32>,
    year: Option<i32>,
}

impl RawOfficer {
    fn into_record(self) -> OfficerRecord {
        OfficerRecord {
            name: self.name.unwrap_or_default(),
            officer_role: self.officer_role.unwrap_or_default(),
            appointed_on: parse_date(self.appointed_on.as_deref()),
            resigned_on: parse_date(self.resigned_on.as_deref()),
            date_of_birth: self.date_of_birth.and_then(|dob| {
                dob.year.map(|year| DateOfBirth {
                    month: dob.month,
                    year,
                })
            }),
            nationality: self.nationality,
            occupation: self.occupation,
        }
    }
}
