//! Smoke tests for the web surface: search, export round-trip, SIC
//! autocomplete, validation failures, and health.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use regscout::clients::{AdvancedPage, KeywordPage, RegistryClient};
use regscout::config::Config;
use regscout::models::company::{CompanyRecord, OfficerList, RegisteredOffice};
use regscout::models::filters::SearchFilters;
use regscout::services::SearchError;
use regscout::state::SharedState;

struct StubRegistry {
    companies: Vec<CompanyRecord>,
    officer_lists: HashMap<String, OfficerList>,
}

#[async_trait::async_trait]
impl RegistryClient for StubRegistry {
    async fn search_companies(
        &self,
        keyword: &str,
        page: u32,
        items_per_page: u32,
    ) -> Result<KeywordPage, SearchError> {
        let matched: Vec<CompanyRecord> = self
            .companies
            .iter()
            .filter(|c| {
                c.company_name
                    .to_lowercase()
                    .contains(&keyword.to_lowercase())
            })
            .cloned()
            .collect();
        let start = ((page - 1) * items_per_page) as usize;
        Ok(KeywordPage {
            items: matched
                .iter()
                .skip(start)
                .take(items_per_page as usize)
                .cloned()
                .collect(),
            total_results: matched.len() as i64,
        })
    }

    async fn advanced_search(
        &self,
        filters: &SearchFilters,
        start_index: u32,
        size: u32,
    ) -> Result<AdvancedPage, SearchError> {
        let mut supported = filters.clone();
        supported.postcode_prefix = None;
        supported.officer_birth_year = None;
        let keyword = supported.keyword.take();

        let matched: Vec<CompanyRecord> = self
            .companies
            .iter()
            .filter(|c| {
                keyword.as_deref().is_none_or(|k| {
                    c.company_name.to_lowercase().contains(&k.to_lowercase())
                }) && supported.matches_record(c)
            })
            .cloned()
            .collect();

        Ok(AdvancedPage {
            items: matched
                .iter()
                .skip(start_index as usize)
                .take(size as usize)
                .cloned()
                .collect(),
            hits: matched.len() as i64,
        })
    }

    async fn company_profile(&self, company_number: &str) -> Result<CompanyRecord, SearchError> {
        self.companies
            .iter()
            .find(|c| c.company_number == company_number)
            .cloned()
            .ok_or_else(|| SearchError::Upstream {
                status: 404,
                message: "not found".to_string(),
            })
    }

    async fn company_officers(&self, company_number: &str) -> Result<OfficerList, SearchError> {
        Ok(self
            .officer_lists
            .get(company_number)
            .cloned()
            .unwrap_or_default())
    }
}

fn sample_companies() -> Vec<CompanyRecord> {
    (0..3)
        .map(|i| CompanyRecord {
            company_number: format!("0000000{i}"),
            company_name: format!("ACME {i} LTD"),
            status: "active".to_string(),
            company_type: "ltd".to_string(),
            incorporation_date: chrono::NaiveDate::from_ymd_opt(2012, 5, 9),
            registered_office: RegisteredOffice {
                locality: Some("Bristol".to_string()),
                postal_code: Some("BS1 4ST".to_string()),
                region: None,
                country: Some("England".to_string()),
            },
            sic_codes: vec!["62010".to_string()],
        })
        .collect()
}

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("regscout-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.search.batch_delay_ms = 0;

    let registry = Arc::new(StubRegistry {
        companies: sample_companies(),
        officer_lists: HashMap::new(),
    });

    let shared = SharedState::with_registry(config, registry)
        .await
        .expect("failed to build shared state");
    let state = regscout::api::create_app_state(Arc::new(shared), None);
    regscout::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn search_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn search_returns_page_and_token() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "filters": {"keyword": "acme", "company_status": ["active"]},
        "page": 1,
        "page_size": 2
    });
    let response = app.oneshot(search_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
    assert!(!json["data"]["result_token"].as_str().unwrap().is_empty());
    assert_eq!(json["data"]["truncated"], false);
}

#[tokio::test]
async fn search_rejects_unknown_status_value() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "filters": {"company_status": ["zombie"]}
    });
    let response = app.oneshot(search_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn search_rejects_oversized_page() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "filters": {"keyword": "acme"},
        "page_size": 500
    });
    let response = app.oneshot(search_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_round_trip_returns_csv() {
    let app = spawn_app().await;

    // Postcode forces the scan path, so the snapshot holds the full
    // filtered collection rather than the single upstream page.
    let body = serde_json::json!({
        "filters": {"keyword": "acme", "postcode_prefix": "BS"},
        "page": 1,
        "page_size": 2
    });
    let response = app
        .clone()
        .oneshot(search_request(&body))
        .await
        .unwrap();
    let json = body_json(response).await;
    let token = json["data"]["result_token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/export/{token}?format=csv"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("company_number,company_name"));
    // The export carries the full result set, not just the returned page.
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("ACME 2 LTD"));
}

#[tokio::test]
async fn export_unknown_token_is_not_found() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/export/deadbeefdeadbeefdeadbeefdeadbeef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sic_suggest_matches_keywords() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sic/suggest?q=software")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let codes: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"62010"));
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["database"], "ok");
}
