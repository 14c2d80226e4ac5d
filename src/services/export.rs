use std::sync::Arc;

use crate::models::company::CompanyRecord;
use crate::services::SearchError;
use crate::services::snapshots::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub struct ExportFile {
    pub content_type: &'static str,
    pub filename: String,
    pub body: String,
}

/// Re-exports a stored search snapshot as a downloadable file. The token
/// is the only handle; once the snapshot's retention window closes this
/// fails the same way as an unknown token.
pub struct ExportService {
    snapshots: Arc<dyn SnapshotStore>,
}

impl ExportService {
    #[must_use]
    pub fn new(snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self { snapshots }
    }

    pub async fn export(
        &self,
        token: &str,
        format: ExportFormat,
    ) -> Result<ExportFile, SearchError> {
        let snapshot = self.snapshots.load(token).await?;

        match format {
            ExportFormat::Csv => Ok(ExportFile {
                content_type: "text/csv",
                filename: format!("companies-{token}.csv"),
                body: to_csv(&snapshot.items),
            }),
            ExportFormat::Json => Ok(ExportFile {
                content_type: "application/json",
                filename: format!("companies-{token}.json"),
                body: serde_json::to_string_pretty(&snapshot.items)
                    .map_err(|e| SearchError::Snapshot(e.to_string()))?,
            }),
        }
    }
}

fn to_csv(items: &[CompanyRecord]) -> String {
    let mut out = String::from(
        "company_number,company_name,status,type,incorporation_date,sic_codes,locality,postal_code\n",
    );

    for item in items {
        let row = [
            item.company_number.clone(),
            item.company_name.clone(),
            item.status.clone(),
            item.company_type.clone(),
            item.incorporation_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            item.sic_codes.join(";"),
            item.registered_office.locality.clone().unwrap_or_default(),
            item.registered_office
                .postal_code
                .clone()
                .unwrap_or_default(),
        ];
        let encoded: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&encoded.join(","));
        out.push('\n');
    }

    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::RegisteredOffice;

    fn record() -> CompanyRecord {
        CompanyRecord {
            company_number: "01234567".to_string(),
            company_name: "WIDGETS, BOLTS \"AND\" MORE LTD".to_string(),
            status: "active".to_string(),
            company_type: "ltd".to_string(),
            incorporation_date: chrono::NaiveDate::from_ymd_opt(2003, 11, 20),
            registered_office: RegisteredOffice {
                locality: Some("Leeds".to_string()),
                postal_code: Some("LS1 4AP".to_string()),
                region: None,
                country: None,
            },
            sic_codes: vec!["62010".to_string(), "62020".to_string()],
        }
    }

    #[test]
    fn csv_quotes_embedded_commas_and_quotes() {
        let csv = to_csv(&[record()]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "company_number,company_name,status,type,incorporation_date,sic_codes,locality,postal_code"
        );
        assert_eq!(
            lines.next().unwrap(),
            "01234567,\"WIDGETS, BOLTS \"\"AND\"\" MORE LTD\",active,ltd,2003-11-20,62010;62020,Leeds,LS1 4AP"
        );
    }

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("xml"), None);
    }
}
