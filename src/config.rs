use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub registry: RegistryConfig,

    pub search: SearchConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    pub database_path: String,

    pub max_db_connections: u32,

    pub min_db_connections: u32,

    /// 0 lets tokio pick the worker count.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            database_path: "sqlite:data/regscout.db".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,

    /// Usually left unset here and supplied via `REGSCOUT_API_KEY` (or
    /// the legacy `CH_API_KEY`) so the credential stays out of the file.
    pub api_key: Option<String>,

    pub timeout_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.company-information.service.gov.uk".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("REGSCOUT_API_KEY").ok())
            .or_else(|| std::env::var("CH_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hard cap on candidates collected for locally-filtered scans.
    pub candidate_ceiling: usize,

    pub scan_page_size: u32,

    pub profile_batch_size: usize,

    pub officer_batch_size: usize,

    /// Pause between enrichment batches, to stay under the registry's
    /// rate limits. A throughput knob, not a correctness requirement.
    pub batch_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_ceiling: constants::scan::CANDIDATE_CEILING,
            scan_page_size: constants::scan::SCAN_PAGE_SIZE,
            profile_batch_size: constants::scan::PROFILE_BATCH_SIZE,
            officer_batch_size: constants::scan::OFFICER_BATCH_SIZE,
            batch_delay_ms: constants::scan::BATCH_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when it is absent. `.env` is read first so the API key
    /// can be provided out of band.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = Path::new("config.toml");
        if path.exists() {
            let raw = std::fs::read_to_string(path).context("Failed to read config.toml")?;
            toml::from_str(&raw).context("Failed to parse config.toml")
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry.base_url.is_empty() {
            anyhow::bail!("registry.base_url must not be empty");
        }
        if self.search.scan_page_size == 0 || self.search.candidate_ceiling == 0 {
            anyhow::bail!("search scan settings must be non-zero");
        }
        if self.registry.resolved_api_key().is_none() {
            warn!(
                "No registry API key configured; set REGSCOUT_API_KEY or registry.api_key. \
                 Upstream calls will be rejected."
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scan_constants() {
        let config = Config::default();
        assert_eq!(config.search.candidate_ceiling, 5000);
        assert_eq!(config.search.profile_batch_size, 5);
        assert_eq!(config.search.officer_batch_size, 10);
        assert_eq!(config.search.batch_delay_ms, 200);
        assert_eq!(config.registry.timeout_seconds, 30);
    }

    #[test]
    fn partial_toml_fills_missing_sections() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.search.scan_page_size, 100);
    }

    #[test]
    fn zero_scan_settings_fail_validation() {
        let mut config = Config::default();
        config.search.candidate_ceiling = 0;
        assert!(config.validate().is_err());
    }
}
