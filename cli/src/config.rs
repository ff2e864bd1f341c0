use anyhow::{Context, Result};
use platform_db::DatabaseSettings;
use platform_obs::ObsConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://crm.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub log_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads `.env` (when present) and then the process environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err).context("failed to read .env"),
        }

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        if database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL is set but empty");
        }

        Ok(Self {
            database_url,
            log_filter: non_empty_var("CRM_LOG"),
            otlp_endpoint: non_empty_var("OTLP_ENDPOINT"),
        })
    }

    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings::with_url(self.database_url.clone())
    }

    pub fn observability(&self) -> ObsConfig {
        ObsConfig::default()
            .with_filter(self.log_filter.clone())
            .with_otlp_endpoint(self.otlp_endpoint.clone())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
