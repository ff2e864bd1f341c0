//! CRM persistence on top of sea-orm. Every operation is scoped to an owner;
//! records belonging to someone else behave as if they did not exist.

mod activities;
mod convert;
mod customers;
mod funnels;
mod notes;
mod reports;
mod seed;
mod tags;
mod tasks;

use products_crm::CrmError;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub use activities::{customer_activities, log_activity, task_activities};
pub use customers::{create_customer, list_customers, load_customer, move_customer_stage};
pub use funnels::{create_funnel, list_funnels, load_funnel, save_funnel};
pub use notes::{add_note, customer_notes, delete_note, edit_note, load_note, pin_note};
pub use reports::{
    CustomerInsight, FunnelReport, StageAverage, customer_insight, funnel_report, overdue_customers,
};
pub use seed::{SeedSummary, seed_demo};
pub use tags::{create_tag, customer_tags, list_tags, tag_customer, untag_customer};
pub use tasks::{create_task, list_tasks, load_task, set_task_status, toggle_task};

/// Shared connection handle.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing")]
    MissingUrl,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("stored record is invalid: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Domain(#[from] CrmError),
    #[error(transparent)]
    Db(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default)]
    url: Option<String>,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            url: None,
        }
    }

    pub fn from_env() -> Self {
        Self::new(default_url_key())
    }

    /// Settings pinned to a literal URL, bypassing the environment.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            env_key: default_url_key(),
            url: Some(url.into()),
        }
    }

    pub fn database_url(&self) -> DbResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl)
    }
}

pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    let pool = Database::connect(&url).await?;
    info!(backend = ?pool.get_database_backend(), "database connected");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_url_wins_over_env() {
        let settings = DatabaseSettings::with_url("sqlite::memory:");
        assert_eq!(settings.database_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn missing_env_key_reports_missing_url() {
        let settings = DatabaseSettings::new("CRM_TEST_DATABASE_URL_THAT_IS_NEVER_SET");
        assert!(matches!(settings.database_url(), Err(DbError::MissingUrl)));
    }
}
