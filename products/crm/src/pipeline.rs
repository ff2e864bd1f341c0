use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};
use crate::funnel::Funnel;

pub const DEFAULT_PROBABILITY: u8 = 50;

/// A customer (lead) sitting in exactly one stage of one funnel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub funnel_id: Uuid,
    pub name: String,
    pub stage: String,
    pub stage_entered_at: DateTime<Utc>,
    pub estimated_value_cents: i64,
    pub probability: u8,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub last_contact_at: Option<DateTime<Utc>>,
}

/// Input for [`Customer::new`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub stage: Option<String>,
    #[serde(default)]
    pub estimated_value_cents: i64,
    pub probability: Option<i64>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    /// Places a new customer in `funnel`. Without an explicit stage the
    /// customer starts in the funnel's first stage.
    pub fn new(
        owner_id: Uuid,
        funnel: &Funnel,
        input: NewCustomer,
        now: DateTime<Utc>,
    ) -> CrmResult<Self> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CrmError::BlankName("customer name"));
        }
        let stage = match input.stage.as_deref().map(str::trim) {
            Some(stage) if !stage.is_empty() => {
                if !funnel.contains_stage(stage) {
                    return Err(CrmError::UnknownStage {
                        stage: stage.to_string(),
                        funnel: funnel.name.clone(),
                    });
                }
                stage.to_string()
            }
            _ => funnel
                .first_stage()
                .ok_or_else(|| CrmError::EmptyFunnel(funnel.name.clone()))?
                .to_string(),
        };
        let probability = match input.probability {
            Some(value) => validate_probability(value)?,
            None => DEFAULT_PROBABILITY,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            funnel_id: funnel.id,
            name: name.to_string(),
            stage,
            stage_entered_at: now,
            estimated_value_cents: input.estimated_value_cents,
            probability,
            company: input.company,
            email: input.email,
            phone: input.phone,
            last_contact_at: None,
        })
    }

    /// Elapsed time in the current stage, in fractional hours.
    pub fn hours_in_stage(&self, now: DateTime<Utc>) -> f64 {
        hours_between(self.stage_entered_at, now)
    }

    /// Stamps the most recent interaction with this customer.
    pub fn record_contact(&mut self, at: DateTime<Utc>) {
        self.last_contact_at = Some(at);
    }
}

pub fn validate_probability(value: i64) -> CrmResult<u8> {
    u8::try_from(value)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or(CrmError::InvalidProbability(value))
}

pub(crate) fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}
