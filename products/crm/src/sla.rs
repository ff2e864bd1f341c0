//! Stage deadline evaluation. Breaches are computed lazily on read; nothing
//! here sweeps or schedules.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::funnel::Funnel;
use crate::pipeline::{Customer, hours_between};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SlaStatus {
    pub within_sla: bool,
    /// `sla_hours - hours_in_stage`; negative once breached.
    pub hours_remaining: f64,
    pub hours_in_stage: f64,
    pub sla_hours: u32,
}

impl SlaStatus {
    /// Zero-hour SLAs never expire.
    pub fn has_deadline(&self) -> bool {
        self.sla_hours > 0
    }

    pub fn is_breached(&self) -> bool {
        !self.within_sla
    }

    /// Hours past the deadline, if breached.
    pub fn breach_hours(&self) -> Option<f64> {
        self.is_breached().then(|| self.hours_remaining.abs())
    }
}

pub fn evaluate(funnel: &Funnel, customer: &Customer, now: DateTime<Utc>) -> SlaStatus {
    evaluate_stage(funnel, &customer.stage, customer.stage_entered_at, now)
}

pub fn evaluate_stage(
    funnel: &Funnel,
    stage: &str,
    entered_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> SlaStatus {
    let sla_hours = funnel.sla_for(stage);
    let hours_in_stage = hours_between(entered_at, now);
    let sla = f64::from(sla_hours);
    SlaStatus {
        within_sla: sla_hours == 0 || hours_in_stage <= sla,
        hours_remaining: sla - hours_in_stage,
        hours_in_stage,
        sla_hours,
    }
}
