use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::advisor::CRITICAL_BREACH_HOURS;
use crate::funnel::Funnel;
use crate::pipeline::Customer;
use crate::sla::{SlaStatus, evaluate};

const BASE_SCORE: i64 = 50;
const MAX_SCORE: i64 = 100;
const HIGH_VALUE_CENTS: i64 = 5_000_000;
const MID_VALUE_CENTS: i64 = 2_000_000;
const POSITION_WEIGHT: usize = 20;

/// Individual terms of a triage score, kept for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: i64,
    pub value: i64,
    pub sla: i64,
    pub position: i64,
    pub total: u8,
}

pub fn score(funnel: &Funnel, customer: &Customer, now: DateTime<Utc>) -> ScoreBreakdown {
    let status = evaluate(funnel, customer, now);
    score_from(funnel, customer, &status)
}

pub fn score_from(funnel: &Funnel, customer: &Customer, status: &SlaStatus) -> ScoreBreakdown {
    let value = match customer.estimated_value_cents {
        v if v > HIGH_VALUE_CENTS => 20,
        v if v > MID_VALUE_CENTS => 10,
        _ => 0,
    };
    let sla = match status.breach_hours() {
        Some(hours) if hours > CRITICAL_BREACH_HOURS => 30,
        Some(_) => 15,
        None => 0,
    };
    let position = position_term(funnel, &customer.stage);
    let raw = BASE_SCORE + value + sla + position;
    ScoreBreakdown {
        base: BASE_SCORE,
        value,
        sla,
        position,
        total: raw.clamp(0, MAX_SCORE) as u8,
    }
}

// floor(index / count * 20); a stage missing from the list scores nothing.
fn position_term(funnel: &Funnel, stage: &str) -> i64 {
    let count = funnel.stages().len();
    match funnel.stage_index(stage) {
        Some(index) if count > 0 => (index * POSITION_WEIGHT / count) as i64,
        _ => 0,
    }
}
