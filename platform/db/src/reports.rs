use chrono::{DateTime, Utc};
use products_crm::report::{self, FunnelStats, OverdueCustomer};
use products_crm::{Advice, Customer, ScoreBreakdown, SlaStatus, advisor, scoring, sla};
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::DbResult;
use crate::customers::{list_customers, load_customer};
use crate::funnels::{list_funnels, load_funnel};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageAverage {
    pub stage: String,
    pub average_hours: f64,
    pub sla_hours: u32,
    pub conversion_target: Option<u8>,
}

/// Dashboard view of one funnel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunnelReport {
    pub name: String,
    pub stages: String,
    #[serde(flatten)]
    pub stats: FunnelStats,
    pub stage_averages: Vec<StageAverage>,
}

#[instrument(name = "crm.reports.funnel", skip_all, fields(owner = %owner_id, funnel = %funnel_id))]
pub async fn funnel_report<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    funnel_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<FunnelReport> {
    let funnel = load_funnel(db, owner_id, funnel_id).await?;
    let customers = list_customers(db, owner_id, Some(funnel_id)).await?;
    let stats = FunnelStats::compute(&funnel, &customers, now);
    let stage_averages = report::average_hours_per_stage(&funnel, &customers, now)
        .into_iter()
        .map(|(stage, average_hours)| StageAverage {
            sla_hours: funnel.sla_for(&stage),
            conversion_target: funnel.conversion_for(&stage),
            stage,
            average_hours,
        })
        .collect();
    Ok(FunnelReport {
        name: funnel.name.clone(),
        stages: funnel.stages_display(),
        stats,
        stage_averages,
    })
}

/// Every breached customer across the owner's active funnels, most overdue
/// first. Customers in deactivated funnels are not reported.
#[instrument(name = "crm.reports.overdue", skip_all, fields(owner = %owner_id))]
pub async fn overdue_customers<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<Vec<OverdueCustomer>> {
    let funnels = list_funnels(db, owner_id, true).await?;
    let customers = list_customers(db, owner_id, None).await?;
    let overdue = report::overdue_customers(&funnels, &customers, now);
    info!(
        scanned = customers.len(),
        overdue = overdue.len(),
        "overdue scan finished"
    );
    Ok(overdue)
}

/// One customer with its SLA standing, suggested next action and score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomerInsight {
    pub customer: Customer,
    pub sla: SlaStatus,
    pub advice: Advice,
    /// One-line rendering of `advice`, e.g. `[HIGH] Get in touch: ...`.
    pub next_step: String,
    pub score: ScoreBreakdown,
}

#[instrument(
    name = "crm.reports.customer",
    skip_all,
    fields(owner = %owner_id, customer = %customer_id)
)]
pub async fn customer_insight<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<CustomerInsight> {
    let customer = load_customer(db, owner_id, customer_id).await?;
    let funnel = load_funnel(db, owner_id, customer.funnel_id).await?;
    let sla = sla::evaluate(&funnel, &customer, now);
    let advice = advisor::advise_from(&funnel, &customer.stage, &sla);
    let score = scoring::score_from(&funnel, &customer, &sla);
    Ok(CustomerInsight {
        customer,
        sla,
        next_step: advice.summary(),
        advice,
        score,
    })
}
