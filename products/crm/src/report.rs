use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::funnel::Funnel;
use crate::pipeline::Customer;
use crate::sla::evaluate;

/// Share of `entered` that made it to `advanced`, as a percentage.
pub fn conversion_rate(entered: usize, advanced: usize) -> f64 {
    if entered == 0 {
        return 0.0;
    }
    advanced as f64 / entered as f64 * 100.0
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub customers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunnelStats {
    pub funnel_id: Uuid,
    pub total_customers: usize,
    pub per_stage: Vec<StageCount>,
    pub overdue_customers: usize,
    pub overdue_rate: f64,
}

impl FunnelStats {
    /// Customers from other funnels are ignored.
    pub fn compute(funnel: &Funnel, customers: &[Customer], now: DateTime<Utc>) -> Self {
        let members: Vec<&Customer> = customers
            .iter()
            .filter(|c| c.funnel_id == funnel.id)
            .collect();
        let per_stage = funnel
            .stages()
            .iter()
            .map(|stage| StageCount {
                stage: stage.clone(),
                customers: members.iter().filter(|c| &c.stage == stage).count(),
            })
            .collect();
        let overdue = members
            .iter()
            .filter(|c| evaluate(funnel, c, now).is_breached())
            .count();
        Self {
            funnel_id: funnel.id,
            total_customers: members.len(),
            per_stage,
            overdue_customers: overdue,
            overdue_rate: conversion_rate(members.len(), overdue),
        }
    }
}

/// Mean time already spent by the customers currently in each stage; stages
/// with nobody in them report zero.
pub fn average_hours_per_stage(
    funnel: &Funnel,
    customers: &[Customer],
    now: DateTime<Utc>,
) -> Vec<(String, f64)> {
    funnel
        .stages()
        .iter()
        .map(|stage| {
            let hours: Vec<f64> = customers
                .iter()
                .filter(|c| c.funnel_id == funnel.id && &c.stage == stage)
                .map(|c| c.hours_in_stage(now))
                .collect();
            let avg = if hours.is_empty() {
                0.0
            } else {
                hours.iter().sum::<f64>() / hours.len() as f64
            };
            (stage.clone(), avg)
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverdueCustomer {
    pub customer_id: Uuid,
    pub funnel_id: Uuid,
    pub name: String,
    pub stage: String,
    pub hours_overdue: f64,
    pub hours_in_stage: f64,
}

/// Every breached customer, most overdue first. Customers whose funnel is not
/// in `funnels` are skipped.
pub fn overdue_customers(
    funnels: &[Funnel],
    customers: &[Customer],
    now: DateTime<Utc>,
) -> Vec<OverdueCustomer> {
    let by_id: HashMap<Uuid, &Funnel> = funnels.iter().map(|f| (f.id, f)).collect();
    let mut overdue: Vec<OverdueCustomer> = customers
        .iter()
        .filter_map(|customer| {
            let funnel = by_id.get(&customer.funnel_id)?;
            let status = evaluate(funnel, customer, now);
            let hours_overdue = status.breach_hours()?;
            Some(OverdueCustomer {
                customer_id: customer.id,
                funnel_id: funnel.id,
                name: customer.name.clone(),
                stage: customer.stage.clone(),
                hours_overdue,
                hours_in_stage: status.hours_in_stage,
            })
        })
        .collect();
    overdue.sort_by(|a, b| b.hours_overdue.total_cmp(&a.hours_overdue));
    overdue
}
