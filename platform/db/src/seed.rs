//! Deterministic demo data: three funnels, a spread of customers at various
//! ages in their stages, and a handful of tasks. Re-running is a no-op for
//! funnels that already exist.

use chrono::{DateTime, Duration, Utc};
use entity::{customer, task};
use products_crm::{Customer, Funnel, NewCustomer, Task, TaskKind, TaskPriority, TaskStatus};
use sea_orm::TransactionTrait;
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::DbResult;
use crate::convert::{customer_active_model, task_active_model};
use crate::funnels::{find_by_name, insert_funnel};

const FUNNELS: [(&str, &str, [&str; 6]); 3] = [
    (
        "Standard Sales Funnel",
        "#007bff",
        [
            "Initial Contact",
            "Qualification",
            "Presentation",
            "Proposal",
            "Negotiation",
            "Closing",
        ],
    ),
    (
        "Enterprise Funnel",
        "#28a745",
        ["Lead", "MQL", "SQL", "Proposal", "Negotiation", "Closed"],
    ),
    (
        "B2B Funnel",
        "#dc3545",
        [
            "New",
            "In Contact",
            "Meeting Scheduled",
            "Proposal Sent",
            "Awaiting Reply",
            "Done",
        ],
    ),
];

const STAGE_SLA_HOURS: [u32; 6] = [24, 48, 72, 96, 120, 168];

const CUSTOMERS: [(&str, &str); 12] = [
    ("Joana Silva", "Tech Solutions Ltda"),
    ("Mario Santos", "Inova Digital SA"),
    ("Pedro Oliveira", "Global Comercio"),
    ("Ana Costa", "SoftTech Systems"),
    ("Carlos Souza", "AgroBrasil"),
    ("Juliana Pereira", "ConstruFort"),
    ("Fernando Lima", "HealthCare Medical"),
    ("Patricia Rocha", "EduMax"),
    ("Ricardo Alves", "Logistica Express"),
    ("Camila Martins", "Alimentos Naturais"),
    ("Lucas Ribeiro", "AutoPecas Center"),
    ("Amanda Carvalho", "Imobiliaria Horizonte"),
];

const TASK_KINDS: [TaskKind; 7] = [
    TaskKind::Call,
    TaskKind::Email,
    TaskKind::Meeting,
    TaskKind::Proposal,
    TaskKind::FollowUp,
    TaskKind::Negotiation,
    TaskKind::Visit,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub funnels: usize,
    pub customers: usize,
    pub tasks: usize,
}

#[instrument(name = "crm.seed", skip_all, fields(owner = %owner_id))]
pub async fn seed_demo(
    db: &DatabaseConnection,
    owner_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<SeedSummary> {
    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();
    let mut seeded: Vec<Customer> = Vec::new();

    for (index, (name, color, stages)) in FUNNELS.iter().enumerate() {
        if find_by_name(&txn, owner_id, name).await?.is_some() {
            info!(funnel = %name, "funnel already present, skipping");
            continue;
        }
        let funnel = demo_funnel(owner_id, name, color, stages)?;
        insert_funnel(&txn, &funnel, now).await?;
        summary.funnels += 1;

        let members = CUSTOMERS.iter().enumerate().skip(index).step_by(FUNNELS.len());
        for (offset, (person, company)) in members {
            let stage = &stages[(offset * 5 + index) % stages.len()];
            let entered_at = now - Duration::hours(offset as i64 * 17 + 6);
            let customer = Customer::new(
                owner_id,
                &funnel,
                NewCustomer {
                    name: person.to_string(),
                    stage: Some(stage.to_string()),
                    estimated_value_cents: (offset as i64 + 1) * 850_000,
                    probability: Some(10 + (offset as i64 * 7) % 81),
                    company: Some(company.to_string()),
                    email: Some(format!("customer{offset}@example.com")),
                    phone: None,
                },
                entered_at,
            )?;
            customer::Entity::insert(customer_active_model(&customer, now))
                .exec_without_returning(&txn)
                .await?;
            seeded.push(customer);
        }
    }
    summary.customers = seeded.len();

    for (index, customer) in seeded.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
        let mut follow_up = Task::new(
            owner_id,
            &format!("Follow up with {}", customer.name),
            now + Duration::days(index as i64 % 7 - 2),
        )?;
        follow_up.customer_id = Some(customer.id);
        follow_up.kind = TASK_KINDS[index % TASK_KINDS.len()];
        follow_up.priority = if index % 3 == 0 {
            TaskPriority::High
        } else {
            TaskPriority::Medium
        };
        follow_up.estimated_minutes = Some(30 + (index as u32 * 15) % 150);
        if index % 4 == 0 {
            follow_up.set_status(TaskStatus::Done, now);
        }
        task::Entity::insert(task_active_model(&follow_up, now)?)
            .exec_without_returning(&txn)
            .await?;
        summary.tasks += 1;
    }

    txn.commit().await?;
    info!(
        funnels = summary.funnels,
        customers = summary.customers,
        tasks = summary.tasks,
        "demo data seeded"
    );
    Ok(summary)
}

fn demo_funnel(owner_id: Uuid, name: &str, color: &str, stages: &[&str; 6]) -> DbResult<Funnel> {
    let stage_names = stages.iter().map(|s| s.to_string()).collect();
    let mut funnel = Funnel::new(owner_id, name, stage_names)?;
    funnel.set_color(color)?;
    for (position, stage) in stages.iter().enumerate() {
        funnel.set_sla(stage, STAGE_SLA_HOURS[position])?;
        if position + 1 < stages.len() {
            funnel.set_conversion_rate(stage, 30 + position as u8 * 10)?;
        }
    }
    Ok(funnel)
}
