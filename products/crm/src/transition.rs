use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};
use crate::funnel::Funnel;
use crate::interaction::ActivityResult;
use crate::pipeline::Customer;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    StageChange,
    TaskMove,
    Call,
    Email,
    Meeting,
    Proposal,
    Contract,
    Visit,
    Note,
    Whatsapp,
    Other,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::StageChange => "stage_change",
            ActivityKind::TaskMove => "task_move",
            ActivityKind::Call => "call",
            ActivityKind::Email => "email",
            ActivityKind::Meeting => "meeting",
            ActivityKind::Proposal => "proposal",
            ActivityKind::Contract => "contract",
            ActivityKind::Visit => "visit",
            ActivityKind::Note => "note",
            ActivityKind::Whatsapp => "whatsapp",
            ActivityKind::Other => "other",
        }
    }
}

/// One row of a customer's activity trail. The caller persists it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub actor_id: Uuid,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub result: Option<ActivityResult>,
    pub duration_minutes: Option<u32>,
    pub task_id: Option<Uuid>,
    pub meta: Value,
    pub occurred_at: DateTime<Utc>,
}

/// Outcome of a successful [`move_stage`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageTransition {
    pub customer_id: Uuid,
    pub from_funnel_id: Uuid,
    pub to_funnel_id: Uuid,
    pub from_stage: String,
    pub to_stage: String,
    pub at: DateTime<Utc>,
    pub activity: ActivityEntry,
}

impl StageTransition {
    pub fn changed_funnel(&self) -> bool {
        self.from_funnel_id != self.to_funnel_id
    }
}

/// Moves `customer` into `to_stage` of `destination`, reassigning the funnel
/// when it differs from the current one. The customer is left untouched when
/// the stage is not part of the destination funnel.
pub fn move_stage(
    customer: &mut Customer,
    destination: &Funnel,
    to_stage: &str,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> CrmResult<StageTransition> {
    if !destination.contains_stage(to_stage) {
        return Err(CrmError::UnknownStage {
            stage: to_stage.to_string(),
            funnel: destination.name.clone(),
        });
    }

    let from_stage = std::mem::replace(&mut customer.stage, to_stage.to_string());
    let from_funnel_id = customer.funnel_id;
    customer.funnel_id = destination.id;
    customer.stage_entered_at = now;

    debug!(
        customer = %customer.id,
        from = %from_stage,
        to = %to_stage,
        funnel = %destination.id,
        "customer stage moved"
    );

    let activity = stage_change_activity(customer.id, &from_stage, to_stage, actor_id, now);
    Ok(StageTransition {
        customer_id: customer.id,
        from_funnel_id,
        to_funnel_id: destination.id,
        from_stage,
        to_stage: to_stage.to_string(),
        at: now,
        activity,
    })
}

fn stage_change_activity(
    customer_id: Uuid,
    from: &str,
    to: &str,
    actor_id: Uuid,
    at: DateTime<Utc>,
) -> ActivityEntry {
    ActivityEntry {
        id: Uuid::new_v4(),
        customer_id,
        actor_id,
        kind: ActivityKind::StageChange,
        title: format!("Moved from {from} to {to}"),
        description: "Stage changed from the pipeline board".to_string(),
        result: None,
        duration_minutes: None,
        task_id: None,
        meta: json!({ "from": from, "to": to }),
        occurred_at: at,
    }
}
