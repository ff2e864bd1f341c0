//! Interactions a user records by hand: calls, meetings, messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};
use crate::pipeline::Customer;
use crate::transition::{ActivityEntry, ActivityKind};

/// Activity kinds a user may log. Stage and task moves are written by the
/// system only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Call,
    Email,
    Meeting,
    Proposal,
    Contract,
    Visit,
    #[default]
    Note,
    Whatsapp,
    Other,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 9] = [
        InteractionKind::Call,
        InteractionKind::Email,
        InteractionKind::Meeting,
        InteractionKind::Proposal,
        InteractionKind::Contract,
        InteractionKind::Visit,
        InteractionKind::Note,
        InteractionKind::Whatsapp,
        InteractionKind::Other,
    ];

    pub fn as_str(self) -> &'static str {
        ActivityKind::from(self).as_str()
    }
}

impl From<InteractionKind> for ActivityKind {
    fn from(value: InteractionKind) -> Self {
        match value {
            InteractionKind::Call => ActivityKind::Call,
            InteractionKind::Email => ActivityKind::Email,
            InteractionKind::Meeting => ActivityKind::Meeting,
            InteractionKind::Proposal => ActivityKind::Proposal,
            InteractionKind::Contract => ActivityKind::Contract,
            InteractionKind::Visit => ActivityKind::Visit,
            InteractionKind::Note => ActivityKind::Note,
            InteractionKind::Whatsapp => ActivityKind::Whatsapp,
            InteractionKind::Other => ActivityKind::Other,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = CrmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        InteractionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| CrmError::InvalidActivityKind(value.to_string()))
    }
}

/// How an interaction went.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityResult {
    Success,
    NoAnswer,
    Reschedule,
    Negative,
    Other,
}

impl ActivityResult {
    pub const ALL: [ActivityResult; 5] = [
        ActivityResult::Success,
        ActivityResult::NoAnswer,
        ActivityResult::Reschedule,
        ActivityResult::Negative,
        ActivityResult::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityResult::Success => "success",
            ActivityResult::NoAnswer => "no_answer",
            ActivityResult::Reschedule => "reschedule",
            ActivityResult::Negative => "negative",
            ActivityResult::Other => "other",
        }
    }
}

impl FromStr for ActivityResult {
    type Err = CrmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActivityResult::ALL
            .into_iter()
            .find(|result| result.as_str() == value)
            .ok_or_else(|| CrmError::InvalidActivityResult(value.to_string()))
    }
}

/// Input for [`log_interaction`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewInteraction {
    pub kind: InteractionKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub result: Option<ActivityResult>,
    pub duration_minutes: Option<u32>,
    pub task_id: Option<Uuid>,
    /// When the interaction happened; defaults to `now`.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Builds the activity row for a hand-logged interaction and stamps the
/// customer's last contact with `now`, whatever `occurred_at` says.
pub fn log_interaction(
    customer: &mut Customer,
    input: NewInteraction,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> CrmResult<ActivityEntry> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CrmError::BlankName("activity title"));
    }
    customer.record_contact(now);

    let entry = ActivityEntry {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        actor_id,
        kind: input.kind.into(),
        title: title.to_string(),
        description: input.description,
        result: input.result,
        duration_minutes: input.duration_minutes,
        task_id: input.task_id,
        meta: json!({ "stage": customer.stage }),
        occurred_at: input.occurred_at.unwrap_or(now),
    };
    debug!(
        customer = %customer.id,
        kind = entry.kind.as_str(),
        "interaction logged"
    );
    Ok(entry)
}
