//! One task model for both the calendar and the CRM board.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};
use crate::transition::{ActivityEntry, ActivityKind};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CrmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| CrmError::InvalidStatus(value.to_string()))
    }
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = CrmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(CrmError::InvalidPriority(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Call,
    Email,
    Meeting,
    Proposal,
    FollowUp,
    Negotiation,
    Visit,
    Presentation,
    #[default]
    Other,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Call => "call",
            TaskKind::Email => "email",
            TaskKind::Meeting => "meeting",
            TaskKind::Proposal => "proposal",
            TaskKind::FollowUp => "follow_up",
            TaskKind::Negotiation => "negotiation",
            TaskKind::Visit => "visit",
            TaskKind::Presentation => "presentation",
            TaskKind::Other => "other",
        }
    }
}

impl FromStr for TaskKind {
    type Err = CrmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = match value {
            "call" => TaskKind::Call,
            "email" => TaskKind::Email,
            "meeting" => TaskKind::Meeting,
            "proposal" => TaskKind::Proposal,
            "follow_up" => TaskKind::FollowUp,
            "negotiation" => TaskKind::Negotiation,
            "visit" => TaskKind::Visit,
            "presentation" => TaskKind::Presentation,
            "other" => TaskKind::Other,
            other => return Err(CrmError::InvalidTaskKind(other.to_string())),
        };
        Ok(kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_minutes: Option<u32>,
    pub spent_minutes: Option<u32>,
}

impl Task {
    pub fn new(owner_id: Uuid, title: &str, due_at: DateTime<Utc>) -> CrmResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CrmError::BlankName("task title"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            customer_id: None,
            title: title.to_string(),
            description: None,
            kind: TaskKind::default(),
            status: TaskStatus::Pending,
            priority: TaskPriority::default(),
            due_at,
            completed_at: None,
            estimated_minutes: None,
            spent_minutes: None,
        })
    }

    /// The single status mutation: entering `Done` stamps `completed_at`,
    /// any other status clears it.
    pub fn set_status(&mut self, next: TaskStatus, now: DateTime<Utc>) {
        self.completed_at = next.is_done().then_some(now);
        debug!(task = %self.id, from = %self.status, to = %next, "task status changed");
        self.status = next;
    }

    /// Calendar checkbox: done tasks reopen as pending, everything else
    /// completes.
    pub fn toggle_completion(&mut self, now: DateTime<Utc>) -> TaskStatus {
        let next = if self.status.is_done() {
            TaskStatus::Pending
        } else {
            TaskStatus::Done
        };
        self.set_status(next, now);
        next
    }

    /// Board move. Returns an activity when the task belongs to a customer.
    pub fn move_to(
        &mut self,
        next: TaskStatus,
        actor_id: Uuid,
        now: DateTime<Utc>,
    ) -> Option<ActivityEntry> {
        let previous = self.status;
        self.set_status(next, now);
        let customer_id = self.customer_id?;
        Some(ActivityEntry {
            id: Uuid::new_v4(),
            customer_id,
            actor_id,
            kind: ActivityKind::TaskMove,
            title: format!("Task moved from {previous} to {next}"),
            description: format!("Task \"{}\" moved on the board", self.title),
            result: None,
            duration_minutes: None,
            task_id: Some(self.id),
            meta: json!({ "task_id": self.id, "from": previous.as_str(), "to": next.as_str() }),
            occurred_at: now,
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_done() && now > self.due_at
    }

    /// Whole days until the due date, rounded toward negative infinity, so a
    /// task due one hour ago is `-1`.
    pub fn days_until_due(&self, now: DateTime<Utc>) -> i64 {
        (self.due_at - now).num_seconds().div_euclid(86_400)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap()
    }

    fn task() -> Task {
        Task::new(Uuid::new_v4(), "Call back", now() + Duration::days(2)).unwrap()
    }

    #[test]
    fn set_status_manages_completion_stamp() {
        let mut task = task();
        task.set_status(TaskStatus::InProgress, now());
        assert_eq!(task.completed_at, None);
        task.set_status(TaskStatus::Done, now());
        assert_eq!(task.completed_at, Some(now()));
        task.set_status(TaskStatus::Cancelled, now());
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn toggle_flips_between_done_and_pending() {
        let mut task = task();
        task.set_status(TaskStatus::InProgress, now());
        assert_eq!(task.toggle_completion(now()), TaskStatus::Done);
        assert!(task.completed_at.is_some());
        assert_eq!(task.toggle_completion(now()), TaskStatus::Pending);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn move_emits_activity_only_for_linked_tasks() {
        let mut task = task();
        assert!(
            task.move_to(TaskStatus::InProgress, Uuid::new_v4(), now())
                .is_none()
        );

        let customer = Uuid::new_v4();
        task.customer_id = Some(customer);
        let activity = task
            .move_to(TaskStatus::Done, Uuid::new_v4(), now())
            .expect("linked task produces activity");
        assert_eq!(activity.customer_id, customer);
        assert_eq!(activity.kind, ActivityKind::TaskMove);
        assert_eq!(activity.task_id, Some(task.id));
        assert_eq!(activity.title, "Task moved from in_progress to done");
    }

    #[test]
    fn overdue_and_days_until_due() {
        let mut task = task();
        assert!(!task.is_overdue(now()));
        assert_eq!(task.days_until_due(now()), 2);
        let late = task.due_at + Duration::hours(1);
        assert!(task.is_overdue(late));
        assert_eq!(task.days_until_due(late), -1);
        task.set_status(TaskStatus::Done, late);
        assert!(!task.is_overdue(late));
    }

    #[test]
    fn parses_statuses() {
        assert_eq!(
            "in_progress".parse::<TaskStatus>(),
            Ok(TaskStatus::InProgress)
        );
        assert_eq!(
            "finished".parse::<TaskStatus>(),
            Err(CrmError::InvalidStatus("finished".into()))
        );
        assert_eq!("urgent".parse::<TaskPriority>(), Ok(TaskPriority::Urgent));
        assert_eq!("follow_up".parse::<TaskKind>(), Ok(TaskKind::FollowUp));
        assert_eq!(TaskKind::FollowUp.as_str(), "follow_up");
        assert_eq!(
            "lunch".parse::<TaskKind>(),
            Err(CrmError::InvalidTaskKind("lunch".into()))
        );
        assert!(Task::new(Uuid::new_v4(), "   ", now()).is_err());
    }
}
