use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::funnel::Funnel;
use crate::pipeline::Customer;
use crate::sla::{SlaStatus, evaluate};

/// Breaches longer than this escalate to [`Priority::Critical`].
pub const CRITICAL_BREACH_HOURS: f64 = 72.0;
/// Remaining margin below which a customer needs watching.
pub const LOW_MARGIN_HOURS: f64 = 12.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    MarkAsWon,
    UrgentContactOrMarkLost,
    Contact,
    Monitor,
    RoutineFollowUp,
}

impl SuggestedAction {
    pub fn label(self) -> &'static str {
        match self {
            SuggestedAction::MarkAsWon => "Mark as won",
            SuggestedAction::UrgentContactOrMarkLost => "Urgent contact or mark as lost",
            SuggestedAction::Contact => "Get in touch",
            SuggestedAction::Monitor => "Monitor progress",
            SuggestedAction::RoutineFollowUp => "Routine follow-up",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Advice {
    pub priority: Priority,
    pub action: SuggestedAction,
    pub detail: String,
}

impl Advice {
    /// One-line rendering, e.g. `[HIGH] Get in touch: Overdue by 2 hours`.
    pub fn summary(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.priority.as_str(),
            self.action.label(),
            self.detail
        )
    }
}

pub fn advise(funnel: &Funnel, customer: &Customer, now: DateTime<Utc>) -> Advice {
    let status = evaluate(funnel, customer, now);
    advise_from(funnel, &customer.stage, &status)
}

/// Fixed decision table; the first matching rule wins.
pub fn advise_from(funnel: &Funnel, stage: &str, status: &SlaStatus) -> Advice {
    if funnel.is_terminal(stage) {
        return Advice {
            priority: Priority::High,
            action: SuggestedAction::MarkAsWon,
            detail: "Customer reached the last stage of the funnel".to_string(),
        };
    }

    if let Some(overdue) = status.breach_hours() {
        let (priority, action) = if overdue > CRITICAL_BREACH_HOURS {
            (Priority::Critical, SuggestedAction::UrgentContactOrMarkLost)
        } else {
            (Priority::High, SuggestedAction::Contact)
        };
        return Advice {
            priority,
            action,
            detail: format!("Overdue by {overdue:.0} hours"),
        };
    }

    let remaining = status.hours_remaining;
    if status.has_deadline() && remaining < LOW_MARGIN_HOURS {
        return Advice {
            priority: Priority::Medium,
            action: SuggestedAction::Monitor,
            detail: format!("Deadline in {remaining:.0} hours"),
        };
    }

    let detail = if status.has_deadline() {
        format!("{remaining:.0} hours left before the deadline")
    } else {
        "Stage has no deadline".to_string()
    };
    Advice {
        priority: Priority::Low,
        action: SuggestedAction::RoutineFollowUp,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn funnel() -> Funnel {
        let mut funnel = Funnel::new(
            Uuid::new_v4(),
            "F",
            vec!["A".into(), "B".into(), "C".into()],
        )
        .unwrap();
        funnel.set_sla("A", 0).unwrap();
        funnel
    }

    fn status(sla_hours: u32, hours_in_stage: f64) -> SlaStatus {
        let sla = f64::from(sla_hours);
        SlaStatus {
            within_sla: sla_hours == 0 || hours_in_stage <= sla,
            hours_remaining: sla - hours_in_stage,
            hours_in_stage,
            sla_hours,
        }
    }

    #[test]
    fn terminal_stage_wins_over_breach() {
        let advice = advise_from(&funnel(), "C", &status(24, 500.0));
        assert_eq!(advice.priority, Priority::High);
        assert_eq!(advice.action, SuggestedAction::MarkAsWon);
    }

    #[test]
    fn breach_severity() {
        let critical = advise_from(&funnel(), "B", &status(24, 104.0));
        assert_eq!(critical.priority, Priority::Critical);
        assert_eq!(critical.action, SuggestedAction::UrgentContactOrMarkLost);
        assert_eq!(critical.detail, "Overdue by 80 hours");
        assert_eq!(
            critical.summary(),
            "[CRITICAL] Urgent contact or mark as lost: Overdue by 80 hours"
        );

        let high = advise_from(&funnel(), "B", &status(24, 34.0));
        assert_eq!(high.priority, Priority::High);
        assert_eq!(high.action, SuggestedAction::Contact);

        let edge = advise_from(&funnel(), "B", &status(24, 96.0));
        assert_eq!(edge.priority, Priority::High);
    }

    #[test]
    fn margin_and_routine() {
        let medium = advise_from(&funnel(), "B", &status(24, 19.0));
        assert_eq!(medium.priority, Priority::Medium);
        assert_eq!(medium.detail, "Deadline in 5 hours");

        let low = advise_from(&funnel(), "B", &status(24, 2.0));
        assert_eq!(low.priority, Priority::Low);
        assert_eq!(low.action, SuggestedAction::RoutineFollowUp);
        assert_eq!(
            low.summary(),
            "[LOW] Routine follow-up: 22 hours left before the deadline"
        );
    }

    #[test]
    fn stage_without_deadline_is_routine() {
        let advice = advise_from(&funnel(), "A", &status(0, 1_000.0));
        assert_eq!(advice.priority, Priority::Low);
        assert_eq!(advice.detail, "Stage has no deadline");
    }

    #[test]
    fn priorities_order_by_urgency() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::Medium > Priority::Low);
    }
}
