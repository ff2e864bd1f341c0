use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesGoal {
    pub name: String,
    pub period: GoalPeriod,
    pub target_cents: i64,
    pub current_cents: i64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl SalesGoal {
    pub fn new(
        name: impl Into<String>,
        period: GoalPeriod,
        target_cents: i64,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
    ) -> CrmResult<Self> {
        if ends_on <= starts_on {
            return Err(CrmError::InvalidGoalWindow);
        }
        Ok(Self {
            name: name.into(),
            period,
            target_cents,
            current_cents: 0,
            starts_on,
            ends_on,
        })
    }

    pub fn percent_achieved(&self) -> f64 {
        if self.target_cents == 0 {
            return 0.0;
        }
        self.current_cents as f64 / self.target_cents as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn window_must_move_forward() {
        assert_eq!(
            SalesGoal::new("Q1", GoalPeriod::Quarterly, 100, day(5), day(5)),
            Err(CrmError::InvalidGoalWindow)
        );
    }

    #[test]
    fn percent_achieved() {
        let mut goal =
            SalesGoal::new("Jan", GoalPeriod::Monthly, 400_000, day(1), day(31)).unwrap();
        goal.current_cents = 100_000;
        assert_eq!(goal.percent_achieved(), 25.0);
        goal.target_cents = 0;
        assert_eq!(goal.percent_achieved(), 0.0);
    }
}
