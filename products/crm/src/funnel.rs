use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CrmError, CrmResult};

/// SLA applied to any stage without an explicit entry.
pub const DEFAULT_SLA_HOURS: u32 = 24;
/// Conversion target seeded for every non-terminal stage of a new funnel.
pub const DEFAULT_CONVERSION_RATE: u8 = 50;
pub const DEFAULT_COLOR: &str = "#007bff";

/// An owner's sales funnel: ordered stages plus per-stage SLA and conversion
/// targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funnel {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    stages: Vec<String>,
    sla_hours: BTreeMap<String, u32>,
    conversion_rates: BTreeMap<String, u8>,
    pub color: String,
    pub active: bool,
}

impl Funnel {
    /// Builds a funnel with the stock targets: every stage gets the default
    /// SLA and every stage but the last gets the default conversion rate.
    pub fn new(owner_id: Uuid, name: impl Into<String>, stages: Vec<String>) -> CrmResult<Self> {
        let sla_hours = stages
            .iter()
            .map(|stage| (stage.clone(), DEFAULT_SLA_HOURS))
            .collect();
        let conversion_rates = stages
            .iter()
            .take(stages.len().saturating_sub(1))
            .map(|stage| (stage.clone(), DEFAULT_CONVERSION_RATE))
            .collect();
        let funnel = Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            stages,
            sla_hours,
            conversion_rates,
            color: DEFAULT_COLOR.to_string(),
            active: true,
        };
        funnel.validate()?;
        Ok(funnel)
    }

    /// Rehydrates a stored funnel as-is. Stored rows predate write-time
    /// validation, so nothing is checked here; lookups fall back to defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts_unchecked(
        id: Uuid,
        owner_id: Uuid,
        name: String,
        stages: Vec<String>,
        sla_hours: BTreeMap<String, u32>,
        conversion_rates: BTreeMap<String, u8>,
        color: String,
        active: bool,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            stages,
            sla_hours,
            conversion_rates,
            color,
            active,
        }
    }

    /// Splits free text into stage names, one per line.
    pub fn parse_stage_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn sla_hours(&self) -> &BTreeMap<String, u32> {
        &self.sla_hours
    }

    pub fn conversion_rates(&self) -> &BTreeMap<String, u8> {
        &self.conversion_rates
    }

    pub fn first_stage(&self) -> Option<&str> {
        self.stages.first().map(String::as_str)
    }

    pub fn terminal_stage(&self) -> Option<&str> {
        self.stages.last().map(String::as_str)
    }

    pub fn stage_index(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }

    pub fn contains_stage(&self, stage: &str) -> bool {
        self.stage_index(stage).is_some()
    }

    pub fn is_terminal(&self, stage: &str) -> bool {
        self.terminal_stage() == Some(stage)
    }

    /// Configured SLA in hours; [`DEFAULT_SLA_HOURS`] when the stage has no
    /// entry. Zero means the stage has no deadline.
    pub fn sla_for(&self, stage: &str) -> u32 {
        self.sla_hours
            .get(stage)
            .copied()
            .unwrap_or(DEFAULT_SLA_HOURS)
    }

    pub fn conversion_for(&self, stage: &str) -> Option<u8> {
        self.conversion_rates.get(stage).copied()
    }

    pub fn stages_display(&self) -> String {
        self.stages.join(" → ")
    }

    pub fn rename(&mut self, name: impl Into<String>) -> CrmResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CrmError::BlankName("funnel name"));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_color(&mut self, color: impl Into<String>) -> CrmResult<()> {
        let color = color.into();
        validate_color(&color)?;
        self.color = color;
        Ok(())
    }

    /// Replaces the stage list. SLA and conversion entries for stages that no
    /// longer exist are dropped so the funnel stays consistent.
    pub fn set_stages(&mut self, stages: Vec<String>) -> CrmResult<()> {
        validate_stages(&self.name, &stages)?;
        let keep: HashSet<&str> = stages.iter().map(String::as_str).collect();
        self.sla_hours.retain(|stage, _| keep.contains(stage.as_str()));
        self.conversion_rates
            .retain(|stage, _| keep.contains(stage.as_str()));
        self.stages = stages;
        Ok(())
    }

    pub fn set_sla(&mut self, stage: &str, hours: u32) -> CrmResult<()> {
        self.require_stage("sla", stage)?;
        self.sla_hours.insert(stage.to_string(), hours);
        Ok(())
    }

    pub fn set_conversion_rate(&mut self, stage: &str, rate: u8) -> CrmResult<()> {
        self.require_stage("conversion rate", stage)?;
        if rate > 100 {
            return Err(CrmError::InvalidConversionRate {
                stage: stage.to_string(),
                rate,
            });
        }
        self.conversion_rates.insert(stage.to_string(), rate);
        Ok(())
    }

    pub fn clear_conversion_rate(&mut self, stage: &str) {
        self.conversion_rates.remove(stage);
    }

    /// Checks every write-time invariant: non-blank name, a non-empty list of
    /// unique stages, configured keys drawn from that list, rates within 100.
    pub fn validate(&self) -> CrmResult<()> {
        if self.name.trim().is_empty() {
            return Err(CrmError::BlankName("funnel name"));
        }
        validate_stages(&self.name, &self.stages)?;
        validate_color(&self.color)?;
        for stage in self.sla_hours.keys() {
            self.require_stage("sla", stage)?;
        }
        for (stage, rate) in &self.conversion_rates {
            self.require_stage("conversion rate", stage)?;
            if *rate > 100 {
                return Err(CrmError::InvalidConversionRate {
                    stage: stage.clone(),
                    rate: *rate,
                });
            }
        }
        Ok(())
    }

    fn require_stage(&self, setting: &'static str, stage: &str) -> CrmResult<()> {
        if self.contains_stage(stage) {
            Ok(())
        } else {
            Err(CrmError::UnknownConfiguredStage {
                setting,
                stage: stage.to_string(),
            })
        }
    }
}

fn validate_stages(funnel: &str, stages: &[String]) -> CrmResult<()> {
    if stages.is_empty() {
        return Err(CrmError::EmptyFunnel(funnel.to_string()));
    }
    let mut seen = HashSet::new();
    for stage in stages {
        if stage.trim().is_empty() {
            return Err(CrmError::BlankStage);
        }
        if !seen.insert(stage.as_str()) {
            return Err(CrmError::DuplicateStage(stage.clone()));
        }
    }
    Ok(())
}

pub(crate) fn validate_color(color: &str) -> CrmResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(CrmError::InvalidColor(color.to_string()))
    }
}
