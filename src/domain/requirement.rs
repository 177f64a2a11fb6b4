//! Unlock requirements and the points ledger they are evaluated against

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::Skill;

/// Node-local rule deciding eligibility independent of ancestors.
///
/// ```toml
/// requirement = { type = "skill_points", skill = "squat", min = 2 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// Trivially satisfied
    #[default]
    Always,
    /// Total points spent anywhere in the tree
    TreePoints { min: u32 },
    /// Points spent on one specific skill
    SkillPoints { skill: String, min: u32 },
    /// Every nested rule holds (empty: true)
    All { of: Vec<Requirement> },
    /// At least one nested rule holds (empty: false)
    Any { of: Vec<Requirement> },
}

impl Requirement {
    pub fn evaluate(&self, ledger: &PointsLedger) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::TreePoints { min } => ledger.total() >= *min,
            Requirement::SkillPoints { skill, min } => ledger.points(skill) >= *min,
            Requirement::All { of } => of.iter().all(|r| r.evaluate(ledger)),
            Requirement::Any { of } => of.iter().any(|r| r.evaluate(ledger)),
        }
    }
}

/// Seam between unlock propagation and whatever decides a node's own requirement.
pub trait RequirementCheck {
    fn is_satisfied(&self, skill: &Skill) -> bool;
}

impl<F> RequirementCheck for F
where
    F: Fn(&Skill) -> bool,
{
    fn is_satisfied(&self, skill: &Skill) -> bool {
        self(skill)
    }
}

/// Points spent per skill id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsLedger {
    points: BTreeMap<String, u32>,
}

impl PointsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self, skill_id: &str) -> u32 {
        self.points.get(skill_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.points.values().sum()
    }

    /// Setting zero removes the entry.
    pub fn set(&mut self, skill_id: &str, points: u32) {
        if points == 0 {
            self.points.remove(skill_id);
        } else {
            self.points.insert(skill_id.to_string(), points);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.points.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl RequirementCheck for PointsLedger {
    fn is_satisfied(&self, skill: &Skill) -> bool {
        skill.requirement.evaluate(self)
    }
}
