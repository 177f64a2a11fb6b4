//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::requirement::Requirement;

fn default_max_points() -> u32 {
    1
}

/// One unlockable node of a skill tree.
///
/// A skill owns its children exclusively, so a forest of `Skill`s is a strict
/// tree per root as long as ids are not repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub requirement: Requirement,
    /// Points the skill can absorb before it is fully selected
    #[serde(default = "default_max_points")]
    pub max_points: u32,
    /// Searchable labels; when empty the title is searched instead
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Skill>,
}

impl Skill {
    /// Leaf skill with the given id and title, no requirement, one point.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            requirement: Requirement::Always,
            max_points: default_max_points(),
            labels: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Skill>) -> Self {
        self.children = children;
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_points(mut self, max_points: u32) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Terms this skill contributes to the filter index.
    ///
    /// Labels win over the title. A skill with neither contributes nothing.
    pub fn search_terms(&self) -> Vec<&str> {
        if !self.labels.is_empty() {
            return self.labels.iter().map(String::as_str).collect();
        }
        if self.title.trim().is_empty() {
            Vec::new()
        } else {
            vec![self.title.as_str()]
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.title, self.id)
        }
    }
}

/// A named forest of skills, the unit that gets mounted, counted and indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTree {
    pub tree_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether a presentation layer may collapse this tree; never read by the engine
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl SkillTree {
    pub fn new(tree_id: impl Into<String>, skills: Vec<Skill>) -> Self {
        Self {
            tree_id: tree_id.into(),
            title: String::new(),
            description: None,
            collapsible: false,
            skills,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Display state of one skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Locked,
    Unlocked,
    /// Unlocked and holding at least one point
    Selected,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Locked => "locked",
            NodeState::Unlocked => "unlocked",
            NodeState::Selected => "selected",
        };
        write!(f, "{}", s)
    }
}

/// Persisted state of a single skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillState {
    pub node_state: NodeState,
    #[serde(default)]
    pub points: u32,
}

/// Prior unlock/points state of one tree, keyed by skill id.
pub type SavedData = BTreeMap<String, SkillState>;

/// Opaque storage selector passed through to save handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageHandle {
    #[default]
    Local,
    Session,
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageHandle::Local => write!(f, "local"),
            StorageHandle::Session => write!(f, "session"),
        }
    }
}
