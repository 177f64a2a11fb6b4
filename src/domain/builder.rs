//! Tree builder turning flat, parent-linked skill definitions into a forest.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{Skill, SkillTree};
use crate::domain::error::{DomainError, DomainResult, StructuralError};
use crate::domain::requirement::Requirement;

fn default_max_points() -> u32 {
    1
}

/// One skill as written in a tree definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent skill id, None for roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default = "default_max_points")]
    pub max_points: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// A whole tree definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDef {
    pub tree_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub collapsible: bool,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
}

/// Constructs nested skill forests from flat definitions.
#[derive(Debug, Default)]
pub struct SkillTreeBuilder {
    defs: HashMap<String, SkillDef>,
    relationship_cache: HashMap<String, Vec<String>>,
    visited: HashSet<String>,
}

impl SkillTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `SkillTree` from its definition.
    ///
    /// Child order follows definition order. Fails on duplicate ids, unknown
    /// parents and cycles (skills that no root can reach).
    #[instrument(level = "debug", skip_all, fields(tree_id = %def.tree_id))]
    pub fn build(&mut self, def: &TreeDef) -> DomainResult<SkillTree> {
        // Reset state for a fresh build
        self.defs.clear();
        self.relationship_cache.clear();
        self.visited.clear();

        let mut root_ids = Vec::new();
        for skill in &def.skills {
            if self.defs.insert(skill.id.clone(), skill.clone()).is_some() {
                return Err(StructuralError::DuplicateNode {
                    skill_id: skill.id.clone(),
                }
                .into());
            }
        }

        for skill in &def.skills {
            match &skill.parent {
                None => root_ids.push(skill.id.clone()),
                Some(parent) if parent == &skill.id => {
                    return Err(StructuralError::Cycle {
                        skill_id: skill.id.clone(),
                    }
                    .into());
                }
                Some(parent) => {
                    if !self.defs.contains_key(parent) {
                        return Err(DomainError::UnknownParent {
                            skill_id: skill.id.clone(),
                            parent: parent.clone(),
                        });
                    }
                    self.relationship_cache
                        .entry(parent.clone())
                        .or_default()
                        .push(skill.id.clone());
                }
            }
        }

        let mut skills = Vec::with_capacity(root_ids.len());
        for root in &root_ids {
            skills.push(self.build_skill(root)?);
        }

        // Anything not reached from a root hangs off a cycle
        if let Some(orphan) = def.skills.iter().find(|s| !self.visited.contains(&s.id)) {
            return Err(StructuralError::Cycle {
                skill_id: orphan.id.clone(),
            }
            .into());
        }
        debug!("built {} roots from {} skills", skills.len(), def.skills.len());

        Ok(SkillTree {
            tree_id: def.tree_id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            collapsible: def.collapsible,
            skills,
        })
    }

    fn build_skill(&mut self, id: &str) -> DomainResult<Skill> {
        if !self.visited.insert(id.to_string()) {
            return Err(StructuralError::Cycle {
                skill_id: id.to_string(),
            }
            .into());
        }
        let def = self
            .defs
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownSkill(id.to_string()))?;
        let child_ids = self.relationship_cache.get(id).cloned().unwrap_or_default();

        let mut children = Vec::with_capacity(child_ids.len());
        for child in &child_ids {
            children.push(self.build_skill(child)?);
        }

        Ok(Skill {
            id: def.id,
            title: def.title,
            description: def.description,
            requirement: def.requirement,
            max_points: def.max_points,
            labels: def.labels,
            children,
        })
    }
}
