//! Node counting and the aggregation context shared by mounted trees

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::entities::Skill;
use crate::domain::error::{DomainResult, StructuralError};

/// Count every node reachable from the forest roots, locked or not.
///
/// Each skill id may be visited once; a repeat means the input is not a
/// strict tree and the traversal aborts.
#[instrument(level = "debug", skip_all, fields(roots = forest.len()))]
pub fn count_nodes(forest: &[Skill]) -> DomainResult<usize> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&Skill> = forest.iter().collect();

    while let Some(skill) = stack.pop() {
        if !visited.insert(skill.id.as_str()) {
            return Err(StructuralError::DuplicateNode {
                skill_id: skill.id.clone(),
            }
            .into());
        }
        stack.extend(skill.children.iter());
    }

    Ok(visited.len())
}

/// Explicit aggregation handle: one node count per contributor id.
///
/// The total is always the sum of the currently registered contributions,
/// so removing a contributor can never leave a stale count behind.
#[derive(Debug, Clone, Default)]
pub struct NodeCountRegistry {
    contributions: BTreeMap<String, usize>,
}

impl NodeCountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `forest` and record it for `contributor`, replacing any earlier
    /// contribution under the same id. On error the registry is unchanged.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn add_contribution(&mut self, contributor: &str, forest: &[Skill]) -> DomainResult<usize> {
        let count = count_nodes(forest)?;
        if let Some(previous) = self.contributions.insert(contributor.to_string(), count) {
            debug!("replaced contribution of {}: {} -> {}", contributor, previous, count);
        }
        Ok(count)
    }

    /// Unknown contributors are a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_contribution(&mut self, contributor: &str) -> Option<usize> {
        self.contributions.remove(contributor)
    }

    pub fn contribution(&self, contributor: &str) -> Option<usize> {
        self.contributions.get(contributor).copied()
    }

    pub fn total(&self) -> usize {
        self.contributions.values().sum()
    }

    pub fn contributors(&self) -> impl Iterator<Item = &str> {
        self.contributions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}
