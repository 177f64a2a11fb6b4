use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::Skill;
use crate::domain::error::{DomainResult, StructuralError};

/// Tree node in the arena-based skill forest.
#[derive(Debug)]
pub struct SkillNode {
    /// Skill payload; its `children` are moved into the arena and left empty here
    pub skill: Skill,
    /// Index of parent node in the arena, None for roots
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in definition order
    pub children: Vec<Index>,
}

/// Arena-based flattening of a skill forest.
///
/// Uses generational arena for memory-safe node references and O(1) lookups
/// by skill id. Building it validates that the forest is a strict tree.
#[derive(Debug, Default)]
pub struct SkillArena {
    arena: Arena<SkillNode>,
    roots: Vec<Index>,
    by_id: HashMap<String, Index>,
}

impl SkillArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten `forest`, rejecting any skill id seen twice.
    #[instrument(level = "debug", skip_all, fields(roots = forest.len()))]
    pub fn from_forest(forest: &[Skill]) -> DomainResult<Self> {
        let mut tree = Self::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<(&Skill, Option<Index>)> =
            forest.iter().rev().map(|s| (s, None)).collect();

        while let Some((skill, parent_idx)) = stack.pop() {
            if !visited.insert(skill.id.clone()) {
                return Err(StructuralError::DuplicateNode {
                    skill_id: skill.id.clone(),
                }
                .into());
            }
            let payload = Skill {
                children: Vec::new(),
                ..skill.clone()
            };
            let idx = tree.insert_node(payload, parent_idx);
            // Reverse so children come off the stack left-to-right
            for child in skill.children.iter().rev() {
                stack.push((child, Some(idx)));
            }
        }

        Ok(tree)
    }

    #[instrument(level = "trace", skip(self, skill), fields(skill = %skill.id))]
    fn insert_node(&mut self, skill: Skill, parent: Option<Index>) -> Index {
        let id = skill.id.clone();
        let node = SkillNode {
            skill,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }
        self.by_id.insert(id, node_idx);

        node_idx
    }

    pub fn get(&self, idx: Index) -> Option<&SkillNode> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, skill_id: &str) -> Option<Index> {
        self.by_id.get(skill_id).copied()
    }

    pub fn skill(&self, skill_id: &str) -> Option<&Skill> {
        self.index_of(skill_id)
            .and_then(|idx| self.get(idx))
            .map(|node| &node.skill)
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.by_id.contains_key(skill_id)
    }

    pub fn parent_of(&self, skill_id: &str) -> Option<&Skill> {
        let node = self.get(self.index_of(skill_id)?)?;
        node.parent.and_then(|p| self.get(p)).map(|p| &p.skill)
    }

    /// Ids from the direct parent up to the root.
    pub fn ancestors(&self, skill_id: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self.index_of(skill_id).and_then(|i| self.get(i));
        while let Some(parent) = current.and_then(|n| n.parent).and_then(|p| self.get(p)) {
            out.push(parent.skill.id.as_str());
            current = Some(parent);
        }
        out
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal over all roots: parents always precede children.
    pub fn iter(&self) -> SkillIterator<'_> {
        SkillIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of skills without children, in pre-order.
    pub fn leaf_ids(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.skill.id.as_str())
            .collect()
    }
}

pub struct SkillIterator<'a> {
    arena: &'a SkillArena,
    stack: Vec<Index>,
}

impl<'a> SkillIterator<'a> {
    fn new(arena: &'a SkillArena) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a> Iterator for SkillIterator<'a> {
    type Item = (Index, &'a SkillNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
