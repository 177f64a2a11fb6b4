//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Malformed tree shape: the input is not a strict tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("skill appears more than once in the tree: {skill_id}")]
    DuplicateNode { skill_id: String },

    #[error("cycle detected in skill hierarchy at: {skill_id}")]
    Cycle { skill_id: String },
}

/// Domain errors represent rule violations of the tree state engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("unknown parent '{parent}' for skill '{skill_id}'")]
    UnknownParent { skill_id: String, parent: String },

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("skill is locked: {0}")]
    SkillLocked(String),

    #[error("skill '{skill_id}' already holds its maximum of {max_points} points")]
    MaxPointsReached { skill_id: String, max_points: u32 },

    #[error("skill holds no points: {0}")]
    NoPointsToRemove(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
