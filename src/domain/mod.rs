//! Domain layer: entities and the tree state engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod count;
pub mod entities;
pub mod error;
pub mod requirement;
pub mod unlock;

pub use arena::{SkillArena, SkillNode};
pub use builder::{SkillDef, SkillTreeBuilder, TreeDef};
pub use count::{count_nodes, NodeCountRegistry};
pub use entities::*;
pub use error::{DomainError, DomainResult, StructuralError};
pub use requirement::{PointsLedger, Requirement, RequirementCheck};
pub use unlock::{is_unlocked, propagate, ParentState};
