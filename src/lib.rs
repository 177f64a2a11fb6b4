//! Skill tree state engine.
//!
//! Unlock propagation over skill forests, node-count aggregation across
//! mounted trees, and a cross-tree filter index for live search.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_render;
pub mod util;

pub use application::services::{
    handler_fn, FilterIndex, SaveHandler, SharedFilterIndex, SkillTreeGroup, TreeSession,
};
pub use domain::{
    count_nodes, propagate, NodeCountRegistry, NodeState, Requirement, SavedData, Skill,
    SkillTree, StorageHandle,
};
