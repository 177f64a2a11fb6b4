//! Application services

pub mod filter_index;
pub mod group;
pub mod session;

pub use filter_index::{FilterIndex, SharedFilterIndex};
pub use group::SkillTreeGroup;
pub use session::{handler_fn, SaveHandler, TreeSession};
