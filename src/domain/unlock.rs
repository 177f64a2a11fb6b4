//! Unlock propagation.
//!
//! A node is unlocked iff it is a root whose own requirement holds, or its
//! parent is unlocked and its own requirement holds. Requirements below a
//! locked ancestor are never evaluated.

use std::collections::BTreeMap;

use tracing::{instrument, trace};

use crate::domain::entities::Skill;
use crate::domain::error::{DomainResult, StructuralError};
use crate::domain::requirement::RequirementCheck;

/// Unlock state of the node above the one being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentState {
    Root,
    Unlocked,
    Locked,
}

impl From<bool> for ParentState {
    fn from(unlocked: bool) -> Self {
        if unlocked {
            ParentState::Unlocked
        } else {
            ParentState::Locked
        }
    }
}

/// Decide whether a single node is unlocked given its parent's state.
pub fn is_unlocked<C>(skill: &Skill, parent: ParentState, check: &C) -> bool
where
    C: RequirementCheck + ?Sized,
{
    match parent {
        ParentState::Locked => false,
        ParentState::Root | ParentState::Unlocked => check.is_satisfied(skill),
    }
}

/// Compute the unlocked flag of every node in the forest.
///
/// A skill id reached twice fails with `DuplicateNode`, so one flag can never
/// overwrite another.
#[instrument(level = "debug", skip_all, fields(roots = forest.len()))]
pub fn propagate<C>(forest: &[Skill], check: &C) -> DomainResult<BTreeMap<String, bool>>
where
    C: RequirementCheck + ?Sized,
{
    let mut unlocked = BTreeMap::new();
    for root in forest {
        propagate_node(root, ParentState::Root, check, &mut unlocked)?;
    }
    Ok(unlocked)
}

fn record(out: &mut BTreeMap<String, bool>, skill: &Skill, state: bool) -> DomainResult<()> {
    if out.insert(skill.id.clone(), state).is_some() {
        return Err(StructuralError::DuplicateNode {
            skill_id: skill.id.clone(),
        }
        .into());
    }
    Ok(())
}

fn propagate_node<C>(
    skill: &Skill,
    parent: ParentState,
    check: &C,
    out: &mut BTreeMap<String, bool>,
) -> DomainResult<()>
where
    C: RequirementCheck + ?Sized,
{
    let state = is_unlocked(skill, parent, check);
    trace!(skill = %skill.id, ?parent, unlocked = state, "propagate");
    record(out, skill, state)?;

    if state {
        for child in &skill.children {
            propagate_node(child, ParentState::Unlocked, check, out)?;
        }
        Ok(())
    } else {
        lock_subtree(&skill.children, out)
    }
}

fn lock_subtree(children: &[Skill], out: &mut BTreeMap<String, bool>) -> DomainResult<()> {
    for child in children {
        record(out, child, false)?;
        lock_subtree(&child.children, out)?;
    }
    Ok(())
}
