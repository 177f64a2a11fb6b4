//! Per-tree session state
//!
//! A session owns the points spent in one mounted tree, keeps the unlock
//! flags consistent with them and reports every change to an optional save
//! handler.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument, warn};

use crate::application::error::SaveError;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    propagate, DomainError, NodeState, PointsLedger, SavedData, SkillArena, SkillState, SkillTree,
    StorageHandle,
};

/// Receives the full state of a tree after every change.
///
/// Errors are handed back to whoever triggered the change; the session does
/// not retry.
pub trait SaveHandler {
    fn save(
        &self,
        storage: StorageHandle,
        tree_id: &str,
        state: &SavedData,
    ) -> Result<(), SaveError>;
}

impl<F> SaveHandler for F
where
    F: Fn(StorageHandle, &str, &SavedData) -> Result<(), SaveError>,
{
    fn save(
        &self,
        storage: StorageHandle,
        tree_id: &str,
        state: &SavedData,
    ) -> Result<(), SaveError> {
        self(storage, tree_id, state)
    }
}

/// Box a closure as a save handler.
pub fn handler_fn<F>(f: F) -> Box<dyn SaveHandler>
where
    F: Fn(StorageHandle, &str, &SavedData) -> Result<(), SaveError> + 'static,
{
    Box::new(f)
}

/// State holder for exactly one tree instance.
pub struct TreeSession {
    tree: SkillTree,
    arena: SkillArena,
    ledger: PointsLedger,
    unlocked: BTreeMap<String, bool>,
    storage: StorageHandle,
    handler: Option<Box<dyn SaveHandler>>,
}

impl fmt::Debug for TreeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSession")
            .field("tree_id", &self.tree.tree_id)
            .field("ledger", &self.ledger)
            .field("storage", &self.storage)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl TreeSession {
    /// Open a session, seeding points from `saved_data`.
    ///
    /// Saved entries for unknown skills are dropped, points are clamped to
    /// `max_points`, and unlock flags are always recomputed. Creation does not
    /// call the save handler.
    #[instrument(level = "debug", skip_all, fields(tree_id = %tree.tree_id))]
    pub fn new(
        tree: SkillTree,
        saved_data: Option<SavedData>,
        storage: StorageHandle,
        handler: Option<Box<dyn SaveHandler>>,
    ) -> ApplicationResult<Self> {
        let arena = SkillArena::from_forest(&tree.skills)?;
        let mut ledger = PointsLedger::new();

        for (skill_id, state) in saved_data.unwrap_or_default() {
            let Some(skill) = arena.skill(&skill_id) else {
                warn!("dropping saved state for unknown skill {}", skill_id);
                continue;
            };
            let points = if state.points == 0 && state.node_state == NodeState::Selected {
                1
            } else {
                state.points
            };
            ledger.set(&skill_id, points.min(skill.max_points));
        }

        let mut session = Self {
            tree,
            arena,
            ledger,
            unlocked: BTreeMap::new(),
            storage,
            handler,
        };
        session.recompute()?;
        Ok(session)
    }

    /// Re-derive unlock flags; locked skills give their points back until stable.
    fn recompute(&mut self) -> ApplicationResult<()> {
        loop {
            self.unlocked = propagate(&self.tree.skills, &self.ledger)?;
            let stale: Vec<String> = self
                .ledger
                .iter()
                .filter(|(id, _)| !self.is_unlocked(id))
                .map(|(id, _)| id.to_string())
                .collect();
            if stale.is_empty() {
                return Ok(());
            }
            for id in stale {
                debug!("refunding points of locked skill {}", id);
                self.ledger.set(&id, 0);
            }
        }
    }

    /// Apply a mutation, recompute, and notify the handler if anything changed.
    fn commit<F>(&mut self, mutate: F) -> ApplicationResult<()>
    where
        F: FnOnce(&mut PointsLedger),
    {
        let before = self.state();
        mutate(&mut self.ledger);
        self.recompute()?;
        let after = self.state();
        if after != before {
            self.save(&after)?;
        }
        Ok(())
    }

    fn save(&self, state: &SavedData) -> ApplicationResult<()> {
        if let Some(handler) = &self.handler {
            debug!("saving {} skills of {}", state.len(), self.tree.tree_id);
            handler
                .save(self.storage, &self.tree.tree_id, state)
                .map_err(|source| ApplicationError::Save {
                    tree_id: self.tree.tree_id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn require_skill(&self, skill_id: &str) -> ApplicationResult<u32> {
        self.arena
            .skill(skill_id)
            .map(|s| s.max_points)
            .ok_or_else(|| DomainError::UnknownSkill(skill_id.to_string()).into())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_point(&mut self, skill_id: &str) -> ApplicationResult<u32> {
        let max_points = self.require_skill(skill_id)?;
        if !self.is_unlocked(skill_id) {
            return Err(DomainError::SkillLocked(skill_id.to_string()).into());
        }
        let points = self.ledger.points(skill_id);
        if points >= max_points {
            return Err(DomainError::MaxPointsReached {
                skill_id: skill_id.to_string(),
                max_points,
            }
            .into());
        }
        self.commit(|ledger| ledger.set(skill_id, points + 1))?;
        Ok(self.points(skill_id))
    }

    /// Take one point back; descendants that lose eligibility are refunded.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_point(&mut self, skill_id: &str) -> ApplicationResult<u32> {
        self.require_skill(skill_id)?;
        let points = self.ledger.points(skill_id);
        if points == 0 {
            return Err(DomainError::NoPointsToRemove(skill_id.to_string()).into());
        }
        self.commit(|ledger| ledger.set(skill_id, points - 1))?;
        Ok(self.points(skill_id))
    }

    /// Fill a skill up to its maximum points.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, skill_id: &str) -> ApplicationResult<()> {
        let max_points = self.require_skill(skill_id)?;
        if !self.is_unlocked(skill_id) {
            return Err(DomainError::SkillLocked(skill_id.to_string()).into());
        }
        self.commit(|ledger| ledger.set(skill_id, max_points))
    }

    /// Drop all points of a skill.
    #[instrument(level = "debug", skip(self))]
    pub fn deselect(&mut self, skill_id: &str) -> ApplicationResult<()> {
        self.require_skill(skill_id)?;
        self.commit(|ledger| ledger.set(skill_id, 0))
    }

    #[instrument(level = "debug", skip(self), fields(tree_id = %self.tree.tree_id))]
    pub fn reset(&mut self) -> ApplicationResult<()> {
        self.commit(PointsLedger::clear)
    }

    pub fn is_unlocked(&self, skill_id: &str) -> bool {
        self.unlocked.get(skill_id).copied().unwrap_or(false)
    }

    /// None for ids that are not part of the tree.
    pub fn node_state(&self, skill_id: &str) -> Option<NodeState> {
        if !self.arena.contains(skill_id) {
            return None;
        }
        let state = if !self.is_unlocked(skill_id) {
            NodeState::Locked
        } else if self.ledger.points(skill_id) > 0 {
            NodeState::Selected
        } else {
            NodeState::Unlocked
        };
        Some(state)
    }

    pub fn points(&self, skill_id: &str) -> u32 {
        self.ledger.points(skill_id)
    }

    /// Full state of every skill, as handed to the save handler.
    pub fn state(&self) -> SavedData {
        self.arena
            .iter()
            .map(|(_, node)| {
                let id = &node.skill.id;
                let node_state = self.node_state(id).unwrap_or_default();
                let points = self.ledger.points(id);
                (id.clone(), SkillState { node_state, points })
            })
            .collect()
    }

    /// Number of skills holding points.
    pub fn selected_count(&self) -> usize {
        self.ledger.iter().count()
    }

    pub fn total_points(&self) -> u32 {
        self.ledger.total()
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn tree_id(&self) -> &str {
        &self.tree.tree_id
    }

    pub fn tree(&self) -> &SkillTree {
        &self.tree
    }

    pub fn arena(&self) -> &SkillArena {
        &self.arena
    }

    pub fn storage(&self) -> StorageHandle {
        self.storage
    }
}
