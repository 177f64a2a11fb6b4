//! Mount/unmount orchestration for a group of trees
//!
//! Mounting a tree opens its session, adds its node count to the group's
//! aggregation registry and indexes it for search, all before `mount`
//! returns. Unmounting undoes the three steps before `unmount` returns.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument};

use crate::application::services::filter_index::SharedFilterIndex;
use crate::application::services::session::{SaveHandler, TreeSession};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeCountRegistry, SavedData, SkillTree, StorageHandle};

#[derive(Debug)]
pub struct SkillTreeGroup {
    index: SharedFilterIndex,
    counts: NodeCountRegistry,
    sessions: BTreeMap<String, TreeSession>,
}

impl SkillTreeGroup {
    /// Group feeding the given filter index, usually `SharedFilterIndex::global()`.
    pub fn new(index: SharedFilterIndex) -> Self {
        Self {
            index,
            counts: NodeCountRegistry::new(),
            sessions: BTreeMap::new(),
        }
    }

    /// Mount a tree, replacing any tree already mounted under the same id.
    ///
    /// A malformed tree fails before anything is registered.
    #[instrument(level = "debug", skip_all, fields(tree_id = %tree.tree_id))]
    pub fn mount(
        &mut self,
        tree: SkillTree,
        saved_data: Option<SavedData>,
        storage: StorageHandle,
        handler: Option<Box<dyn SaveHandler>>,
    ) -> ApplicationResult<()> {
        let tree_id = tree.tree_id.clone();
        let session = TreeSession::new(tree, saved_data, storage, handler)?;

        let count = self
            .counts
            .add_contribution(&tree_id, &session.tree().skills)?;
        self.index.register(&tree_id, &session.tree().skills)?;
        self.sessions.insert(tree_id.clone(), session);
        info!("mounted {} ({} skills)", tree_id, count);
        Ok(())
    }

    /// Returns false if nothing was mounted under `tree_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn unmount(&mut self, tree_id: &str) -> bool {
        if self.sessions.remove(tree_id).is_none() {
            return false;
        }
        // The index may be shared; only drop what this group registered
        self.counts.remove_contribution(tree_id);
        self.index.unregister(tree_id);
        debug!("unmounted {}", tree_id);
        true
    }

    pub fn total_count(&self) -> usize {
        self.counts.total()
    }

    pub fn count_of(&self, tree_id: &str) -> Option<usize> {
        self.counts.contribution(tree_id)
    }

    /// Skills holding points across all mounted trees.
    pub fn selected_count(&self) -> usize {
        self.sessions.values().map(TreeSession::selected_count).sum()
    }

    /// Mounted trees matching `term`; an empty term shows them all.
    pub fn visible(&self, term: &str) -> BTreeSet<String> {
        self.index
            .query(term)
            .into_iter()
            .filter(|id| self.sessions.contains_key(id))
            .collect()
    }

    pub fn session(&self, tree_id: &str) -> Option<&TreeSession> {
        self.sessions.get(tree_id)
    }

    pub fn session_mut(&mut self, tree_id: &str) -> ApplicationResult<&mut TreeSession> {
        self.sessions
            .get_mut(tree_id)
            .ok_or_else(|| ApplicationError::UnknownTree(tree_id.to_string()))
    }

    /// Reset every mounted tree in id order, stopping at the first save error.
    #[instrument(level = "debug", skip(self))]
    pub fn reset_all(&mut self) -> ApplicationResult<()> {
        for session in self.sessions.values_mut() {
            session.reset()?;
        }
        Ok(())
    }

    pub fn tree_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn index(&self) -> &SharedFilterIndex {
        &self.index
    }
}
