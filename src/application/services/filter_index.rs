//! Cross-tree filter index
//!
//! Maps lowercased search tokens to the ids of the trees containing a skill
//! with that token. Matching is substring-based on the lowercased token, so
//! typing "pu" already finds trees with a "Push" skill.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, instrument};

use crate::domain::{count_nodes, DomainResult, Skill};

/// Token → tree ids, plus the reverse map needed for clean removal.
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    tokens: BTreeMap<String, BTreeSet<String>>,
    /// Every registered tree with the tokens it contributed (possibly none)
    trees: BTreeMap<String, BTreeSet<String>>,
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

fn collect_tokens(skills: &[Skill], out: &mut BTreeSet<String>) {
    for skill in skills {
        out.extend(
            skill
                .search_terms()
                .into_iter()
                .map(normalize)
                .filter(|t| !t.is_empty()),
        );
        collect_tokens(&skill.children, out);
    }
}

impl FilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every skill of the forest under `tree_id`.
    ///
    /// Prior contributions of the same id are dropped first, so the result
    /// only reflects the latest `skills`. A malformed forest is rejected and
    /// leaves the index untouched.
    #[instrument(level = "debug", skip(self, skills))]
    pub fn register(&mut self, tree_id: &str, skills: &[Skill]) -> DomainResult<()> {
        count_nodes(skills)?;
        self.unregister(tree_id);

        let mut tokens = BTreeSet::new();
        collect_tokens(skills, &mut tokens);
        for token in &tokens {
            self.tokens
                .entry(token.clone())
                .or_default()
                .insert(tree_id.to_string());
        }
        debug!("registered {} with {} tokens", tree_id, tokens.len());
        self.trees.insert(tree_id.to_string(), tokens);
        Ok(())
    }

    /// Remove `tree_id` everywhere. Returns false for unknown ids.
    #[instrument(level = "debug", skip(self))]
    pub fn unregister(&mut self, tree_id: &str) -> bool {
        let Some(tokens) = self.trees.remove(tree_id) else {
            return false;
        };
        for token in tokens {
            if let Some(ids) = self.tokens.get_mut(&token) {
                ids.remove(tree_id);
                if ids.is_empty() {
                    self.tokens.remove(&token);
                }
            }
        }
        true
    }

    /// Case-insensitive substring search; an empty term returns every tree.
    #[instrument(level = "trace", skip(self))]
    pub fn query(&self, term: &str) -> BTreeSet<String> {
        let needle = normalize(term);
        if needle.is_empty() {
            return self.trees.keys().cloned().collect();
        }
        self.tokens
            .iter()
            .filter(|(token, _)| token.contains(&needle))
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    pub fn is_visible(&self, tree_id: &str, term: &str) -> bool {
        self.is_registered(tree_id) && self.query(term).contains(tree_id)
    }

    pub fn is_registered(&self, tree_id: &str) -> bool {
        self.trees.contains_key(tree_id)
    }

    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Tree ids indexed under exactly `token` (already lowercased).
    pub fn trees_for_token(&self, token: &str) -> BTreeSet<String> {
        self.tokens.get(token).cloned().unwrap_or_default()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// Mutex-guarded handle to a filter index shared across threads.
///
/// Every call takes the lock once for its whole duration, so callers never
/// observe a half-applied registration.
#[derive(Debug, Clone, Default)]
pub struct SharedFilterIndex {
    inner: Arc<Mutex<FilterIndex>>,
}

static GLOBAL_INDEX: OnceLock<SharedFilterIndex> = OnceLock::new();

impl SharedFilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide index.
    pub fn global() -> &'static SharedFilterIndex {
        GLOBAL_INDEX.get_or_init(SharedFilterIndex::new)
    }

    fn lock(&self) -> MutexGuard<'_, FilterIndex> {
        // Operations never leave the maps half-updated, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, tree_id: &str, skills: &[Skill]) -> DomainResult<()> {
        self.lock().register(tree_id, skills)
    }

    pub fn unregister(&self, tree_id: &str) -> bool {
        self.lock().unregister(tree_id)
    }

    pub fn query(&self, term: &str) -> BTreeSet<String> {
        self.lock().query(term)
    }

    pub fn is_visible(&self, tree_id: &str, term: &str) -> bool {
        self.lock().is_visible(tree_id, term)
    }

    pub fn is_registered(&self, tree_id: &str) -> bool {
        self.lock().is_registered(tree_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current index, for inspection.
    pub fn snapshot(&self) -> FilterIndex {
        self.lock().clone()
    }
}
