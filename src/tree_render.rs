//! Text rendering of skill forests via termtree

use termtree::Tree;
use tracing::instrument;

use crate::application::services::TreeSession;
use crate::domain::{NodeState, Skill, SkillTree};

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

fn tree_label(tree: &SkillTree) -> String {
    if tree.title.is_empty() {
        tree.tree_id.clone()
    } else {
        format!("{} [{}]", tree.title, tree.tree_id)
    }
}

fn plain(skill: &Skill) -> Tree<String> {
    let leaves: Vec<_> = skill.children.iter().map(plain).collect();
    Tree::new(skill.to_string()).with_leaves(leaves)
}

impl TreeRender for SkillTree {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.skills.iter().map(plain).collect();
        Tree::new(tree_label(self)).with_leaves(leaves)
    }
}

fn marker(state: NodeState) -> &'static str {
    match state {
        NodeState::Locked => "[ ]",
        NodeState::Unlocked => "[o]",
        NodeState::Selected => "[x]",
    }
}

fn with_state(session: &TreeSession, skill: &Skill) -> Tree<String> {
    let state = session.node_state(&skill.id).unwrap_or_default();
    let label = if skill.max_points > 1 {
        format!(
            "{} {} {}/{}",
            marker(state),
            skill,
            session.points(&skill.id),
            skill.max_points
        )
    } else {
        format!("{} {}", marker(state), skill)
    };
    let leaves: Vec<_> = skill
        .children
        .iter()
        .map(|child| with_state(session, child))
        .collect();
    Tree::new(label).with_leaves(leaves)
}

impl TreeRender for TreeSession {
    #[instrument(level = "debug", skip(self), fields(tree_id = %self.tree_id()))]
    fn to_tree_string(&self) -> Tree<String> {
        let tree = self.tree();
        let leaves: Vec<_> = tree
            .skills
            .iter()
            .map(|skill| with_state(self, skill))
            .collect();
        Tree::new(tree_label(tree)).with_leaves(leaves)
    }
}
