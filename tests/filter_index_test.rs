//! Tests for the cross-tree filter index

use std::collections::BTreeSet;
use std::thread;

use rstest::{fixture, rstest};

use skilltree::application::services::{FilterIndex, SharedFilterIndex};
use skilltree::domain::{DomainError, Skill, StructuralError};

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[fixture]
fn push_skills() -> Vec<Skill> {
    vec![Skill::new("bench", "Bench Press")
        .with_labels(["Push", "Chest"])
        .with_children(vec![Skill::new("dips", "Dips")])]
}

#[fixture]
fn pull_skills() -> Vec<Skill> {
    vec![Skill::new("row", "Row").with_children(vec![Skill::new("pullup", "Pull-up")])]
}

#[rstest]
fn given_registered_tree_when_querying_label_case_insensitively_then_tree_is_found(
    push_skills: Vec<Skill>,
) {
    let mut index = FilterIndex::new();
    index.register("tree-a", &push_skills).unwrap();

    assert!(index.query("push").contains("tree-a"));
    assert!(index.query("PUSH").contains("tree-a"));
}

#[rstest]
fn given_registered_tree_when_unregistered_then_query_no_longer_finds_it(push_skills: Vec<Skill>) {
    let mut index = FilterIndex::new();
    index.register("tree-a", &push_skills).unwrap();

    assert!(index.unregister("tree-a"));

    assert!(!index.query("push").contains("tree-a"));
    assert!(!index.is_registered("tree-a"));
    assert_eq!(index.tokens().count(), 0, "empty tokens are pruned");
}

#[rstest]
fn given_partial_term_when_querying_then_matches_by_substring(
    push_skills: Vec<Skill>,
    pull_skills: Vec<Skill>,
) {
    let mut index = FilterIndex::new();
    index.register("push", &push_skills).unwrap();
    index.register("pull", &pull_skills).unwrap();

    assert_eq!(index.query("pu"), ids(&["pull", "push"]));
    assert_eq!(index.query("  Pull"), ids(&["pull"]));
    assert_eq!(index.query("dip"), ids(&["push"]));
}

#[rstest]
fn given_nested_skill_when_registering_then_descendants_are_indexed(pull_skills: Vec<Skill>) {
    let mut index = FilterIndex::new();
    index.register("pull", &pull_skills).unwrap();

    assert_eq!(index.trees_for_token("pull-up"), ids(&["pull"]));
}

#[rstest]
fn given_labels_when_registering_then_title_is_not_indexed(push_skills: Vec<Skill>) {
    let mut index = FilterIndex::new();
    index.register("push", &push_skills).unwrap();

    assert!(index.query("bench").is_empty());
    assert!(index.query("chest").contains("push"));
}

#[rstest]
fn given_several_trees_when_querying_empty_term_then_returns_all_registered(
    push_skills: Vec<Skill>,
    pull_skills: Vec<Skill>,
) {
    let mut index = FilterIndex::new();
    index.register("push", &push_skills).unwrap();
    index.register("pull", &pull_skills).unwrap();
    index.register("empty", &[]).unwrap();

    let _ = index.query("push");
    assert_eq!(index.query(""), ids(&["empty", "pull", "push"]));
    assert_eq!(index.query("   "), ids(&["empty", "pull", "push"]));
}

#[rstest]
fn given_reregistration_when_skills_changed_then_stale_tokens_are_gone(
    push_skills: Vec<Skill>,
    pull_skills: Vec<Skill>,
) {
    let mut index = FilterIndex::new();
    index.register("tree-a", &push_skills).unwrap();

    index.register("tree-a", &pull_skills).unwrap();

    assert!(index.query("push").is_empty());
    assert!(index.query("row").contains("tree-a"));
    assert_eq!(index.len(), 1);
}

#[rstest]
fn given_shared_token_when_one_tree_unregisters_then_other_keeps_token(push_skills: Vec<Skill>) {
    let mut index = FilterIndex::new();
    index.register("a", &push_skills).unwrap();
    index.register("b", &push_skills).unwrap();

    index.unregister("a");

    assert_eq!(index.query("push"), ids(&["b"]));
}

#[test]
fn given_term_without_match_when_querying_then_returns_empty_set() {
    let mut index = FilterIndex::new();
    index.register("a", &[Skill::new("s", "Squat")]).unwrap();

    assert!(index.query("deadlift").is_empty());
}

#[test]
fn given_skill_without_title_or_labels_when_registering_then_contributes_no_tokens() {
    let mut index = FilterIndex::new();
    index.register("blank", &[Skill::new("s", "")]).unwrap();

    assert_eq!(index.tokens().count(), 0);
    assert!(index.is_registered("blank"));
    assert_eq!(index.query(""), ids(&["blank"]));
}

#[test]
fn given_unknown_tree_when_unregistering_then_is_noop() {
    let mut index = FilterIndex::new();
    index.register("a", &[Skill::new("s", "Squat")]).unwrap();

    assert!(!index.unregister("ghost"));
    assert_eq!(index.query(""), ids(&["a"]));
}

#[test]
fn given_empty_forest_when_registering_then_adds_no_tokens() {
    let mut index = FilterIndex::new();
    index.register("empty", &[]).unwrap();

    assert_eq!(index.tokens().count(), 0);
    assert!(index.query("anything").is_empty());
}

#[test]
fn given_visibility_check_when_tree_matches_then_is_visible() {
    let mut index = FilterIndex::new();
    index.register("a", &[Skill::new("s", "Squat")]).unwrap();

    assert!(index.is_visible("a", "squ"));
    assert!(index.is_visible("a", ""));
    assert!(!index.is_visible("a", "bench"));
    assert!(!index.is_visible("ghost", ""));
}

#[rstest]
fn given_repeated_skill_id_when_registering_then_rejects_and_keeps_previous_tokens(
    push_skills: Vec<Skill>,
) {
    let mut index = FilterIndex::new();
    index.register("t", &push_skills).unwrap();
    let malformed = vec![Skill::new("x", "Squat"), Skill::new("x", "Squat")];

    let err = index.register("t", &malformed).unwrap_err();

    assert_eq!(
        err,
        DomainError::Structural(StructuralError::DuplicateNode {
            skill_id: "x".to_string()
        })
    );
    assert!(index.query("squat").is_empty());
    assert_eq!(index.query("push"), ids(&["t"]));
}

#[test]
fn given_malformed_forest_when_registering_new_tree_then_tree_is_not_registered() {
    let mut index = FilterIndex::new();

    assert!(index
        .register("t", &[Skill::new("x", "X"), Skill::new("x", "X")])
        .is_err());

    assert!(!index.is_registered("t"));
    assert!(index.is_empty());
}

// ============================================================
// SharedFilterIndex
// ============================================================

#[rstest]
fn given_shared_index_when_cloned_then_clones_see_same_state(push_skills: Vec<Skill>) {
    let index = SharedFilterIndex::new();
    let other = index.clone();

    index.register("a", &push_skills).unwrap();

    assert!(other.query("push").contains("a"));
    assert!(other.unregister("a"));
    assert!(index.is_empty());
}

#[test]
fn given_threads_registering_concurrently_when_done_then_every_tree_is_indexed() {
    let index = SharedFilterIndex::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let index = index.clone();
            thread::spawn(move || {
                let skills = vec![Skill::new(format!("s{i}"), "Common").with_labels([format!("only{i}")])];
                index.register(&format!("tree-{i}"), &skills).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(index.len(), 8);
    assert_eq!(index.query("only3"), ids(&["tree-3"]));
    assert_eq!(index.snapshot().registered().count(), 8);
}
