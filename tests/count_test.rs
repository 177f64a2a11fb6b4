//! Tests for node counting and the aggregation registry

use rstest::{fixture, rstest};

use skilltree::domain::{count_nodes, DomainError, NodeCountRegistry, Skill, StructuralError};

/// One root with two children, each having one child: 5 nodes
#[fixture]
fn five_nodes() -> Vec<Skill> {
    vec![Skill::new("root", "Root").with_children(vec![
        Skill::new("a", "A").with_children(vec![Skill::new("a1", "A1")]),
        Skill::new("b", "B").with_children(vec![Skill::new("b1", "B1")]),
    ])]
}

#[fixture]
fn three_roots() -> Vec<Skill> {
    vec![
        Skill::new("x", "X"),
        Skill::new("y", "Y").with_children(vec![Skill::new("y1", "Y1")]),
        Skill::new("z", "Z"),
    ]
}

// ============================================================
// count_nodes
// ============================================================

#[rstest]
fn given_hand_built_tree_when_counting_then_returns_known_size(five_nodes: Vec<Skill>) {
    assert_eq!(count_nodes(&five_nodes).unwrap(), 5);
}

#[rstest]
fn given_forest_when_counting_twice_then_count_is_stable(three_roots: Vec<Skill>) {
    let first = count_nodes(&three_roots).unwrap();
    let second = count_nodes(&three_roots).unwrap();
    assert_eq!(first, 4);
    assert_eq!(first, second);
}

#[test]
fn given_empty_forest_when_counting_then_returns_zero() {
    assert_eq!(count_nodes(&[]).unwrap(), 0);
}

#[test]
fn given_locked_nodes_when_counting_then_they_still_count() {
    let forest = vec![Skill::new("root", "Root")
        .with_requirement(skilltree::Requirement::Any { of: vec![] })
        .with_children(vec![Skill::new("child", "Child")])];

    assert_eq!(count_nodes(&forest).unwrap(), 2);
}

#[test]
fn given_repeated_skill_id_when_counting_then_fails_with_structural_error() {
    let shared = Skill::new("shared", "Shared");
    let forest = vec![
        Skill::new("a", "A").with_children(vec![shared.clone()]),
        Skill::new("b", "B").with_children(vec![shared]),
    ];

    let err = count_nodes(&forest).unwrap_err();

    assert_eq!(
        err,
        DomainError::Structural(StructuralError::DuplicateNode {
            skill_id: "shared".to_string()
        })
    );
}

// ============================================================
// NodeCountRegistry
// ============================================================

#[rstest]
fn given_two_contributors_when_added_then_total_is_sum(
    five_nodes: Vec<Skill>,
    three_roots: Vec<Skill>,
) {
    let mut registry = NodeCountRegistry::new();

    let c1 = registry.add_contribution("t1", &five_nodes).unwrap();
    let c2 = registry.add_contribution("t2", &three_roots).unwrap();

    assert_eq!(c1 + c2, registry.total());
    assert_eq!(registry.total(), 9);
    assert_eq!(registry.len(), 2);
}

#[rstest]
fn given_mounted_contributor_when_removed_then_total_drops_by_its_count(
    five_nodes: Vec<Skill>,
    three_roots: Vec<Skill>,
) {
    let mut registry = NodeCountRegistry::new();
    registry.add_contribution("t1", &five_nodes).unwrap();
    registry.add_contribution("t2", &three_roots).unwrap();
    let before = registry.total();

    let removed = registry.remove_contribution("t1");

    assert_eq!(removed, Some(5));
    assert_eq!(registry.total(), before - 5);
    assert_eq!(registry.contribution("t1"), None);
}

#[rstest]
fn given_same_contributor_when_added_twice_then_replaces_not_accumulates(
    five_nodes: Vec<Skill>,
    three_roots: Vec<Skill>,
) {
    let mut registry = NodeCountRegistry::new();
    registry.add_contribution("t1", &five_nodes).unwrap();
    registry.add_contribution("t1", &five_nodes).unwrap();
    assert_eq!(registry.total(), 5);

    registry.add_contribution("t1", &three_roots).unwrap();
    assert_eq!(registry.total(), 4);
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn given_empty_forest_when_added_then_total_is_unchanged(five_nodes: Vec<Skill>) {
    let mut registry = NodeCountRegistry::new();
    registry.add_contribution("t1", &five_nodes).unwrap();

    let count = registry.add_contribution("empty", &[]).unwrap();

    assert_eq!(count, 0);
    assert_eq!(registry.total(), 5);
}

#[rstest]
fn given_malformed_forest_when_added_then_registry_is_unchanged(five_nodes: Vec<Skill>) {
    let mut registry = NodeCountRegistry::new();
    registry.add_contribution("t1", &five_nodes).unwrap();
    let broken = vec![Skill::new("dup", "Dup"), Skill::new("dup", "Dup again")];

    assert!(registry.add_contribution("t1", &broken).is_err());

    assert_eq!(registry.contribution("t1"), Some(5));
    assert_eq!(registry.total(), 5);
}

#[test]
fn given_unknown_contributor_when_removed_then_is_noop() {
    let mut registry = NodeCountRegistry::new();
    assert_eq!(registry.remove_contribution("ghost"), None);
    assert!(registry.is_empty());
    assert_eq!(registry.total(), 0);
}
