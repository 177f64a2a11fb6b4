//! Tests for termtree rendering of trees and sessions

use skilltree::application::services::TreeSession;
use skilltree::domain::{Requirement, Skill, SkillTree, StorageHandle};
use skilltree::tree_render::TreeRender;

fn arms() -> SkillTree {
    SkillTree::new(
        "arms",
        vec![Skill::new("curl", "Curl").with_max_points(2).with_children(vec![
            Skill::new("chinup", "Chin-up").with_requirement(Requirement::SkillPoints {
                skill: "curl".to_string(),
                min: 2,
            }),
        ])],
    )
    .with_title("Arms")
}

#[test]
fn given_tree_when_rendered_then_shows_hierarchy() {
    let rendered = arms().to_tree_string().to_string();

    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines[0], "Arms [arms]");
    assert!(lines[1].ends_with("Curl (curl)"));
    assert!(lines[2].ends_with("Chin-up (chinup)"));
}

#[test]
fn given_session_when_rendered_then_marks_node_states() {
    let mut session = TreeSession::new(arms(), None, StorageHandle::Local, None).unwrap();

    let before = session.to_tree_string().to_string();
    assert!(before.contains("[o] Curl (curl) 0/2"));
    assert!(before.contains("[ ] Chin-up (chinup)"));

    session.select("curl").unwrap();
    let after = session.to_tree_string().to_string();
    assert!(after.contains("[x] Curl (curl) 2/2"));
    assert!(after.contains("[o] Chin-up (chinup)"));
}
