//! Integration tests for entity destruction

use trellis_foundation::{EntityId, Value};
use trellis_storage::{Role, World};

fn e(id: &str) -> EntityId {
    EntityId::from(id)
}

#[test]
fn destroy_removes_attributes_and_relations() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "hp", 10);
    world.add_role(&e("a"), "guard");
    world.add_relation(&e("a"), "likes", &e("b"), None);

    world.destroy_entity(&e("a"));

    assert!(world.query_entities_by_relation_to("likes", &e("b"), Role::Target).is_empty());
    assert!(world.get_attributes(&e("a"), "hp").is_empty());
    assert!(world.get_roles(&e("a")).is_empty());
    assert!(!world.exists(&e("a")));
}

#[test]
fn destroy_unhooks_incoming_relations() {
    let mut world = World::new();
    world.add_relation(&e("b"), "likes", &e("a"), None);
    world.add_relation(&e("c"), "likes", &e("a"), None);

    world.destroy_entity(&e("a"));

    assert!(world.query_entities_by_relation_to("likes", &e("b"), Role::Source).is_empty());
    assert!(world.query_entities_by_relation_to("likes", &e("c"), Role::Source).is_empty());
    assert!(!world.exists(&e("b")));
    assert!(!world.exists(&e("c")));
}

#[test]
fn destroy_leaves_unrelated_relations_alone() {
    let mut world = World::new();
    world.add_relation(&e("a"), "likes", &e("b"), None);
    let kept = world.add_relation(&e("b"), "likes", &e("c"), None);

    world.destroy_entity(&e("a"));

    assert_eq!(world.query_entities_in_relation_to(&e("b")), vec![e("c")]);
    assert!(world.get_relation(&kept).is_some());
}

#[test]
fn relation_entity_keeps_its_other_attributes() {
    let mut world = World::new();
    let r = world.add_relation(&e("a"), "likes", &e("b"), None);
    world.add_attribute(&r, "strength", 9);

    world.destroy_entity(&e("b"));

    assert!(world.get_relation(&r).is_none());
    assert_eq!(world.get_attribute(&r, "strength"), Some(&Value::Int(9)));
}

#[test]
fn destroyed_ids_are_not_reused() {
    let mut world = World::new();
    let first = world.create_entity("npc");
    world.add_role(&first, "guard");
    world.destroy_entity(&first);

    let second = world.create_entity("npc");
    assert_ne!(first, second);
}
