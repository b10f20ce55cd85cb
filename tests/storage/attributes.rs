//! Integration tests for attribute storage

use trellis_foundation::{EntityId, Record, Value};
use trellis_storage::World;

fn e(id: &str) -> EntityId {
    EntityId::from(id)
}

// =============================================================================
// Ordering and removal
// =============================================================================

#[test]
fn values_keep_insertion_order() {
    let mut world = World::new();
    world.add_attribute(&e("npc-1"), "item", "sword");
    world.add_attribute(&e("npc-1"), "item", "shield");
    world.add_attribute(&e("npc-1"), "item", "sword");

    assert_eq!(
        world.get_attributes(&e("npc-1"), "item"),
        &[Value::from("sword"), Value::from("shield"), Value::from("sword")]
    );
    assert_eq!(world.get_attribute(&e("npc-1"), "item"), Some(&Value::from("sword")));
    assert_eq!(world.get_attribute_at(&e("npc-1"), "item", 1), Some(&Value::from("shield")));
    assert_eq!(world.get_attribute_at(&e("npc-1"), "item", 3), None);
}

#[test]
fn removing_the_last_value_deletes_the_key() {
    let mut world = World::new();
    world.add_attribute(&e("npc-1"), "hp", 10);

    assert_eq!(world.remove_attribute(&e("npc-1"), "hp"), Some(Value::Int(10)));
    assert!(world.get_attributes(&e("npc-1"), "hp").is_empty());
    assert_eq!(world.attributes().entities("hp").count(), 0);
    assert!(!world.exists(&e("npc-1")));
}

#[test]
fn remove_at_shifts_later_values() {
    let mut world = World::new();
    for n in [1, 2, 3] {
        world.add_attribute(&e("a"), "n", n);
    }

    assert_eq!(world.remove_attribute_at(&e("a"), "n", 1), Some(Value::Int(2)));
    assert_eq!(world.get_attributes(&e("a"), "n"), &[Value::Int(1), Value::Int(3)]);
}

#[test]
fn missing_data_is_never_an_error() {
    let mut world = World::new();
    let ghost = e("ghost-1");

    assert_eq!(world.get_attribute(&ghost, "hp"), None);
    assert!(world.get_attributes(&ghost, "hp").is_empty());
    assert_eq!(world.remove_attribute(&ghost, "hp"), None);
    assert_eq!(world.remove_attribute_at(&ghost, "hp", 4), None);
    assert_eq!(world.remove_attribute_by_criteria(&ghost, "hp", "x"), None);
    world.update_attribute(&ghost, "hp", 3);
    world.update_attribute_by_criteria(&ghost, "hp", "x", 3);
    world.destroy_entity(&ghost);

    assert!(!world.exists(&ghost));
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn record_updates_merge_shallowly() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "stats", Record::new().with("hp", 10).with("mp", 3));

    world.update_attribute(&e("a"), "stats", Record::new().with("hp", 7));

    let stats = world.get_attribute(&e("a"), "stats").unwrap();
    assert_eq!(stats.field("hp"), Some(&Value::Int(7)));
    assert_eq!(stats.field("mp"), Some(&Value::Int(3)));
}

#[test]
fn scalar_updates_replace() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "mood", "calm");
    world.update_attribute(&e("a"), "mood", "angry");
    assert_eq!(world.get_attribute(&e("a"), "mood"), Some(&Value::from("angry")));
}

#[test]
fn indexed_update_merges_against_that_slot() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "slot", Record::new().with("name", "first").with("x", 1));
    world.add_attribute(&e("a"), "slot", Record::new().with("name", "second").with("x", 2));

    world.update_attribute_at(&e("a"), "slot", Record::new().with("x", 20), 1);

    let second = world.get_attribute_at(&e("a"), "slot", 1).unwrap();
    assert_eq!(second.field("name"), Some(&Value::from("second")));
    assert_eq!(second.field("x"), Some(&Value::Int(20)));
    let first = world.get_attribute(&e("a"), "slot").unwrap();
    assert_eq!(first.field("x"), Some(&Value::Int(1)));
}

#[test]
fn indexed_update_never_creates_slots() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "n", 1);
    world.update_attribute_at(&e("a"), "n", 5, 3);
    assert_eq!(world.get_attributes(&e("a"), "n"), &[Value::Int(1)]);
}

// =============================================================================
// Criteria
// =============================================================================

#[test]
fn criteria_operations_touch_only_the_first_match() {
    let mut world = World::new();
    for (team, rank) in [("red", 1), ("blue", 2), ("red", 3)] {
        world.add_attribute(&e("a"), "badge", Record::new().with("team", team).with("rank", rank));
    }

    world.update_attribute_by_criteria(
        &e("a"),
        "badge",
        Record::new().with("team", "red"),
        Record::new().with("rank", 10),
    );
    let ranks: Vec<_> = world
        .get_attributes(&e("a"), "badge")
        .iter()
        .filter_map(|badge| badge.field("rank").and_then(Value::as_int))
        .collect();
    assert_eq!(ranks, [10, 2, 3]);

    let removed = world.remove_attribute_by_criteria(&e("a"), "badge", Record::new().with("team", "red"));
    assert_eq!(removed.unwrap().field("rank"), Some(&Value::Int(10)));
    assert_eq!(world.get_attributes(&e("a"), "badge").len(), 2);
}

#[test]
fn query_by_attribute_uses_subset_matching() {
    let mut world = World::new();
    world.add_attribute(&e("a"), "role", Record::new().with("team", "red").with("rank", 1));
    world.add_attribute(&e("b"), "role", Record::new().with("team", "blue"));
    world.add_attribute(&e("c"), "role", Record::new().with("team", "blue"));
    world.add_attribute(&e("c"), "role", Record::new().with("team", "red"));

    assert_eq!(
        world.query_entities_by_attribute("role", Record::new().with("team", "red")),
        vec![e("a"), e("c")]
    );
    assert!(world
        .query_entities_by_attribute("role", Record::new().with("team", "green"))
        .is_empty());
    assert!(world.query_entities_by_attribute("missing", "x").is_empty());
}

#[test]
fn allocated_ids_count_per_kind() {
    let mut world = World::new();
    let a = world.create_entity("npc");
    let b = world.create_entity("npc");
    let c = world.create_entity("item");

    assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("npc-1", "npc-2", "item-1"));
}
