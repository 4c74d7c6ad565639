//! Turn events rendered through the message catalog.

use parley_runtime::{EngineConfig, MessageCatalog, demo};

fn play(commands: &[&str]) -> Vec<Vec<String>> {
    let mut engine = demo(EngineConfig::default()).unwrap();
    let catalog = MessageCatalog::standard();
    commands
        .iter()
        .map(|input| catalog.render_all(&engine.execute_turn(input).events))
        .collect()
}

#[test]
fn resolution_failures_render() {
    let out = play(&["", "dance", "take unicorn"]);
    assert_eq!(out[0], vec!["I beg your pardon?"]);
    assert_eq!(out[1], vec!["I don't understand \"dance\"."]);
    assert_eq!(out[2], vec!["You can't see any unicorn here."]);
}

#[test]
fn locked_door_renders() {
    let out = play(&["open door", "north"]);
    assert_eq!(out[0], vec!["The door is locked."]);
    assert_eq!(out[1], vec!["The door is locked."]);
}

#[test]
fn unlocking_and_opening_render() {
    let out = play(&["take brass key", "unlock door with key", "open door", "lock door"]);
    assert_eq!(out[0], vec!["You take the key from the table."]);
    assert_eq!(out[1], vec!["You unlock the door with the key."]);
    assert_eq!(out[2], vec!["You open the door."]);
    assert_eq!(out[3], vec!["You'll have to close the door first."]);
}

#[test]
fn revealed_contents_render_before_success() {
    let out = play(&[
        "take key",
        "unlock door with key",
        "open door",
        "n",
        "open chest",
    ]);
    assert_eq!(out[3], vec!["You go north."]);
    assert_eq!(
        out[4],
        vec!["Opening the chest reveals letter.", "You open the chest."]
    );
}

#[test]
fn custom_catalog_overrides_wording() {
    let mut engine = demo(EngineConfig::default()).unwrap();
    let catalog = MessageCatalog::standard().with("if.action.taking.taken", "You pocket it.");
    let result = engine.execute_turn("take coin");
    assert_eq!(catalog.render_all(&result.events), vec!["You pocket it."]);
}
