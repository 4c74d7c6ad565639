//! Scripted play through the demo story.

use parley_runtime::{EngineConfig, Repl, ReplStep, ScriptedEditor, TracerConfig, demo};

#[test]
fn scripted_session_reaches_the_letter() {
    let engine = demo(EngineConfig::default()).unwrap();
    let script = [
        "take the brass key",
        "unlock door with key",
        "open door",
        "north",
        "open chest",
        "take letter",
        "examine letter",
    ];
    let mut repl = Repl::with_editor(ScriptedEditor::new(script), engine).without_banner();
    repl.run().unwrap();

    let engine = repl.engine();
    assert_eq!(engine.turn(), 7);
    let letter = engine.world().find_by_name("letter").unwrap();
    assert_eq!(
        parley_world::WorldModel::location(engine.world(), letter),
        Some(engine.player())
    );
}

#[test]
fn search_verb_depends_on_the_room() {
    let mut engine = demo(EngineConfig::default()).unwrap();
    // The hall has plenty to search.
    let result = engine.execute_turn("search table");
    assert_eq!(result.action.as_deref(), Some("if.action.examining"));
    assert!(result.success);
}

#[test]
fn tracing_shows_the_pipeline() {
    let config = EngineConfig::new().with_tracer(TracerConfig::new().enabled());
    let engine = demo(config).unwrap();
    let mut repl = Repl::with_editor(ScriptedEditor::default(), engine).without_banner();

    let ReplStep::Continue(lines) = repl.handle_line("take coin") else {
        panic!("expected output");
    };
    let trace = &lines[0];
    assert!(trace.contains("TURN 1 START: \"take coin\""));
    assert!(trace.contains("MATCH stdlib.taking -> if.action.taking"));
    assert!(trace.contains("SLOT :items \"coin\""));
    assert!(trace.contains("EXECUTE if.action.taking OK"));
    assert_eq!(lines[1], "Taken.");

    assert_eq!(
        repl.handle_line(":trace off"),
        ReplStep::Continue(vec!["Tracing off.".to_string()])
    );
    assert_eq!(
        repl.handle_line("drop coin"),
        ReplStep::Continue(vec!["Dropped.".to_string()])
    );
}
