//! Parley CLI entry point.

use parley_runtime::{EngineConfig, Repl, ScriptedEditor, TracerConfig, demo};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    batch: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
    trace: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--trace" => config.trace = true,
            "-b" | "--batch" => {
                i += 1;
                if i >= args.len() {
                    return Err("--batch requires a file".into());
                }
                config.batch = Some(PathBuf::from(&args[i]));
            }
            arg => return Err(format!("unknown option: {arg}").into()),
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("parley {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut engine_config = EngineConfig::new();
    if config.trace {
        engine_config = engine_config.with_tracer(TracerConfig::new().enabled());
    }
    let engine = demo(engine_config)?;

    if let Some(path) = config.batch {
        let script = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let editor = ScriptedEditor::new(script.lines());
        let mut repl = Repl::with_editor(editor, engine).without_banner().with_echo();
        repl.run()?;
        return Ok(());
    }

    Repl::new(engine)?.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mParley\x1b[0m - Interactive fiction command pipeline

\x1b[1mUSAGE:\x1b[0m
    parley [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -b, --batch FILE   Run the commands in FILE, one per line, and exit

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace            Print a trace of each turn's pipeline

\x1b[1mEXAMPLES:\x1b[0m
    parley                     Play the demo story
    parley -b walkthrough.txt  Replay a script
    parley --trace             Play with turn tracing

\x1b[1mREPL COMMANDS:\x1b[0m
    :look                Describe the current room
    :trace [on|off]      Toggle turn tracing
    :help                List meta commands
    :quit                Exit
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
