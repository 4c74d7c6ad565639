//! The interactive REPL.

use parley_foundation::Result;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::engine::CommandEngine;
use crate::messages::MessageCatalog;

/// What one input line did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplStep {
    /// Keep reading; print these lines.
    Continue(Vec<String>),
    /// Stop the loop.
    Quit,
}

/// Reads commands, runs turns and prints the rendered events.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    engine: CommandEngine,
    messages: MessageCatalog,
    show_banner: bool,
    echo_input: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL with the rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(engine: CommandEngine) -> Result<Self> {
        Ok(Self::with_editor(RustylineEditor::new()?, engine))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    pub fn with_editor(mut editor: E, engine: CommandEngine) -> Self {
        editor.set_completions(completion_words(&engine));
        Self {
            editor,
            engine,
            messages: MessageCatalog::standard(),
            show_banner: true,
            echo_input: false,
            prompt: "> ".to_string(),
        }
    }

    /// Replaces the message catalog.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Prints each input line after the prompt (for scripted input).
    #[must_use]
    pub fn with_echo(mut self) -> Self {
        self.echo_input = true;
        self
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &CommandEngine {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut CommandEngine {
        &mut self.engine
    }

    /// Runs until EOF or `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            println!("Parley {}", env!("CARGO_PKG_VERSION"));
            println!("Type :help for meta commands.\n");
            for line in self.turn("look") {
                println!("{line}");
            }
        }

        loop {
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if self.echo_input {
                println!("{}{line}", self.prompt);
            }
            if !line.trim().is_empty() {
                self.editor.add_history(&line);
            }
            match self.handle_line(&line) {
                ReplStep::Continue(output) => {
                    for text in output {
                        println!("{text}");
                    }
                }
                ReplStep::Quit => break,
            }
        }
        Ok(())
    }

    /// Handles one line: a `:` meta command or a game command.
    pub fn handle_line(&mut self, line: &str) -> ReplStep {
        let trimmed = line.trim();
        let Some(meta) = trimmed.strip_prefix(':') else {
            return ReplStep::Continue(self.turn(trimmed));
        };

        let mut words = meta.split_whitespace();
        match (words.next(), words.next()) {
            (Some("quit" | "q"), _) => ReplStep::Quit,
            (Some("look" | "l"), _) => ReplStep::Continue(self.turn("look")),
            (Some("trace"), arg) => {
                let tracer = self.engine.tracer_mut();
                let enable = match arg {
                    Some("on") => true,
                    Some("off") => false,
                    _ => !tracer.is_enabled(),
                };
                if enable {
                    tracer.enable();
                } else {
                    tracer.disable();
                }
                let state = if enable { "on" } else { "off" };
                ReplStep::Continue(vec![format!("Tracing {state}.")])
            }
            (Some("help"), _) => ReplStep::Continue(vec![
                ":look          describe the current room".to_string(),
                ":trace [on|off] toggle turn tracing".to_string(),
                ":quit          leave".to_string(),
            ]),
            _ => ReplStep::Continue(vec![format!("Unknown meta command: {trimmed}")]),
        }
    }

    fn turn(&mut self, input: &str) -> Vec<String> {
        let result = self.engine.execute_turn(input);
        let mut output = Vec::new();
        if self.engine.tracer().is_enabled() {
            output.push(self.engine.tracer().format_turn(result.turn));
        }
        output.extend(self.messages.render_all(&result.events));
        output
    }
}

/// Verbs of every rule's pattern, for completion.
fn completion_words(engine: &CommandEngine) -> Vec<String> {
    use parley_grammar::GrammarEngine;

    let mut words: Vec<String> = engine
        .grammar()
        .rules()
        .iter()
        .filter_map(|rule| rule.pattern.split_whitespace().next())
        .flat_map(|head| head.split('|'))
        .filter(|w| !w.starts_with(':') && !w.starts_with('['))
        .map(str::to_string)
        .collect();
    words.sort();
    words.dedup();
    words
}
