//! Parley Runtime - Turn execution, messages and the REPL
//!
//! This crate ties the pipeline together:
//!
//! ```text
//! input ──► tokenize ──► match ──► resolve ──► validate ──► execute ──► report
//!                                                                        │
//!                  rendered text ◄── messages ◄── chains ◄── events ◄────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`] - The [`CommandEngine`] and per-turn [`TurnResult`]
//! - [`messages`] - Message templates for rendering semantic events
//! - [`trace`] - Turn tracing into a ring buffer
//! - [`config`] - Engine configuration
//! - [`editor`] - Line editor abstraction (rustyline or scripted)
//! - [`repl`] - The interactive read-eval-print loop
//! - [`story`] - A small built-in demo story

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod editor;
pub mod engine;
pub mod messages;
pub mod repl;
pub mod story;
pub mod trace;

pub use config::EngineConfig;
pub use editor::{LineEditor, ReadResult, RustylineEditor, ScriptedEditor};
pub use engine::{CommandEngine, TurnResult, codes};
pub use messages::MessageCatalog;
pub use repl::{Repl, ReplStep};
pub use story::demo;
pub use trace::{
    TraceBuffer, TraceEvent, TraceRecord, Tracer, TracerConfig, TurnPhase, format_trace,
};
