//! Per-turn structured tracing.
//!
//! The tracer records what each turn did, phase by phase, into a ring
//! buffer. Recording is a single branch when tracing is disabled.
//!
//! ```text
//! :trace on                   enable recording
//! take coin                   T0001 === TURN 1 START: "take coin" ===
//!                             T0001   TOKENS [take coin]
//!                             T0001   MATCH stdlib.taking -> if.action.taking (1.00, 1 candidates)
//!                             ...
//! :trace off                  disable recording
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{DEFAULT_BUFFER_SIZE, TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, format_trace};
pub use record::{TraceEvent, TraceRecord, TurnPhase};

use std::collections::HashSet;
use std::io::{self, Write};
use std::time::Instant;

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in the buffer.
    pub buffer_size: usize,
    /// Echo each record to stderr as it is recorded.
    pub to_stderr: bool,
    /// Phases to record (empty = all).
    pub phases: HashSet<TurnPhase>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            to_stderr: false,
            phases: HashSet::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a disabled configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to echo records to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.to_stderr = true;
        self
    }

    /// Builder method to record only the given phase (call repeatedly to
    /// add more).
    #[must_use]
    pub fn with_phase(mut self, phase: TurnPhase) -> Self {
        self.phases.insert(phase);
        self
    }

    fn records(&self, phase: TurnPhase) -> bool {
        self.phases.is_empty() || self.phases.contains(&phase)
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records trace events for the command engine.
#[derive(Clone, Debug)]
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    current_turn: u64,
    start_time: Instant,
    formatter: HumanFormatter,
}

impl Tracer {
    /// Creates a tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer = TraceBuffer::new(config.buffer_size);
        Self {
            config,
            buffer,
            current_turn: 0,
            start_time: Instant::now(),
            formatter: HumanFormatter::new(),
        }
    }

    /// Creates a disabled tracer.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Returns the current turn number.
    #[must_use]
    pub fn current_turn(&self) -> u64 {
        self.current_turn
    }

    /// Records a trace event.
    #[inline]
    pub fn record(&mut self, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(event);
    }

    fn record_internal(&mut self, event: TraceEvent) {
        if !self.config.records(event.phase()) {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        self.buffer.push(self.current_turn, timestamp_ns, event);

        if self.config.to_stderr {
            if let Some(record) = self.buffer.last() {
                let _ = writeln!(io::stderr(), "{}", self.formatter.format(record));
            }
        }
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Formatted records of one turn.
    #[must_use]
    pub fn format_turn(&self, turn: u64) -> String {
        self.formatter.format_many(&self.buffer.records_for_turn(turn))
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }

    // -------------------------------------------------------------------------
    // Convenience methods for common events
    // -------------------------------------------------------------------------

    /// Records a turn start and makes `turn` current.
    #[inline]
    pub fn turn_start(&mut self, turn: u64, input: &str) {
        self.current_turn = turn;
        self.record(TraceEvent::TurnStart {
            turn,
            input: input.to_string(),
        });
    }

    /// Records a turn end.
    #[inline]
    pub fn turn_end(&mut self, turn: u64, success: bool) {
        self.record(TraceEvent::TurnEnd { turn, success });
    }

    /// Records a validation result.
    #[inline]
    pub fn validated(&mut self, action: &str, error: Option<&str>) {
        self.record(TraceEvent::Validated {
            action: action.to_string(),
            error: error.map(str::to_string),
        });
    }

    /// Records an execution.
    #[inline]
    pub fn executed(&mut self, action: &str, error: Option<&str>) {
        self.record(TraceEvent::Executed {
            action: action.to_string(),
            error: error.map(str::to_string),
        });
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}
