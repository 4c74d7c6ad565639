//! Human-readable trace output.

use std::fmt::Write;

use super::record::{TraceEvent, TraceRecord};

/// Formats trace records one per line.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a formatter with no ids and no timestamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }

    /// Formats one record.
    #[must_use]
    pub fn format(&self, record: &TraceRecord) -> String {
        let mut line = String::new();
        if self.show_ids {
            let _ = write!(line, "[{:06}] ", record.id);
        }
        let _ = write!(line, "T{:04} ", record.turn);
        if self.show_timestamps {
            let _ = write!(line, "{:>10} ", Self::format_timestamp(record.timestamp_ns));
        }

        match &record.event {
            TraceEvent::TurnStart { turn, input } => {
                let _ = write!(line, "=== TURN {turn} START: {input:?} ===");
            }
            TraceEvent::TurnEnd { turn, success } => {
                let status = if *success { "OK" } else { "FAILED" };
                let _ = write!(line, "=== TURN {turn} END ({status}) ===");
            }
            TraceEvent::Tokenized { words } => {
                let _ = write!(line, "  TOKENS [{}]", words.join(" "));
            }
            TraceEvent::RuleMatched {
                rule,
                action,
                confidence,
                candidates,
            } => {
                let _ = write!(
                    line,
                    "  MATCH {rule} -> {action} ({confidence:.2}, {candidates} candidates)"
                );
            }
            TraceEvent::ScopeResolved {
                slot,
                text,
                entities,
            } => {
                let ids: Vec<String> = entities.iter().map(ToString::to_string).collect();
                let _ = write!(line, "    SLOT :{slot} {text:?} = [{}]", ids.join(", "));
            }
            TraceEvent::Validated { action, error } => match error {
                Some(code) => {
                    let _ = write!(line, "  VALIDATE {action} INVALID: {code}");
                }
                None => {
                    let _ = write!(line, "  VALIDATE {action} OK");
                }
            },
            TraceEvent::Executed { action, error } => match error {
                Some(err) => {
                    let _ = write!(line, "  EXECUTE {action} FAILED: {err}");
                }
                None => {
                    let _ = write!(line, "  EXECUTE {action} OK");
                }
            },
            TraceEvent::EventEmitted { id, event_type } => {
                let _ = write!(line, "    EVENT evt-{id} {event_type}");
            }
            TraceEvent::ChainFired {
                key,
                trigger,
                derived,
                depth,
            } => {
                let _ = write!(
                    line,
                    "    CHAIN {key} evt-{trigger} -> evt-{derived} (depth {depth})"
                );
            }
        }
        line
    }

    /// Formats several records, one per line.
    #[must_use]
    pub fn format_many(&self, records: &[&TraceRecord]) -> String {
        records
            .iter()
            .map(|r| self.format(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Formats records with the default formatter.
#[must_use]
pub fn format_trace(records: &[&TraceRecord]) -> String {
    HumanFormatter::new().format_many(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_turn_boundaries() {
        let record = TraceRecord::new(
            7,
            3,
            0,
            TraceEvent::TurnEnd {
                turn: 3,
                success: false,
            },
        );
        assert_eq!(
            HumanFormatter::new().format(&record),
            "T0003 === TURN 3 END (FAILED) ==="
        );
        assert!(
            HumanFormatter::new()
                .with_ids()
                .format(&record)
                .starts_with("[000007] ")
        );
    }

    #[test]
    fn formats_pipeline_lines() {
        let tokens = TraceRecord::new(
            0,
            1,
            0,
            TraceEvent::Tokenized {
                words: vec!["open".into(), "box".into()],
            },
        );
        let validated = TraceRecord::new(
            1,
            1,
            0,
            TraceEvent::Validated {
                action: "if.action.opening".into(),
                error: Some("already_open".into()),
            },
        );
        let text = format_trace(&[&tokens, &validated]);
        assert_eq!(
            text,
            "T0001   TOKENS [open box]\nT0001   VALIDATE if.action.opening INVALID: already_open"
        );
    }

    #[test]
    fn timestamp_units() {
        assert_eq!(HumanFormatter::format_timestamp(500_000), "500us");
        assert_eq!(HumanFormatter::format_timestamp(2_500_000), "2.500ms");
        assert_eq!(HumanFormatter::format_timestamp(1_500_000_000), "1.500s");
    }
}
