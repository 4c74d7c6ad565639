//! Ring buffer for trace records.

use std::collections::{HashMap, VecDeque};

use super::record::{TraceEvent, TraceRecord};

/// Default number of records kept.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

// =============================================================================
// Trace Buffer
// =============================================================================

/// A fixed-size buffer of the most recent trace records.
///
/// The oldest records are discarded when the buffer is full. Record ids keep
/// increasing across evictions and clears.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    max_size: usize,
    next_id: u64,
}

impl TraceBuffer {
    /// Creates a buffer holding at most `max_size` records.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
        }
    }

    /// Pushes an event and returns the assigned record id.
    pub fn push(&mut self, turn: u64, timestamp_ns: u64, event: TraceEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records
            .push_back(TraceRecord::new(id, turn, timestamp_ns, event));
        while self.records.len() > self.max_size {
            self.records.pop_front();
        }
        id
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// The most recently pushed record.
    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    /// Records for one turn.
    #[must_use]
    pub fn records_for_turn(&self, turn: u64) -> Vec<&TraceRecord> {
        self.records.iter().filter(|r| r.turn == turn).collect()
    }

    /// The most recent `count` records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Records of a specific event type.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&TraceRecord> {
        self.records
            .iter()
            .filter(|r| r.event_type() == event_type)
            .collect()
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts = HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
        }
        TraceBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            oldest_turn: self.records.front().map(|r| r.turn),
            newest_turn: self.records.back().map(|r| r.turn),
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

/// Statistics about a trace buffer.
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Number of records currently in the buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Oldest turn in the buffer.
    pub oldest_turn: Option<u64>,
    /// Newest turn in the buffer.
    pub newest_turn: Option<u64>,
    /// Count of each event type.
    pub event_counts: HashMap<&'static str, usize>,
}
