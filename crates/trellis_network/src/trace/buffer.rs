//! Ring buffer for build trace records.

use std::collections::{HashMap, VecDeque};

use super::record::{BuildEvent, TraceRecord};

// =============================================================================
// Trace Buffer
// =============================================================================

/// A bounded buffer of the most recent trace records.
///
/// Oldest records are discarded when full.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    /// The records, oldest first.
    records: VecDeque<TraceRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next record ID to assign.
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

    /// Pushes an event and returns the assigned record ID.
    pub fn push(&mut self, rule_seq: u64, timestamp_ns: u64, event: BuildEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.records
            .push_back(TraceRecord::new(id, rule_seq, timestamp_ns, event));
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

    /// Clears all records. IDs keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the records of one rule compilation.
    #[must_use]
    pub fn records_for_rule(&self, rule_seq: u64) -> Vec<&TraceRecord> {
        self.records.iter().filter(|r| r.rule_seq == rule_seq).collect()
    }

    /// Returns the most recent `count` records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records of one event type.
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
            oldest_rule: self.records.front().map(|r| r.rule_seq),
            newest_rule: self.records.back().map(|r| r.rule_seq),
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

/// Statistics about a trace buffer.
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Number of records currently in buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Oldest rule sequence number in the buffer.
    pub oldest_rule: Option<u64>,
    /// Newest rule sequence number in the buffer.
    pub newest_rule: Option<u64>,
    /// Count of each event type.
    pub event_counts: HashMap<&'static str, usize>,
}
