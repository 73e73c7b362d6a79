//! Build tracing.
//!
//! Records what the compiler did to the shared network, rule by rule, with
//! zero overhead when disabled. Records are kept in a bounded buffer and
//! mirrored to the `log` facade at `trace` level.

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{BuildEvent, TraceRecord};

use std::sync::Arc;
use std::time::Instant;

use crate::node::NodeId;

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the build tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Event types to keep (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
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

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to filter event types.
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records [`BuildEvent`]s while rules are compiled.
#[derive(Debug)]
pub struct BuildTracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    rule_seq: u64,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl BuildTracer {
    /// Creates a tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            rule_seq: 0,
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
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

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Returns the sequence number of the rule being compiled.
    #[must_use]
    pub fn rule_seq(&self) -> u64 {
        self.rule_seq
    }

    /// Records an event.
    #[inline]
    pub fn record(&mut self, event: BuildEvent) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(event);
    }

    fn record_internal(&mut self, event: BuildEvent) {
        if !self.config.event_filter.is_empty()
            && !self
                .config
                .event_filter
                .iter()
                .any(|t| t == event.event_type())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        self.buffer.push(self.rule_seq, timestamp_ns, event);

        if log::log_enabled!(log::Level::Trace) {
            if let Some(record) = self.buffer.recent(1).first() {
                log::trace!("{}", self.format_record(record));
            }
        }
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        if self.config.json_format {
            self.json_formatter.format(record)
        } else {
            self.human_formatter.format(record)
        }
    }

    /// Formats multiple records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records)
        } else {
            self.human_formatter.format_many(records)
        }
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
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

    /// Starts a new rule sequence and records its start.
    #[inline]
    pub fn rule_start(&mut self, rule: &Arc<str>) {
        self.rule_seq += 1;
        self.record(BuildEvent::RuleStart {
            rule: Arc::clone(rule),
        });
    }

    /// Records a node placement.
    #[inline]
    pub fn node(&mut self, node: NodeId, kind: &'static str, shared: bool) {
        if shared {
            self.record(BuildEvent::NodeShared { node, kind });
        } else {
            self.record(BuildEvent::NodeCreated { node, kind });
        }
    }

    /// Records a left-input adapter.
    #[inline]
    pub fn adapter_inserted(&mut self, node: NodeId, root: NodeId) {
        self.record(BuildEvent::AdapterInserted { node, root });
    }

    /// Records the initial-fact pattern.
    #[inline]
    pub fn initial_fact_inserted(&mut self, node: NodeId) {
        self.record(BuildEvent::InitialFactInserted { node });
    }

    /// Records a skipped constraint.
    #[inline]
    pub fn constraint_skipped(&mut self, key: &str) {
        if self.config.enabled {
            self.record_internal(BuildEvent::ConstraintSkipped {
                key: key.to_string(),
            });
        }
    }

    /// Records a successful compilation.
    #[inline]
    pub fn rule_complete(&mut self, rule: &Arc<str>, terminal: NodeId) {
        self.record(BuildEvent::RuleComplete {
            rule: Arc::clone(rule),
            terminal,
        });
    }

    /// Records a failed compilation.
    #[inline]
    pub fn rule_failed(&mut self, rule: &Arc<str>, message: &str) {
        if self.config.enabled {
            self.record_internal(BuildEvent::RuleFailed {
                rule: Arc::clone(rule),
                message: message.to_string(),
            });
        }
    }

    /// Records a rollback.
    #[inline]
    pub fn rolled_back(&mut self, rule: &Arc<str>, removed: usize) {
        self.record(BuildEvent::RolledBack {
            rule: Arc::clone(rule),
            removed,
        });
    }
}

impl Default for BuildTracer {
    fn default() -> Self {
        Self::disabled()
    }
}
