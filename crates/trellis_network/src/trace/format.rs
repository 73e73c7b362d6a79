//! Trace output formatters.

use super::record::{BuildEvent, TraceRecord};

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Formats trace records.
pub trait TraceFormatter {
    /// Formats a single trace record.
    fn format(&self, record: &TraceRecord) -> String;

    /// Formats multiple records.
    fn format_many(&self, records: &[&TraceRecord]) -> String {
        records
            .iter()
            .map(|r| self.format(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats trace records in human-readable form.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
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
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        use std::fmt::Write;
        let mut prefix = String::new();

        if self.show_ids {
            let _ = write!(prefix, "[{:06}] ", record.id);
        }
        let _ = write!(prefix, "R{:04} ", record.rule_seq);
        if self.show_timestamps {
            let _ = write!(
                prefix,
                "{:>10} ",
                Self::format_timestamp(record.timestamp_ns)
            );
        }

        let event_str = match &record.event {
            BuildEvent::RuleStart { rule } => format!("=== RULE {rule} ==="),
            BuildEvent::NodeCreated { node, kind } => format!("  + {kind} {node}"),
            BuildEvent::NodeShared { node, kind } => format!("  = {kind} {node}"),
            BuildEvent::AdapterInserted { node, root } => {
                format!("  ADAPTER {node} over {root}")
            }
            BuildEvent::InitialFactInserted { node } => format!("  INITIAL-FACT {node}"),
            BuildEvent::ConstraintSkipped { key } => format!("  SKIP {key}"),
            BuildEvent::RuleComplete { rule, terminal } => {
                format!("=== RULE {rule} OK (terminal {terminal}) ===")
            }
            BuildEvent::RuleFailed { rule, message } => {
                format!("=== RULE {rule} FAILED: {message} ===")
            }
            BuildEvent::RolledBack { rule, removed } => {
                format!("  ROLLBACK {rule}: {removed} node(s) removed")
            }
        };

        format!("{prefix}{event_str}")
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats trace records as JSON.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to put each record of a batch on its own line.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn escape_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        let esc = Self::escape_string;
        let event_data = match &record.event {
            BuildEvent::RuleStart { rule } => format!("\"rule\":\"{}\"", esc(rule)),
            BuildEvent::NodeCreated { node, kind } | BuildEvent::NodeShared { node, kind } => {
                format!("\"node\":{},\"kind\":\"{kind}\"", node.index())
            }
            BuildEvent::AdapterInserted { node, root } => {
                format!("\"node\":{},\"root\":{}", node.index(), root.index())
            }
            BuildEvent::InitialFactInserted { node } => format!("\"node\":{}", node.index()),
            BuildEvent::ConstraintSkipped { key } => format!("\"key\":\"{}\"", esc(key)),
            BuildEvent::RuleComplete { rule, terminal } => format!(
                "\"rule\":\"{}\",\"terminal\":{}",
                esc(rule),
                terminal.index()
            ),
            BuildEvent::RuleFailed { rule, message } => format!(
                "\"rule\":\"{}\",\"message\":\"{}\"",
                esc(rule),
                esc(message)
            ),
            BuildEvent::RolledBack { rule, removed } => {
                format!("\"rule\":\"{}\",\"removed\":{removed}", esc(rule))
            }
        };

        format!(
            "{{\"id\":{},\"rule_seq\":{},\"timestamp_ns\":{},\"type\":\"{}\",{}}}",
            record.id,
            record.rule_seq,
            record.timestamp_ns,
            record.event_type(),
            event_data
        )
    }

    fn format_many(&self, records: &[&TraceRecord]) -> String {
        let items: Vec<_> = records.iter().map(|r| self.format(r)).collect();
        if self.pretty {
            format!("[\n  {}\n]", items.join(",\n  "))
        } else {
            format!("[{}]", items.join(","))
        }
    }
}
