//! Event schema for system-wide ZeroBus events.
//!
//! Provides standardized event types for trust decisions, security events,
//! and operational state changes. All events are timestamped and include
//! component attribution where applicable.

use serde::{Deserialize, Serialize};

/// Severity level for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Informational event
    Info,
    /// Warning condition
    Warning,
    /// Error condition
    Error,
    /// Critical security event
    Critical,
}

/// Category of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    /// Trust and verification events
    Trust,
    /// Security-related events
    Security,
    /// Routing and delivery events
    Routing,
    /// Operational state changes
    Operational,
}

/// Core event structure for ZeroBus system events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateEvent {
    /// Unique event identifier
    pub event_id: String,
    /// Timestamp (Unix epoch seconds)
    pub timestamp: u64,
    /// Event severity
    pub severity: EventSeverity,
    /// Event category
    pub category: EventCategory,
    /// Event type (specific action or state)
    pub event_type: String,
    /// Component that triggered the event (if applicable)
    pub component_id: Option<String>,
    /// Human-readable message
    pub message: String,
    /// Structured metadata
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Builder for creating gate events.
pub struct GateEventBuilder {
    event: GateEvent,
}

impl GateEventBuilder {
    /// Create a new event builder.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event: GateEvent {
                event_id: generate_event_id(),
                timestamp: current_timestamp(),
                severity: EventSeverity::Info,
                category: EventCategory::Operational,
                event_type: event_type.into(),
                component_id: None,
                message: String::new(),
                metadata: serde_json::Map::new(),
            },
        }
    }

    /// Set the severity.
    pub fn severity(mut self, severity: EventSeverity) -> Self {
        self.event.severity = severity;
        self
    }

    /// Set the category.
    pub fn category(mut self, category: EventCategory) -> Self {
        self.event.category = category;
        self
    }

    /// Set the component ID.
    pub fn component(mut self, component_id: impl Into<String>) -> Self {
        self.event.component_id = Some(component_id.into());
        self
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.event.message = message.into();
        self
    }

    /// Add metadata.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.event.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the event.
    pub fn build(self) -> GateEvent {
        self.event
    }
}

/// Event types emitted by the gate.
pub mod event_types {
    /// Coordinated consensus-bypass attack detected; broadcast to all
    /// active components.
    pub const CONSENSUS_ATTACK: &str = "security.consensus_attack";
}

fn generate_event_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}")
}

/// Get current timestamp in seconds.
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
