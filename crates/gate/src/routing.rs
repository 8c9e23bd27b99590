//! Per-destination ordered buffers and multi-cast delivery.
//!
//! Fan-out is atomic per envelope: every append for one envelope happens
//! while the buffer lock is held, so a consumer can never observe the
//! envelope in some destination buffers but not others. Draining is the
//! responsibility of the external transport daemon.

use crate::envelope::Envelope;
use crate::risk::RiskAssessment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// One delivered envelope as it sits in a destination buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// The delivered envelope, immutable from here on
    pub envelope: Envelope,
    /// Risk assessment that gated the delivery
    pub risk: RiskAssessment,
    /// Routing time (Unix epoch seconds)
    pub routed_at: u64,
}

/// Per-component ordered delivery buffers.
pub struct DestinationBuffers {
    buffers: Mutex<HashMap<String, Vec<DeliveryRecord>>>,
}

impl DestinationBuffers {
    /// Create an empty buffer set.
    pub fn new() -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Append the envelope to every destination's buffer, in destination
    /// order, as one atomic step.
    pub fn deliver(&self, envelope: &Envelope, risk: &RiskAssessment, routed_at: u64) {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        for destination in &envelope.destinations {
            buffers
                .entry(destination.clone())
                .or_default()
                .push(DeliveryRecord {
                    envelope: envelope.clone(),
                    risk: risk.clone(),
                    routed_at,
                });
        }
    }

    /// Append one record to each listed component's buffer atomically.
    ///
    /// Used by the alert broadcast path, which must not pass through any
    /// verification or policy stage.
    pub fn deposit_all(&self, component_ids: &[String], record: DeliveryRecord) {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        for component_id in component_ids {
            buffers
                .entry(component_id.clone())
                .or_default()
                .push(record.clone());
        }
    }

    /// Remove and return a component's buffered records, oldest first.
    pub fn drain(&self, component_id: &str) -> Vec<DeliveryRecord> {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        buffers.remove(component_id).unwrap_or_default()
    }

    /// Number of records currently buffered for a component.
    pub fn buffered(&self, component_id: &str) -> usize {
        let buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        buffers.get(component_id).map(Vec::len).unwrap_or(0)
    }
}

impl Default for DestinationBuffers {
    fn default() -> Self {
        Self::new()
    }
}
