//! Consensus-bypass attack monitor.
//!
//! Watches for coordinated attempts to bypass constitutionally protected
//! components. Attempts are kept in a bounded sliding window; when multiple
//! distinct attackers have been observed against one target and the windowed
//! attempt count reaches the alert threshold, a CRITICAL alert carrying the
//! full attempt history is emitted. Alerts are also retained in an
//! append-only log, so the monitor's own output cannot be hidden by the
//! trust pipeline it watches over.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::error;
use zerobus_core::EventSeverity;

/// One observed attempt to bypass a protected component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassAttempt {
    /// When the attempt was observed (Unix epoch seconds)
    pub observed_at: u64,
    /// Component the attempt was aimed at
    pub target_component_id: String,
    /// Distinct components participating in the attempt
    pub attackers: BTreeSet<String>,
}

/// Critical alert emitted when a coordinated bypass pattern is detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusAttackAlert {
    /// Always `Critical`
    pub severity: EventSeverity,
    /// Component under attack
    pub target_component_id: String,
    /// Full windowed attempt history at emission time
    pub attempts: Vec<BypassAttempt>,
    /// Emission time (Unix epoch seconds)
    pub observed_at: u64,
    /// Human-readable summary
    pub details: String,
}

/// Sliding-window detector for consensus-bypass attacks.
pub struct ConsensusMonitor {
    window_secs: u64,
    alert_threshold: usize,
    attempts: Mutex<Vec<BypassAttempt>>,
    alerts: Mutex<Vec<ConsensusAttackAlert>>,
}

impl ConsensusMonitor {
    /// Create a monitor with the given window and alert threshold.
    pub fn new(window_secs: u64, alert_threshold: usize) -> Self {
        Self {
            window_secs,
            alert_threshold,
            attempts: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Record a bypass attempt against a protected target.
    ///
    /// Returns a [`ConsensusAttackAlert`] when, within the sliding window,
    /// at least two distinct attackers have been observed against the target
    /// and the attempt count has reached the threshold. The alert is also
    /// appended to the internal log regardless of what the caller does with
    /// it.
    pub fn record_attempt(
        &self,
        target_component_id: &str,
        attackers: BTreeSet<String>,
        observed_at: u64,
    ) -> Option<ConsensusAttackAlert> {
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());

        // Prune everything that fell out of the window.
        let window_start = observed_at.saturating_sub(self.window_secs);
        attempts.retain(|a| a.observed_at >= window_start);

        attempts.push(BypassAttempt {
            observed_at,
            target_component_id: target_component_id.to_string(),
            attackers,
        });

        let windowed: Vec<BypassAttempt> = attempts
            .iter()
            .filter(|a| a.target_component_id == target_component_id)
            .cloned()
            .collect();

        let distinct_attackers: BTreeSet<&String> =
            windowed.iter().flat_map(|a| a.attackers.iter()).collect();

        if distinct_attackers.len() >= 2 && windowed.len() >= self.alert_threshold {
            let alert = ConsensusAttackAlert {
                severity: EventSeverity::Critical,
                target_component_id: target_component_id.to_string(),
                details: format!(
                    "{} bypass attempts by {} distinct components against {} within window",
                    windowed.len(),
                    distinct_attackers.len(),
                    target_component_id
                ),
                attempts: windowed,
                observed_at,
            };
            error!(
                target_component_id = %target_component_id,
                attempt_count = alert.attempts.len(),
                "consensus-bypass attack detected"
            );
            drop(attempts);
            let mut alerts = self.alerts.lock().unwrap_or_else(|e| e.into_inner());
            alerts.push(alert.clone());
            return Some(alert);
        }

        None
    }

    /// Snapshot of all alerts emitted so far. Append-only; nothing in the
    /// verification pipeline can filter this.
    pub fn alerts(&self) -> Vec<ConsensusAttackAlert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of attempts currently held (including pruned-out entries not
    /// yet touched by an insert). Monitoring/tests.
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
