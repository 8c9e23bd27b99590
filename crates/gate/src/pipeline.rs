//! The zero-trust verification pipeline and submission gate.
//!
//! Every inter-component envelope passes through four strictly ordered
//! stages: structure, signature, trust policy, replay. The first failure
//! short-circuits with a tagged rejection; there is no partial success.
//! Rejections at the signature, policy, and replay stages raise a permanent
//! verification flag. Accepted envelopes are risk-scored before delivery:
//! a high score withholds delivery without invalidating the envelope.

use crate::envelope::{now_secs, Envelope, EnvelopeBuilder, EnvelopeKind, Priority};
use crate::flags::{FlagLedger, FlagReason, VerifierStatus};
use crate::monitor::{ConsensusAttackAlert, ConsensusMonitor};
use crate::replay::ReplayGuard;
use crate::risk::{BaselineRiskAssessor, RiskAssessment, RiskAssessor};
use crate::routing::{DeliveryRecord, DestinationBuffers};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use zerobus_core::event::{event_types, EventCategory, EventSeverity, GateEventBuilder};
use zerobus_core::GateConfig;
use zerobus_registry::{ComponentStatus, RegistryError, TrustLevel, TrustRegistry};

/// Tagged rejection reasons, one per pipeline stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Required field missing or empty, or destinations empty
    #[error("Malformed envelope")]
    MalformedEnvelope,

    /// Sender not present in the trust registry
    #[error("Unknown sender")]
    UnknownSender,

    /// Cryptographic signature verification failed
    #[error("Invalid signature")]
    InvalidSignature,

    /// Timestamp outside the freshness window
    #[error("Stale or future timestamp")]
    StaleOrFutureTimestamp,

    /// Trust-policy violation (constitutional protection)
    #[error("Policy violation")]
    PolicyViolation,

    /// Nonce reuse detected
    #[error("Replay detected")]
    ReplayDetected,
}

impl RejectReason {
    fn flag_reason(self) -> Option<FlagReason> {
        match self {
            RejectReason::MalformedEnvelope => None,
            RejectReason::UnknownSender => Some(FlagReason::UnknownSender),
            RejectReason::InvalidSignature => Some(FlagReason::InvalidSignature),
            RejectReason::StaleOrFutureTimestamp => Some(FlagReason::StaleOrFutureTimestamp),
            RejectReason::PolicyViolation => Some(FlagReason::PolicyViolation),
            RejectReason::ReplayDetected => Some(FlagReason::ReplayDetected),
        }
    }
}

/// Outcome of submitting one envelope.
///
/// `Withheld` is not an error: the envelope passed every verification stage
/// but was held back on risk grounds. Callers can always distinguish the
/// three cases.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Verified and appended to every destination buffer
    Delivered {
        /// The assessment that allowed delivery
        risk: RiskAssessment,
    },
    /// Verified but withheld from delivery on risk grounds
    Withheld {
        /// The assessment that withheld delivery
        risk: RiskAssessment,
    },
    /// Failed a verification stage
    Rejected {
        /// Which stage failed
        reason: RejectReason,
    },
}

impl SubmitOutcome {
    /// True for `Delivered`.
    pub fn is_delivered(&self) -> bool {
        matches!(self, SubmitOutcome::Delivered { .. })
    }
}

/// The zero-trust gate: verification pipeline, risk gate, routing fabric,
/// flag ledger, and consensus-attack monitor behind one submission API.
///
/// Shared across caller threads via `Arc`; every operation takes `&self`.
pub struct ZeroTrustGate {
    config: GateConfig,
    registry: Arc<TrustRegistry>,
    replay: ReplayGuard,
    flags: FlagLedger,
    monitor: ConsensusMonitor,
    buffers: DestinationBuffers,
    risk: Box<dyn RiskAssessor>,
    verifier_id: String,
}

impl ZeroTrustGate {
    /// Create a gate over the given registry with the baseline risk assessor.
    pub fn new(config: GateConfig, registry: Arc<TrustRegistry>) -> Self {
        let verifier_id = "primary-verifier".to_string();
        Self {
            monitor: ConsensusMonitor::new(config.attack_window_secs, config.attack_alert_threshold),
            flags: FlagLedger::new(verifier_id.clone()),
            config,
            registry,
            replay: ReplayGuard::new(),
            buffers: DestinationBuffers::new(),
            risk: Box::new(BaselineRiskAssessor),
            verifier_id,
        }
    }

    /// Replace the risk assessor (pluggable judgment collaborator).
    pub fn with_risk_assessor(mut self, assessor: Box<dyn RiskAssessor>) -> Self {
        self.risk = assessor;
        self
    }

    /// Register or re-register a component in the trust registry.
    pub fn register_component(
        &self,
        component_id: impl Into<String>,
        public_key: Vec<u8>,
        trust_level: TrustLevel,
        policy_flags: BTreeSet<String>,
    ) -> Result<(), RegistryError> {
        self.registry.register(component_id, public_key, trust_level, policy_flags)
    }

    /// Submit an envelope to the gate.
    ///
    /// Verification failures are terminal for this envelope; resubmission
    /// with a fresh nonce and timestamp is the caller's decision.
    pub fn submit(&self, envelope: &Envelope) -> SubmitOutcome {
        let now = now_secs();

        if let Err(reason) = self.verify(envelope, now) {
            self.record_rejection(envelope, reason, now);
            return SubmitOutcome::Rejected { reason };
        }

        let risk = self.risk.assess(envelope);
        if risk.score >= self.config.risk_delivery_threshold {
            warn!(
                envelope_id = %envelope.id,
                score = risk.score,
                "envelope verified but withheld on risk grounds"
            );
            return SubmitOutcome::Withheld { risk };
        }

        self.buffers.deliver(envelope, &risk, now);
        debug!(
            envelope_id = %envelope.id,
            destinations = envelope.destinations.len(),
            "envelope delivered"
        );
        SubmitOutcome::Delivered { risk }
    }

    /// Run the four verification stages in order; first failure wins.
    fn verify(&self, envelope: &Envelope, now: u64) -> Result<(), RejectReason> {
        // Stage 1: structure.
        envelope
            .validate_structure(self.config.require_signatures)
            .map_err(|_| RejectReason::MalformedEnvelope)?;

        // Stage 2: signature. Registry lookup is mandatory even when
        // cryptographic enforcement is off.
        let entry = self
            .registry
            .lookup(&envelope.sender_id)
            .ok_or(RejectReason::UnknownSender)?;

        if self.config.require_signatures {
            let signature = envelope
                .signature
                .as_ref()
                .ok_or(RejectReason::MalformedEnvelope)?;
            if !zerobus_crypto::verify(&envelope.signing_bytes(), signature, &entry.public_key) {
                return Err(RejectReason::InvalidSignature);
            }
        }

        // Stage 3: trust policy.
        let age = now.abs_diff(envelope.created_at);
        if age > self.config.freshness_window_secs {
            return Err(RejectReason::StaleOrFutureTimestamp);
        }

        if entry.status == ComponentStatus::Suspended {
            return Err(RejectReason::PolicyViolation);
        }

        if envelope.trust_claim == crate::envelope::TrustClaim::ConstitutionallyProtected {
            let registry_backed = entry.trust_level == TrustLevel::ConstitutionallyProtected;
            let flagged = envelope.policy_flags.contains("protected");
            if !(registry_backed && flagged) {
                return Err(RejectReason::PolicyViolation);
            }
        }

        // Stage 4: replay. Single atomic test-and-insert.
        if !self
            .replay
            .check_and_record(&envelope.sender_id, &envelope.nonce, envelope.created_at)
        {
            return Err(RejectReason::ReplayDetected);
        }

        Ok(())
    }

    fn record_rejection(&self, envelope: &Envelope, reason: RejectReason, now: u64) {
        warn!(
            envelope_id = %envelope.id,
            sender_id = %envelope.sender_id,
            reason = %reason,
            "envelope rejected"
        );

        if let Some(flag_reason) = reason.flag_reason() {
            self.flags.raise(flag_reason, envelope.context_digest(), now);
        }

        // A policy violation aimed at a protected component is a bypass
        // attempt; feed the monitor.
        if reason == RejectReason::PolicyViolation {
            let attackers: BTreeSet<String> = std::iter::once(envelope.sender_id.clone()).collect();
            for destination in &envelope.destinations {
                let protected = self
                    .registry
                    .lookup(destination)
                    .map(|e| e.trust_level == TrustLevel::ConstitutionallyProtected)
                    .unwrap_or(false);
                if protected {
                    if let Some(alert) =
                        self.monitor.record_attempt(destination, attackers.clone(), now)
                    {
                        self.broadcast_alert(&alert, now);
                    }
                }
            }
        }
    }

    /// Explicitly report an observed bypass attempt (guardian seam).
    ///
    /// Feeds the monitor directly; if the sliding-window pattern crosses the
    /// alert threshold the resulting CRITICAL alert is broadcast to every
    /// active component, bypassing all verification stages.
    pub fn report_bypass_attempt(
        &self,
        target_component_id: &str,
        attackers: BTreeSet<String>,
    ) -> Option<ConsensusAttackAlert> {
        let now = now_secs();
        let alert = self.monitor.record_attempt(target_component_id, attackers, now)?;
        self.broadcast_alert(&alert, now);
        Some(alert)
    }

    /// Deposit a CRITICAL alert into every active component's buffer.
    ///
    /// This path deliberately skips structure, signature, policy, and replay
    /// checks: the alert's audience is the whole component population, and
    /// no policy may filter it.
    fn broadcast_alert(&self, alert: &ConsensusAttackAlert, now: u64) {
        let event = GateEventBuilder::new(event_types::CONSENSUS_ATTACK)
            .severity(EventSeverity::Critical)
            .category(EventCategory::Security)
            .component(alert.target_component_id.clone())
            .message(alert.details.clone())
            .metadata("attempt_count", alert.attempts.len())
            .build();

        let recipients = self.registry.active_component_ids();
        let envelope = EnvelopeBuilder::new(self.verifier_id.clone(), EnvelopeKind::Alert)
            .destinations(recipients.clone())
            .priority(Priority::Emergency)
            .payload(json!({ "event": event, "alert": alert }))
            .build();

        let record = DeliveryRecord {
            envelope,
            risk: RiskAssessment {
                score: 0.0,
                factors: vec!["unfiltered_alert".to_string()],
            },
            routed_at: now,
        };
        self.buffers.deposit_all(&recipients, record);
    }

    /// Status of the verifier: every flag ever raised, never aged out.
    pub fn verifier_status(&self) -> VerifierStatus {
        self.flags.status()
    }

    /// Remove and return a component's delivered records, oldest first.
    pub fn drain(&self, component_id: &str) -> Vec<DeliveryRecord> {
        self.buffers.drain(component_id)
    }

    /// Number of records buffered for a component.
    pub fn buffered(&self, component_id: &str) -> usize {
        self.buffers.buffered(component_id)
    }

    /// All consensus-attack alerts emitted so far.
    pub fn alerts(&self) -> Vec<ConsensusAttackAlert> {
        self.monitor.alerts()
    }

    /// Handle to the underlying registry.
    pub fn registry(&self) -> &TrustRegistry {
        &self.registry
    }
}
