//! The envelope: a signed unit of inter-component communication.
//!
//! One tagged type covers both point-to-point messages and multi-destination
//! packets; the `destinations` list carries the routing fan-out, so there are
//! no structural type-checking branches downstream. Every field except
//! `signature` participates in the canonical byte encoding the signature
//! covers, so mutating any covered field invalidates the signature.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use thiserror::Error;
use zerobus_crypto::{canonical_bytes, Signature, SigningService};

/// Kind of inter-component message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Request for verification of data or a claim
    VerificationRequest,
    /// Proposed plan of action
    Plan,
    /// Instruction to execute an action
    Execute,
    /// Consensus state update
    ConsensusUpdate,
    /// Component health report
    HealthReport,
    /// System alert
    Alert,
}

/// Privilege level an envelope asserts for its sender.
///
/// A claim is only honored when the trust registry independently backs it;
/// self-declared elevation is rejected by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustClaim {
    /// No elevated privilege claimed
    Provisional,
    /// Sender claims verified standing
    Verified,
    /// Sender claims constitutional protection
    ConstitutionallyProtected,
}

/// Scheduling priority of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background traffic
    Low,
    /// Default priority
    Normal,
    /// Elevated priority
    High,
    /// Emergency traffic
    Emergency,
}

/// Declared resource cost of acting on an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCost {
    /// Negligible cost
    Low,
    /// Moderate cost
    Medium,
    /// Significant cost
    High,
    /// Critical cost, gates delivery on risk
    Critical,
}

/// Structural validity errors for an envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    /// A required string field is empty
    #[error("Required field is empty: {0}")]
    EmptyField(&'static str),

    /// The destinations list is empty or contains an empty id
    #[error("Destinations must be a non-empty list of component ids")]
    InvalidDestinations,

    /// No signature attached while signature enforcement is on
    #[error("Envelope is unsigned")]
    MissingSignature,
}

/// A signed unit of inter-component communication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Opaque unique identifier
    pub id: String,
    /// Sending component id
    pub sender_id: String,
    /// Ordered, non-empty list of destination component ids
    pub destinations: Vec<String>,
    /// Message kind
    pub kind: EnvelopeKind,
    /// Opaque structured content
    pub payload: Value,
    /// Creation time (Unix epoch seconds)
    pub created_at: u64,
    /// Caller-supplied randomness for replay detection
    pub nonce: String,
    /// Privilege level asserted for the sender
    pub trust_claim: TrustClaim,
    /// Policy flags asserted by the sender
    pub policy_flags: BTreeSet<String>,
    /// Scheduling priority
    pub priority: Priority,
    /// Declared resource cost
    pub resource_cost: ResourceCost,
    /// Whether acting on this envelope requires consensus
    pub consensus_required: bool,
    /// Detached signature over the canonical encoding of all other fields
    pub signature: Option<Signature>,
}

impl Envelope {
    /// Canonical bytes covered by the signature: every field except
    /// `signature`, in a stable encoding.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let view = json!({
            "id": self.id,
            "sender_id": self.sender_id,
            "destinations": self.destinations,
            "kind": self.kind,
            "payload": self.payload,
            "created_at": self.created_at,
            "nonce": self.nonce,
            "trust_claim": self.trust_claim,
            "policy_flags": self.policy_flags,
            "priority": self.priority,
            "resource_cost": self.resource_cost,
            "consensus_required": self.consensus_required,
        });
        canonical_bytes(&view)
    }

    /// Sign the envelope, replacing any existing signature.
    pub fn sign_with(&mut self, service: &SigningService) {
        let bytes = self.signing_bytes();
        self.signature = Some(service.sign(&bytes));
    }

    /// Non-reversible truncated digest of the signed content, used for flag
    /// context without retaining the offending envelope.
    pub fn context_digest(&self) -> String {
        let hash = blake3::hash(&self.signing_bytes());
        hex::encode(&hash.as_bytes()[..8])
    }

    /// Check structural validity: required fields present and non-empty,
    /// destinations non-empty, signature attached when required.
    pub fn validate_structure(&self, require_signature: bool) -> Result<(), StructureError> {
        if self.id.is_empty() {
            return Err(StructureError::EmptyField("id"));
        }
        if self.sender_id.is_empty() {
            return Err(StructureError::EmptyField("sender_id"));
        }
        if self.nonce.is_empty() {
            return Err(StructureError::EmptyField("nonce"));
        }
        if self.destinations.is_empty() || self.destinations.iter().any(|d| d.is_empty()) {
            return Err(StructureError::InvalidDestinations);
        }
        if require_signature && self.signature.is_none() {
            return Err(StructureError::MissingSignature);
        }
        Ok(())
    }
}

/// Builder for envelopes.
pub struct EnvelopeBuilder {
    envelope: Envelope,
}

impl EnvelopeBuilder {
    /// Start building an envelope from a sender and kind.
    ///
    /// Defaults: generated id and nonce, current timestamp, null payload,
    /// `Provisional` trust claim, `Normal` priority, `Low` resource cost,
    /// no consensus requirement.
    pub fn new(sender_id: impl Into<String>, kind: EnvelopeKind) -> Self {
        Self {
            envelope: Envelope {
                id: generate_id(),
                sender_id: sender_id.into(),
                destinations: Vec::new(),
                kind,
                payload: Value::Null,
                created_at: now_secs(),
                nonce: generate_nonce(),
                trust_claim: TrustClaim::Provisional,
                policy_flags: BTreeSet::new(),
                priority: Priority::Normal,
                resource_cost: ResourceCost::Low,
                consensus_required: false,
                signature: None,
            },
        }
    }

    /// Override the generated id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.envelope.id = id.into();
        self
    }

    /// Add one destination, preserving order.
    pub fn destination(mut self, component_id: impl Into<String>) -> Self {
        self.envelope.destinations.push(component_id.into());
        self
    }

    /// Replace the destination list.
    pub fn destinations(mut self, component_ids: Vec<String>) -> Self {
        self.envelope.destinations = component_ids;
        self
    }

    /// Set the payload.
    pub fn payload(mut self, payload: Value) -> Self {
        self.envelope.payload = payload;
        self
    }

    /// Override the creation timestamp (epoch seconds).
    pub fn created_at(mut self, created_at: u64) -> Self {
        self.envelope.created_at = created_at;
        self
    }

    /// Override the generated nonce.
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.envelope.nonce = nonce.into();
        self
    }

    /// Set the trust claim.
    pub fn trust_claim(mut self, claim: TrustClaim) -> Self {
        self.envelope.trust_claim = claim;
        self
    }

    /// Add a policy flag.
    pub fn policy_flag(mut self, flag: impl Into<String>) -> Self {
        self.envelope.policy_flags.insert(flag.into());
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.envelope.priority = priority;
        self
    }

    /// Set the resource cost.
    pub fn resource_cost(mut self, cost: ResourceCost) -> Self {
        self.envelope.resource_cost = cost;
        self
    }

    /// Set whether consensus is required.
    pub fn consensus_required(mut self, required: bool) -> Self {
        self.envelope.consensus_required = required;
        self
    }

    /// Build the (unsigned) envelope.
    pub fn build(self) -> Envelope {
        self.envelope
    }
}

fn generate_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("env-{nanos:x}")
}

fn generate_nonce() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub(crate) fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
