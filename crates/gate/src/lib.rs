//! Zero-trust message gate for multi-agent coordination.
//!
//! Every envelope entering the system is verified from scratch against the
//! trust registry; no component vouches for another and no verification
//! result is cached across submissions. The pipeline runs four ordered
//! stages (structure, signature, trust policy, replay) and the first failure
//! wins. Verified envelopes are then risk-scored; delivery and acceptance
//! are separate decisions.
//!
//! ```no_run
//! use std::sync::Arc;
//! use zerobus_core::GateConfig;
//! use zerobus_gate::{EnvelopeBuilder, EnvelopeKind, ZeroTrustGate};
//! use zerobus_registry::{TrustLevel, TrustRegistry};
//! use zerobus_crypto::SigningService;
//!
//! let gate = ZeroTrustGate::new(GateConfig::default(), Arc::new(TrustRegistry::new()));
//! let service = SigningService::generate("agent-a");
//! gate.register_component("agent-a", service.public_key(), TrustLevel::Verified, Default::default())?;
//!
//! let mut envelope = EnvelopeBuilder::new("agent-a", EnvelopeKind::Execute)
//!     .destination("agent-b")
//!     .build();
//! envelope.sign_with(&service);
//! let outcome = gate.submit(&envelope);
//! # Ok::<(), zerobus_registry::RegistryError>(())
//! ```

#![warn(missing_docs)]

pub mod envelope;
pub mod flags;
pub mod monitor;
pub mod pipeline;
pub mod replay;
pub mod risk;
pub mod routing;

pub use envelope::{
    Envelope, EnvelopeBuilder, EnvelopeKind, Priority, ResourceCost, StructureError, TrustClaim,
};
pub use flags::{FlagReason, VerificationFlag, VerifierStatus};
pub use monitor::{BypassAttempt, ConsensusAttackAlert, ConsensusMonitor};
pub use pipeline::{RejectReason, SubmitOutcome, ZeroTrustGate};
pub use replay::ReplayGuard;
pub use risk::{BaselineRiskAssessor, RiskAssessment, RiskAssessor};
pub use routing::{DeliveryRecord, DestinationBuffers};
