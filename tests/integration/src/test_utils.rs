//! Shared helpers for gate integration tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use zerobus_core::GateConfig;
use zerobus_crypto::SigningService;
use zerobus_gate::{Envelope, EnvelopeBuilder, EnvelopeKind, ZeroTrustGate};
use zerobus_registry::{TrustLevel, TrustRegistry};

/// A registered test component with its signing keys.
pub struct TestComponent {
    pub component_id: String,
    pub signer: SigningService,
}

impl TestComponent {
    /// Generate keys and register the component at the given trust level.
    /// Constitutionally protected components get the "protected" policy flag.
    pub fn register(gate: &ZeroTrustGate, component_id: &str, trust_level: TrustLevel) -> Self {
        let signer = SigningService::generate(component_id);
        let mut policy_flags = BTreeSet::new();
        if trust_level == TrustLevel::ConstitutionallyProtected {
            policy_flags.insert("protected".to_string());
        }
        gate.register_component(component_id, signer.public_key(), trust_level, policy_flags)
            .expect("registration should succeed");
        Self {
            component_id: component_id.to_string(),
            signer,
        }
    }

    /// Build and sign a point-to-point envelope to one destination.
    pub fn signed_envelope(&self, destination: &str, payload: serde_json::Value) -> Envelope {
        let mut envelope = EnvelopeBuilder::new(&self.component_id, EnvelopeKind::Execute)
            .id(uuid::Uuid::new_v4().to_string())
            .destination(destination)
            .payload(payload)
            .build();
        envelope.sign_with(&self.signer);
        envelope
    }

    /// Build and sign an envelope from a prepared builder.
    pub fn sign(&self, builder: EnvelopeBuilder) -> Envelope {
        let mut envelope = builder.build();
        envelope.sign_with(&self.signer);
        envelope
    }
}

/// A gate over a fresh registry with default configuration.
pub fn test_gate() -> ZeroTrustGate {
    test_gate_with(GateConfig::default())
}

/// A gate with a custom configuration.
pub fn test_gate_with(config: GateConfig) -> ZeroTrustGate {
    init_test_logging();
    ZeroTrustGate::new(config, Arc::new(TrustRegistry::new()))
}

/// Install a subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_test_logging() {
    zerobus_core::logging::try_init();
}
