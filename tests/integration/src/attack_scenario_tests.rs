//! Attack scenario tests
//!
//! Adversarial flows the gate must survive: signature forgery, in-flight
//! tampering, privilege escalation via self-declared trust claims, and
//! coordinated consensus-bypass campaigns against protected components.

use crate::test_utils::*;
use serde_json::json;
use zerobus_core::EventSeverity;
use zerobus_crypto::SigningService;
use zerobus_gate::{
    EnvelopeBuilder, EnvelopeKind, RejectReason, SubmitOutcome, TrustClaim,
};
use zerobus_registry::TrustLevel;

#[test]
fn impostor_with_own_key_cannot_speak_for_another() {
    let gate = test_gate();
    TestComponent::register(&gate, "alice", TrustLevel::Verified);

    // Mallory holds a valid keypair but claims alice's identity.
    let mallory = SigningService::generate("alice");
    let mut envelope = EnvelopeBuilder::new("alice", EnvelopeKind::Execute)
        .destination("bob")
        .payload(json!({"task": "grant-access", "to": "mallory"}))
        .build();
    envelope.sign_with(&mallory);

    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::InvalidSignature }
    );
}

#[test]
fn any_field_tampered_in_flight_is_detected() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let signed = alice.signed_envelope("bob", json!({"amount": 10}));

    let mut tampered = signed.clone();
    tampered.payload = json!({"amount": 10000});
    assert_eq!(
        gate.submit(&tampered),
        SubmitOutcome::Rejected { reason: RejectReason::InvalidSignature }
    );

    let mut tampered = signed.clone();
    tampered.destinations.push("mallory".to_string());
    assert_eq!(
        gate.submit(&tampered),
        SubmitOutcome::Rejected { reason: RejectReason::InvalidSignature }
    );

    let mut tampered = signed;
    tampered.trust_claim = TrustClaim::ConstitutionallyProtected;
    tampered.policy_flags.insert("protected".to_string());
    assert_eq!(
        gate.submit(&tampered),
        SubmitOutcome::Rejected { reason: RejectReason::InvalidSignature }
    );
}

#[test]
fn self_declared_constitutional_claim_is_escalation() {
    let gate = test_gate();
    let mallory = TestComponent::register(&gate, "mallory", TrustLevel::Provisional);
    TestComponent::register(&gate, "bob", TrustLevel::Verified);

    // Properly signed by its real sender; the lie is in the claim, and the
    // registry does not back it.
    let envelope = mallory.sign(
        EnvelopeBuilder::new("mallory", EnvelopeKind::ConsensusUpdate)
            .destination("bob")
            .trust_claim(TrustClaim::ConstitutionallyProtected)
            .policy_flag("protected")
            .payload(json!({"override": "safety-check"})),
    );

    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::PolicyViolation }
    );
    assert_eq!(gate.buffered("bob"), 0);
}

#[test]
fn coordinated_campaign_against_protected_verifier_alerts_everyone() {
    let gate = test_gate();
    TestComponent::register(&gate, "guardian", TrustLevel::ConstitutionallyProtected);
    TestComponent::register(&gate, "bystander", TrustLevel::Verified);

    // Three distinct attackers, each making one escalation attempt against
    // the protected guardian within the window.
    for attacker in ["mallory-1", "mallory-2", "mallory-3"] {
        let component = TestComponent::register(&gate, attacker, TrustLevel::Provisional);
        let envelope = component.sign(
            EnvelopeBuilder::new(attacker, EnvelopeKind::ConsensusUpdate)
                .destination("guardian")
                .trust_claim(TrustClaim::ConstitutionallyProtected)
                .policy_flag("protected")
                .payload(json!({"proposal": "disable-guardian"})),
        );
        assert_eq!(
            gate.submit(&envelope),
            SubmitOutcome::Rejected { reason: RejectReason::PolicyViolation }
        );
    }

    let alerts = gate.alerts();
    assert_eq!(alerts.len(), 1, "exactly one alert for the campaign");
    let alert = &alerts[0];
    assert_eq!(alert.severity, EventSeverity::Critical);
    assert_eq!(alert.target_component_id, "guardian");
    assert_eq!(alert.attempts.len(), 3);
    let attackers: Vec<&String> = alert
        .attempts
        .iter()
        .flat_map(|a| a.attackers.iter())
        .collect();
    assert_eq!(attackers.len(), 3);

    // Every active component received the broadcast, including bystanders
    // and the attackers themselves.
    for component in ["guardian", "bystander", "mallory-1", "mallory-2", "mallory-3"] {
        let records = gate.drain(component);
        let alert_records: Vec<_> = records
            .iter()
            .filter(|r| r.envelope.kind == EnvelopeKind::Alert)
            .collect();
        assert_eq!(alert_records.len(), 1, "no alert delivered to {component}");
        assert_eq!(
            alert_records[0].envelope.payload["alert"]["target_component_id"],
            "guardian"
        );
    }

    // Each escalation attempt also left a permanent flag.
    assert_eq!(gate.verifier_status().total_violations, 3);
}

#[test]
fn single_attacker_hammering_does_not_alert() {
    let gate = test_gate();
    TestComponent::register(&gate, "guardian", TrustLevel::ConstitutionallyProtected);
    let mallory = TestComponent::register(&gate, "mallory", TrustLevel::Provisional);

    for _ in 0..5 {
        let envelope = mallory.sign(
            EnvelopeBuilder::new("mallory", EnvelopeKind::ConsensusUpdate)
                .destination("guardian")
                .trust_claim(TrustClaim::ConstitutionallyProtected)
                .policy_flag("protected"),
        );
        gate.submit(&envelope);
    }

    // Five rejections, five flags, but one attacker is not a consensus
    // attack.
    assert!(gate.alerts().is_empty());
    assert_eq!(gate.verifier_status().total_violations, 5);
}

#[test]
fn suspension_cuts_off_a_previously_trusted_sender() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let first = alice.signed_envelope("bob", json!({"task": "ok"}));
    assert!(gate.submit(&first).is_delivered());

    gate.registry()
        .set_status("alice", zerobus_registry::ComponentStatus::Suspended)
        .unwrap();

    let second = alice.signed_envelope("bob", json!({"task": "ok"}));
    assert_eq!(
        gate.submit(&second),
        SubmitOutcome::Rejected { reason: RejectReason::PolicyViolation }
    );
}

#[test]
fn key_rotation_invalidates_old_signatures() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let envelope = alice.signed_envelope("bob", json!({"task": "pre-rotation"}));

    // Re-register alice under a new key before the envelope arrives.
    let rotated = SigningService::generate("alice");
    gate.register_component(
        "alice",
        rotated.public_key(),
        TrustLevel::Verified,
        Default::default(),
    )
    .unwrap();

    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::InvalidSignature }
    );
}
