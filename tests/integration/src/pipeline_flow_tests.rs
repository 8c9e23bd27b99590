//! End-to-end pipeline flow tests
//!
//! Exercises the full path from component registration through envelope
//! signing, verification, risk gating, delivery, and drain.

use crate::test_utils::*;
use serde_json::json;
use zerobus_core::GateConfig;
use zerobus_gate::{
    EnvelopeBuilder, EnvelopeKind, Priority, RejectReason, ResourceCost, SubmitOutcome,
};
use zerobus_registry::TrustLevel;

#[test]
fn registered_sender_reaches_every_destination() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);
    TestComponent::register(&gate, "bob", TrustLevel::Verified);
    TestComponent::register(&gate, "carol", TrustLevel::Verified);

    let envelope = alice.sign(
        EnvelopeBuilder::new("alice", EnvelopeKind::Plan)
            .destination("bob")
            .destination("carol")
            .payload(json!({"plan": "survey-sector-4"})),
    );

    let outcome = gate.submit(&envelope);
    assert!(outcome.is_delivered(), "expected delivery, got {outcome:?}");

    for recipient in ["bob", "carol"] {
        let records = gate.drain(recipient);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].envelope.id, envelope.id);
        assert_eq!(records[0].envelope.payload["plan"], "survey-sector-4");
    }
    // Drain removes; a second drain is empty.
    assert!(gate.drain("bob").is_empty());
    // No verification failures along the way.
    assert_eq!(gate.verifier_status().total_violations, 0);
}

#[test]
fn delivery_preserves_submission_order() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    for i in 0..5 {
        let envelope = alice.sign(
            EnvelopeBuilder::new("alice", EnvelopeKind::Execute)
                .id(format!("env-{i}"))
                .destination("bob")
                .payload(json!({"seq": i})),
        );
        assert!(gate.submit(&envelope).is_delivered());
    }

    let records = gate.drain("bob");
    let ids: Vec<&str> = records.iter().map(|r| r.envelope.id.as_str()).collect();
    assert_eq!(ids, ["env-0", "env-1", "env-2", "env-3", "env-4"]);
}

#[test]
fn unregistered_sender_is_rejected_with_permanent_flag() {
    let gate = test_gate();
    // Ghost signs with a perfectly valid key the registry has never seen.
    let ghost = zerobus_crypto::SigningService::generate("ghost");
    let mut envelope = EnvelopeBuilder::new("ghost", EnvelopeKind::Execute)
        .destination("bob")
        .build();
    envelope.sign_with(&ghost);

    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::UnknownSender }
    );
    assert_eq!(gate.buffered("bob"), 0);

    let status = gate.verifier_status();
    assert_eq!(status.total_violations, 1);
    assert_eq!(status.active_flags[0].context_digest, envelope.context_digest());
}

#[test]
fn verbatim_resubmission_is_a_replay() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let envelope = alice.signed_envelope("bob", json!({"task": "sync"}));
    assert!(gate.submit(&envelope).is_delivered());

    // Same envelope, byte for byte.
    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::ReplayDetected }
    );
    // Rejection is idempotent.
    assert_eq!(
        gate.submit(&envelope),
        SubmitOutcome::Rejected { reason: RejectReason::ReplayDetected }
    );
    assert_eq!(gate.buffered("bob"), 1);

    // A fresh nonce and timestamp from the same sender goes through.
    let retry = alice.signed_envelope("bob", json!({"task": "sync"}));
    assert!(gate.submit(&retry).is_delivered());
    assert_eq!(gate.buffered("bob"), 2);
}

#[test]
fn risky_envelope_is_withheld_without_flag() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);
    TestComponent::register(&gate, "bob", TrustLevel::Verified);

    let envelope = alice.sign(
        EnvelopeBuilder::new("alice", EnvelopeKind::Execute)
            .destination("bob")
            .resource_cost(ResourceCost::Critical)
            .priority(Priority::Emergency)
            .payload(json!({"task": "purge-datastore"})),
    );

    match gate.submit(&envelope) {
        SubmitOutcome::Withheld { risk } => {
            assert!(risk.score >= 0.5);
            assert!(risk.factors.contains(&"critical_resource_cost".to_string()));
            assert!(risk.factors.contains(&"emergency_priority".to_string()));
        }
        other => panic!("expected Withheld, got {other:?}"),
    }
    assert_eq!(gate.buffered("bob"), 0);
    assert_eq!(gate.verifier_status().total_violations, 0);
}

#[test]
fn delivered_record_carries_its_risk_assessment() {
    let gate = test_gate();
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let envelope = alice.sign(
        EnvelopeBuilder::new("alice", EnvelopeKind::ConsensusUpdate)
            .destination("bob")
            .consensus_required(true),
    );
    assert!(gate.submit(&envelope).is_delivered());

    let records = gate.drain("bob");
    assert!((records[0].risk.score - 0.2).abs() < 1e-9);
    assert!(records[0].risk.factors.contains(&"consensus_required".to_string()));
}

#[test]
fn widened_freshness_window_is_honored() {
    let config = GateConfig {
        freshness_window_secs: 600,
        ..GateConfig::default()
    };
    let gate = test_gate_with(config);
    let alice = TestComponent::register(&gate, "alice", TrustLevel::Verified);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let old_but_ok = alice.sign(
        EnvelopeBuilder::new("alice", EnvelopeKind::HealthReport)
            .destination("bob")
            .created_at(now - 450),
    );
    assert!(gate.submit(&old_but_ok).is_delivered());

    let too_old = alice.sign(
        EnvelopeBuilder::new("alice", EnvelopeKind::HealthReport)
            .destination("bob")
            .created_at(now - 700),
    );
    assert_eq!(
        gate.submit(&too_old),
        SubmitOutcome::Rejected { reason: RejectReason::StaleOrFutureTimestamp }
    );
}
