//! Integration tests for the ZeroBus zero-trust gate
//!
//! This test suite validates:
//! - Full pipeline flow from registration through delivery and drain
//! - Attack scenarios: forgery, tampering, replay, privilege escalation
//! - Coordinated consensus-bypass detection and alert broadcast
//! - Concurrent submission behavior at the replay and routing boundaries

pub mod test_utils;

#[cfg(test)]
mod pipeline_flow_tests;

#[cfg(test)]
mod attack_scenario_tests;
