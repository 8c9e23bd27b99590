//! Risk assessment for accepted envelopes.
//!
//! Acceptance and delivery are distinct decisions: an envelope can be
//! cryptographically valid yet withheld from delivery on risk grounds.
//! The scoring here is a fixed deterministic function; [`RiskAssessor`] is
//! the seam where a pluggable judgment collaborator (human or model review)
//! would slot in.

use crate::envelope::{Envelope, Priority, ResourceCost};
use serde::{Deserialize, Serialize};

/// Risk assessment attached to every delivered record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Scalar risk score
    pub score: f64,
    /// Human-readable factors that contributed to the score
    pub factors: Vec<String>,
}

/// Judgment seam: maps an accepted envelope to a risk assessment.
pub trait RiskAssessor: Send + Sync {
    /// Assess the risk of acting on an envelope.
    fn assess(&self, envelope: &Envelope) -> RiskAssessment;
}

/// Deterministic baseline scoring.
#[derive(Debug, Default)]
pub struct BaselineRiskAssessor;

impl BaselineRiskAssessor {
    /// Score every envelope starts from.
    pub const BASELINE: f64 = 0.1;
    /// Increment for `ResourceCost::Critical`.
    pub const CRITICAL_COST: f64 = 0.3;
    /// Increment for `Priority::Emergency`.
    pub const EMERGENCY_PRIORITY: f64 = 0.2;
    /// Increment when consensus is required.
    pub const CONSENSUS_REQUIRED: f64 = 0.1;
}

impl RiskAssessor for BaselineRiskAssessor {
    fn assess(&self, envelope: &Envelope) -> RiskAssessment {
        let mut score = Self::BASELINE;
        let mut factors = vec!["baseline".to_string()];

        if envelope.resource_cost == ResourceCost::Critical {
            score += Self::CRITICAL_COST;
            factors.push("critical_resource_cost".to_string());
        }
        if envelope.priority == Priority::Emergency {
            score += Self::EMERGENCY_PRIORITY;
            factors.push("emergency_priority".to_string());
        }
        if envelope.consensus_required {
            score += Self::CONSENSUS_REQUIRED;
            factors.push("consensus_required".to_string());
        }

        RiskAssessment { score, factors }
    }
}
