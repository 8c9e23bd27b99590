//! Verification flag ledger.
//!
//! Flags are the mechanism by which constitutional protection becomes
//! unerasable: every pipeline rejection at the signature, trust-policy, or
//! replay stage appends an entry, and no API removes entries within the
//! process lifetime. However many components might "agree" a message was
//! fine, the flag stands.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Reason tag for a verification flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    /// Sender not present in the trust registry
    UnknownSender,
    /// Cryptographic signature check failed
    InvalidSignature,
    /// Timestamp outside the freshness window
    StaleOrFutureTimestamp,
    /// Trust-policy violation (constitutional protection)
    PolicyViolation,
    /// Nonce reuse detected
    ReplayDetected,
}

/// An append-only record of one verification failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFlag {
    /// When the flag was raised (Unix epoch seconds)
    pub raised_at: u64,
    /// Why
    pub reason: FlagReason,
    /// Truncated, non-reversible digest of the offending envelope
    pub context_digest: String,
    /// Verifier that raised the flag
    pub verifier_id: String,
}

/// Status report of a verifier, as returned by the status API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierStatus {
    /// Verifier identity
    pub verifier_id: String,
    /// All flags raised so far, oldest first
    pub active_flags: Vec<VerificationFlag>,
    /// Total violation count
    pub total_violations: usize,
}

/// Append-only ledger of verification flags.
///
/// Concurrent appends preserve all entries; there is no removal API.
pub struct FlagLedger {
    verifier_id: String,
    flags: Mutex<Vec<VerificationFlag>>,
}

impl FlagLedger {
    /// Create an empty ledger owned by the named verifier.
    pub fn new(verifier_id: impl Into<String>) -> Self {
        Self {
            verifier_id: verifier_id.into(),
            flags: Mutex::new(Vec::new()),
        }
    }

    /// Append a flag. Cannot fail and cannot be suppressed.
    pub fn raise(&self, reason: FlagReason, context_digest: String, raised_at: u64) {
        let flag = VerificationFlag {
            raised_at,
            reason,
            context_digest,
            verifier_id: self.verifier_id.clone(),
        };
        let mut flags = self.flags.lock().unwrap_or_else(|e| e.into_inner());
        flags.push(flag);
    }

    /// Snapshot of the current status. Never omits or ages out flags.
    pub fn status(&self) -> VerifierStatus {
        let flags = self.flags.lock().unwrap_or_else(|e| e.into_inner());
        VerifierStatus {
            verifier_id: self.verifier_id.clone(),
            active_flags: flags.clone(),
            total_violations: flags.len(),
        }
    }

    /// Number of flags raised so far.
    pub fn total(&self) -> usize {
        self.flags.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
