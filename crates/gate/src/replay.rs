//! Nonce-based replay protection.
//!
//! Each submission is reduced to a replay key: the BLAKE3 hash of
//! (sender_id, nonce, created_at). The key set lives for the process
//! lifetime; persistence across restarts is an external concern.
//!
//! The test-and-insert is a single atomic step under one mutex, so two
//! concurrent submissions of an identical (sender, nonce, timestamp) can
//! never both be accepted. Rejection is idempotent: a detected replay is
//! not re-inserted.

use std::collections::HashSet;
use std::sync::Mutex;

/// Replay-detection set over (sender_id, nonce, created_at) tuples.
pub struct ReplayGuard {
    seen: Mutex<HashSet<[u8; 32]>>,
}

impl ReplayGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Atomically test-and-insert the replay key for a submission.
    ///
    /// Returns `true` when the tuple is fresh (and is now recorded),
    /// `false` when it was already present.
    pub fn check_and_record(&self, sender_id: &str, nonce: &str, created_at: u64) -> bool {
        let key = replay_key(sender_id, nonce, created_at);
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.insert(key)
    }

    /// Number of recorded tuples (monitoring/tests).
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn replay_key(sender_id: &str, nonce: &str, created_at: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(sender_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(nonce.as_bytes());
    hasher.update(&[0]);
    hasher.update(&created_at.to_le_bytes());
    *hasher.finalize().as_bytes()
}
