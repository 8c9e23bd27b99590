//! Component trust registry for ZeroBus.
//!
//! Maps component identity to its public key, trust level, and policy flags.
//! Entries are owned exclusively by the registry: components cannot modify
//! their own entry, only registry administration (an external collaborator)
//! may re-register or suspend. The verification pipeline consults this
//! registry on every submission; a sender's envelope-level trust claim is
//! only honored when the registry independently backs it.
//!
//! Reads are lock-free with respect to each other (`RwLock` read-mostly);
//! a reader always sees either the previous entry or the fully written
//! replacement, never a torn one.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;
use zerobus_crypto::PUBLIC_KEY_LEN;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Supplied public key has the wrong length or format
    #[error("Invalid public key: got {got} bytes, expected {expected}")]
    InvalidKey {
        /// Actual key length supplied
        got: usize,
        /// Required key length
        expected: usize,
    },

    /// Component is not present in the registry
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
}

/// Trust level recorded for a component.
///
/// Ordering matters: `ConstitutionallyProtected` is the only level that
/// authorizes the matching envelope trust claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Newly registered, no sustained track record
    Provisional,
    /// Signature-verified with sustained performance
    Verified,
    /// Constitutionally protected verifier; cannot be consensus-overridden
    ConstitutionallyProtected,
}

/// Registration status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Component may send and receive
    Active,
    /// Component is administratively suspended
    Suspended,
}

/// A registry entry for one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Component identifier
    pub component_id: String,
    /// Raw Ed25519 public key bytes
    pub public_key: Vec<u8>,
    /// Registry-backed trust level
    pub trust_level: TrustLevel,
    /// Policy flags granted at registration
    pub policy_flags: BTreeSet<String>,
    /// Registration time (Unix epoch seconds)
    pub registered_at: u64,
    /// Current status
    pub status: ComponentStatus,
}

/// Component identity -> public key, trust level, and policy flags.
pub struct TrustRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl TrustRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register or re-register a component (upsert).
    ///
    /// Fails with [`RegistryError::InvalidKey`] when the key is not a raw
    /// 32-byte Ed25519 public key. Re-registration replaces the whole entry
    /// atomically.
    pub fn register(
        &self,
        component_id: impl Into<String>,
        public_key: Vec<u8>,
        trust_level: TrustLevel,
        policy_flags: BTreeSet<String>,
    ) -> Result<(), RegistryError> {
        if public_key.len() != PUBLIC_KEY_LEN {
            return Err(RegistryError::InvalidKey {
                got: public_key.len(),
                expected: PUBLIC_KEY_LEN,
            });
        }

        let component_id = component_id.into();
        let entry = RegistryEntry {
            component_id: component_id.clone(),
            public_key,
            trust_level,
            policy_flags,
            registered_at: now_secs(),
            status: ComponentStatus::Active,
        };

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        debug!(component_id = %component_id, trust_level = ?trust_level, "component registered");
        entries.insert(component_id, entry);
        Ok(())
    }

    /// Look up a component's entry. Returns a cloned snapshot.
    pub fn lookup(&self, component_id: &str) -> Option<RegistryEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(component_id).cloned()
    }

    /// Administratively set a component's status.
    ///
    /// Registry administration seam; components cannot invoke this on
    /// themselves through the message path.
    pub fn set_status(
        &self,
        component_id: &str,
        status: ComponentStatus,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.get_mut(component_id) {
            Some(entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(RegistryError::UnknownComponent(component_id.to_string())),
        }
    }

    /// All currently Active component ids, for broadcast fan-out.
    pub fn active_component_ids(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = entries
            .values()
            .filter(|e| e.status == ComponentStatus::Active)
            .map(|e| e.component_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when no components are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TrustRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
