//! Configuration for the ZeroBus verification gate.
//!
//! All enforcement switches are explicit constructor inputs. There is no
//! environment-variable toggle: a pipeline either enforces signatures or it
//! does not, and the choice is visible at the call site that built it.

#[cfg(feature = "toml")]
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

/// Configuration for a [`ZeroTrustGate`] instance.
///
/// [`ZeroTrustGate`]: https://docs.rs/zerobus-gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum allowed distance between an envelope's `created_at` and the
    /// gate's clock, in seconds. Envelopes outside this window are rejected.
    pub freshness_window_secs: u64,
    /// When false, the cryptographic signature check is skipped. Registry
    /// lookup of the sender is still mandatory.
    pub require_signatures: bool,
    /// Accepted envelopes with a risk score at or above this threshold are
    /// withheld from delivery.
    pub risk_delivery_threshold: f64,
    /// Sliding window for consensus-bypass attempt tracking, in seconds.
    pub attack_window_secs: u64,
    /// Number of windowed bypass attempts against one target that triggers
    /// a critical alert.
    pub attack_alert_threshold: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: 300,
            require_signatures: true,
            risk_delivery_threshold: 0.5,
            attack_window_secs: 3600,
            attack_alert_threshold: 3,
        }
    }
}

impl GateConfig {
    /// Load a configuration from a TOML file.
    ///
    /// Fields absent from the file take their [`Default`] values. Returns
    /// [`CoreError::Io`] when the file cannot be read and
    /// [`CoreError::Config`] when it does not parse.
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| CoreError::Config(e.to_string()))?;
        Ok(config)
    }
}
