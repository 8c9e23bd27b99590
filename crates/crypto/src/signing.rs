//! Envelope signing service.
//!
//! Signs canonicalized payload bytes with Ed25519 and verifies signatures
//! against a supplied public key. Verification is deterministic and
//! side-effect-free: any malformed input (wrong lengths, undecodable bytes,
//! unsupported algorithm) yields `false` rather than an error that escapes
//! into the pipeline. "No key available for this sender" is a distinct
//! condition that callers handle before invoking [`verify`].

use crate::keys::{fingerprint, PUBLIC_KEY_LEN};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Supported signature algorithms.
///
/// Unknown algorithm tags fail deserialization; nothing outside this enum
/// is ever accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// Ed25519 over the canonical payload bytes
    Ed25519,
}

/// Errors from the signing service.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Private key material had the wrong length
    #[error("Invalid key length: {got} (expected 32)")]
    InvalidKeyLength {
        /// Actual length supplied
        got: usize,
    },

    /// Signature bytes could not be decoded
    #[error("Undecodable signature: {0}")]
    UndecodableSignature(String),
}

/// A detached signature over canonical payload bytes.
///
/// Immutable once produced. The `key_fingerprint` binds the signature to the
/// public key it verifies against; a fingerprint mismatch at verification
/// time fails the check before any cryptography runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Signature algorithm
    pub algorithm: SignatureAlgorithm,
    /// Raw signature bytes (64), carried as base64 on the wire
    #[serde(with = "b64")]
    pub signature: Vec<u8>,
    /// Identifier of the signing key (usually the component id)
    pub signer_key_id: String,
    /// BLAKE3 fingerprint of the raw public key, 16 hex characters
    pub key_fingerprint: String,
    /// Signature creation time (Unix epoch seconds)
    pub created_at: u64,
}

impl Signature {
    /// Render the signature bytes as base64 for transport.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.signature)
    }

    /// Decode signature bytes from base64.
    pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, SigningError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SigningError::UndecodableSignature(e.to_string()))
    }
}

mod b64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// Signing service holding one component's private key.
///
/// The private key never leaves this service.
pub struct SigningService {
    signing_key: SigningKey,
    signer_key_id: String,
    key_fingerprint: String,
}

impl SigningService {
    /// Create a service with a freshly generated key.
    pub fn generate(signer_key_id: impl Into<String>) -> Self {
        let pair = crate::keys::generate_keypair();
        let key_fingerprint = fingerprint(&pair.verifying.to_bytes());
        Self {
            signing_key: pair.signing,
            signer_key_id: signer_key_id.into(),
            key_fingerprint,
        }
    }

    /// Create a service from existing private key bytes.
    ///
    /// The supplied buffer is copied and the copy zeroized after use.
    pub fn from_key(signer_key_id: impl Into<String>, key_bytes: &[u8]) -> Result<Self, SigningError> {
        if key_bytes.len() != 32 {
            return Err(SigningError::InvalidKeyLength { got: key_bytes.len() });
        }

        let mut key_array = [0u8; 32];
        key_array.copy_from_slice(key_bytes);
        let signing_key = SigningKey::from_bytes(&key_array);
        key_array.zeroize();

        let key_fingerprint = fingerprint(&signing_key.verifying_key().to_bytes());
        Ok(Self {
            signing_key,
            signer_key_id: signer_key_id.into(),
            key_fingerprint,
        })
    }

    /// Raw public key bytes for registry registration.
    pub fn public_key(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    /// Identifier of the signing key.
    pub fn signer_key_id(&self) -> &str {
        &self.signer_key_id
    }

    /// Fingerprint of the public half.
    pub fn key_fingerprint(&self) -> &str {
        &self.key_fingerprint
    }

    /// Sign canonical payload bytes.
    ///
    /// Deterministic: the same payload and key always produce the same
    /// signature bytes.
    pub fn sign(&self, payload_bytes: &[u8]) -> Signature {
        let signature = self.signing_key.sign(payload_bytes);
        Signature {
            algorithm: SignatureAlgorithm::Ed25519,
            signature: signature.to_bytes().to_vec(),
            signer_key_id: self.signer_key_id.clone(),
            key_fingerprint: self.key_fingerprint.clone(),
            created_at: now_secs(),
        }
    }
}

/// Verify a signature over payload bytes against a raw public key.
///
/// Returns `true` only if:
/// - the algorithm is supported,
/// - the embedded fingerprint (if present) matches the supplied key,
/// - the signature and key have exact Ed25519 lengths, and
/// - the cryptographic check passes.
///
/// Every malformed-input case returns `false`.
pub fn verify(payload_bytes: &[u8], signature: &Signature, public_key_bytes: &[u8]) -> bool {
    match signature.algorithm {
        SignatureAlgorithm::Ed25519 => {}
    }

    if !signature.key_fingerprint.is_empty()
        && signature.key_fingerprint != fingerprint(public_key_bytes)
    {
        return false;
    }

    if signature.signature.len() != SIGNATURE_LEN || public_key_bytes.len() != PUBLIC_KEY_LEN {
        return false;
    }

    let mut key_array = [0u8; PUBLIC_KEY_LEN];
    key_array.copy_from_slice(public_key_bytes);
    let verifying_key = match VerifyingKey::from_bytes(&key_array) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let mut sig_array = [0u8; SIGNATURE_LEN];
    sig_array.copy_from_slice(&signature.signature);
    let sig = ed25519_dalek::Signature::from_bytes(&sig_array);

    verifying_key.verify_strict(payload_bytes, &sig).is_ok()
}

fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
