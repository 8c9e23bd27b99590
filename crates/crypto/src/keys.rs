//! Ed25519 keypair helpers and public-key fingerprints.
//!
//! Key persistence (generation to disk, secure storage, loading) is the
//! responsibility of an external collaborator. This module only covers
//! in-memory keypair generation and the fingerprint derivation that binds
//! signatures to the public key they verify against.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use zeroize::Zeroize;

/// Raw Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of a rendered key fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 16;

/// An in-memory Ed25519 keypair.
pub struct Keypair {
    /// Private signing half. Never serialized.
    pub signing: SigningKey,
    /// Public verifying half.
    pub verifying: VerifyingKey,
}

/// Generate a fresh Ed25519 keypair from OS entropy.
pub fn generate_keypair() -> Keypair {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    let signing = SigningKey::from_bytes(&secret);
    secret.zeroize();
    let verifying = signing.verifying_key();
    Keypair { signing, verifying }
}

/// Derive the fingerprint of a raw public key.
///
/// BLAKE3 of the raw key bytes, truncated to 16 hex characters. The result
/// is embedded in every [`Signature`](crate::Signature) and re-checked at
/// verification time.
pub fn fingerprint(public_key_bytes: &[u8]) -> String {
    let hash = blake3::hash(public_key_bytes);
    hex::encode(&hash.as_bytes()[..FINGERPRINT_HEX_LEN / 2])
}
