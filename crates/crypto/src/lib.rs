//! Cryptographic primitives for the ZeroBus trust layer.
//!
//! This crate provides:
//! - Canonical byte encoding of structured payloads (the basis for
//!   sign/verify agreement)
//! - An Ed25519 signing service with key-fingerprint binding
//! - Keypair generation helpers
//!
//! Key storage and distribution are delegated to external collaborators;
//! nothing here touches the filesystem.

pub mod canonical;
pub mod keys;
pub mod signing;

pub use canonical::canonical_bytes;
pub use keys::{fingerprint, generate_keypair, Keypair, FINGERPRINT_HEX_LEN, PUBLIC_KEY_LEN};
pub use signing::{verify, Signature, SignatureAlgorithm, SigningError, SigningService, SIGNATURE_LEN};
