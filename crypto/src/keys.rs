//! Ed25519 key generation.

use cairn_types::{Hash, KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::RngCore;

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    keypair_from_seed(&seed)
}

/// Derive a key pair deterministically from a 32-byte seed and an index.
///
/// The private scalar is `H(seed || index_le)`, so one seed yields an
/// unbounded ordered family of keys.
pub fn keypair_from_index(seed: &[u8; 32], index: u64) -> KeyPair {
    let expanded = expand_seed(seed, index);
    keypair_from_seed(&expanded)
}

/// Build a key pair directly from 32 bytes of private key material.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(*seed),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}

fn expand_seed(seed: &[u8; 32], index: u64) -> [u8; 32] {
    *Hash::of_all(&[seed, &index.to_le_bytes()]).as_bytes()
}
