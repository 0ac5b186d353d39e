//! Spendable keys: unlock conditions paired with the secrets that satisfy
//! them.

use cairn_crypto::keypair_from_index;
use cairn_types::{PrivateKey, UnlockConditions};

/// The unlock conditions of a wallet address together with every secret key
/// needed to satisfy them. Multisig conditions carry several secrets.
pub struct SpendableKey {
    pub unlock_conditions: UnlockConditions,
    pub secret_keys: Vec<PrivateKey>,
}

/// Derive the spendable key at `index` of `seed`: single-signature
/// conditions over the derived Ed25519 key.
pub fn generate_spendable_key(seed: &[u8; 32], index: u64) -> SpendableKey {
    let kp = keypair_from_index(seed, index);
    SpendableKey {
        unlock_conditions: UnlockConditions::standard(kp.public),
        secret_keys: vec![kp.private],
    }
}

/// Derive the spendable keys for indices `start..end`.
pub fn generate_keys(seed: &[u8; 32], start: u64, end: u64) -> Vec<SpendableKey> {
    (start..end)
        .map(|index| generate_spendable_key(seed, index))
        .collect()
}
