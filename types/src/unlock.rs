//! Unlock conditions: the predicate authorizing a spend, and its hash.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::{self, CanonicalEncode};
use crate::hash::{Hash, Specifier};
use crate::height::BlockHeight;
use crate::keys::PublicKey;
use crate::params::SPECIFIER_ED25519;

/// The canonical hash of a set of unlock conditions.
///
/// Outputs commit to this hash; the spending input must reveal conditions
/// that hash back to it. Two condition sets with the same hash are
/// byte-identical after canonical encoding.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnlockHash(pub Hash);

impl UnlockHash {
    pub fn new(hash: Hash) -> Self {
        Self(hash)
    }

    pub fn as_hash(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Display for UnlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl CanonicalEncode for UnlockHash {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.0.encode_to(buf);
    }
}

/// One public key entry inside unlock conditions.
///
/// The algorithm specifier leaves room for future key types; verifiers treat
/// keys with an unrecognized algorithm as always valid so that old nodes
/// accept transactions using keys introduced by an upgrade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockPublicKey {
    pub algorithm: Specifier,
    pub key: Vec<u8>,
}

impl UnlockPublicKey {
    /// An Ed25519 key entry.
    pub fn ed25519(key: PublicKey) -> Self {
        Self {
            algorithm: SPECIFIER_ED25519,
            key: key.0.to_vec(),
        }
    }

    pub fn is_ed25519(&self) -> bool {
        self.algorithm == SPECIFIER_ED25519
    }
}

impl CanonicalEncode for UnlockPublicKey {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.algorithm.encode_to(buf);
        encoding::write_bytes(buf, &self.key);
    }
}

/// The conditions that must be met to spend an output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockConditions {
    pub timelock: BlockHeight,
    pub public_keys: Vec<UnlockPublicKey>,
    pub signatures_required: u64,
}

impl UnlockConditions {
    /// Single-key conditions with no timelock, the common wallet shape.
    pub fn standard(key: PublicKey) -> Self {
        Self {
            timelock: BlockHeight::ZERO,
            public_keys: vec![UnlockPublicKey::ed25519(key)],
            signatures_required: 1,
        }
    }

    /// `signatures_required` can never exceed the number of keys.
    pub fn is_well_formed(&self) -> bool {
        self.signatures_required <= self.public_keys.len() as u64
    }

    /// The canonical hash these conditions are identified by.
    pub fn unlock_hash(&self) -> UnlockHash {
        UnlockHash(Hash::of_encoded(self))
    }
}

impl CanonicalEncode for UnlockConditions {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.timelock.encode_to(buf);
        encoding::write_list(buf, &self.public_keys);
        encoding::write_u64(buf, self.signatures_required);
    }
}
