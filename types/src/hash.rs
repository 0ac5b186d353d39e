//! Cryptographic hashes and the identifier newtypes built on them.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encoding::CanonicalEncode;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte Blake2b-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Hash a single byte string.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        Self::finalize(hasher)
    }

    /// Hash multiple byte slices in sequence (avoids concatenation allocation).
    pub fn of_all(parts: &[&[u8]]) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        Self::finalize(hasher)
    }

    /// Hash the canonical encoding of a value.
    pub fn of_encoded<T: CanonicalEncode + ?Sized>(value: &T) -> Self {
        Self::of(&value.canonical_bytes())
    }

    fn finalize(hasher: Blake2b256) -> Self {
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Self(output)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl CanonicalEncode for Hash {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

/// A 16-byte tag distinguishing object kinds and key algorithms in hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Specifier(pub [u8; 16]);

impl Specifier {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl CanonicalEncode for Specifier {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub Hash);

        impl $name {
            pub fn new(hash: Hash) -> Self {
                Self(hash)
            }

            pub fn as_hash(&self) -> &Hash {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl CanonicalEncode for $name {
            fn encode_to(&self, buf: &mut Vec<u8>) {
                self.0.encode_to(buf);
            }
        }
    };
}

id_type!(
    /// Identifies a block in the current path.
    BlockId
);
id_type!(
    /// Identifies a transaction by the hash of its signature-free encoding.
    TransactionId
);
id_type!(
    /// Identifies a siacoin output.
    SiacoinOutputId
);
id_type!(
    /// Identifies a siafund output.
    SiafundOutputId
);
id_type!(
    /// Identifies a file contract.
    FileContractId
);
id_type!(
    /// The wallet-side spend ledger key. Any spendable output id converts
    /// into an `OutputId`; the reverse conversion does not exist.
    OutputId
);

impl From<SiacoinOutputId> for OutputId {
    fn from(id: SiacoinOutputId) -> Self {
        Self(id.0)
    }
}

impl From<SiafundOutputId> for OutputId {
    fn from(id: SiafundOutputId) -> Self {
        Self(id.0)
    }
}

impl From<FileContractId> for OutputId {
    fn from(id: FileContractId) -> Self {
        Self(id.0)
    }
}
