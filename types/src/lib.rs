//! Fundamental types for the cairn protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: currency amounts, block heights, hashes and identifiers, keys,
//! unlock conditions, the transaction model, the canonical byte encoding
//! that all identity hashes are computed over, and the network parameters.

pub mod currency;
pub mod encoding;
pub mod hash;
pub mod height;
pub mod keys;
pub mod params;
pub mod transaction;
pub mod unlock;

pub use currency::Currency;
pub use encoding::CanonicalEncode;
pub use hash::{
    BlockId, FileContractId, Hash, OutputId, SiacoinOutputId, SiafundOutputId, Specifier,
    TransactionId,
};
pub use height::BlockHeight;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use transaction::{
    CoveredFields, FileContract, FileContractRevision, FileContractTermination, Segment,
    SiacoinInput, SiacoinOutput, SiafundInput, SiafundOutput, StorageProof, Transaction,
    TransactionSignature,
};
pub use unlock::{UnlockConditions, UnlockHash, UnlockPublicKey};
