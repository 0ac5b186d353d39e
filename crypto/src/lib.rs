//! Cryptographic primitives for the cairn protocol.
//!
//! - **Ed25519** for spend signatures
//! - **Blake2b-256** for hashing (provided by `cairn_types::Hash`)
//! - Segment Merkle trees for building and verifying storage proofs

pub mod keys;
pub mod merkle;
pub mod sign;

pub use keys::{
    generate_keypair, keypair_from_index, keypair_from_private, keypair_from_seed,
    public_from_private,
};
pub use merkle::{
    build_segment_proof, segment_root, segments_for_file_size, verify_segment,
};
pub use sign::{sign_hash, verify_hash};
