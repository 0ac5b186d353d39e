//! Transaction validation against a consensus-state snapshot.
//!
//! The validator is a pure function of a transaction and a read-only view:
//! it never blocks, never mutates, and two calls with the same arguments
//! return the same result. Applying an accepted transaction to the state is
//! the caller's concern.

pub mod error;
pub mod signatures;
pub mod validation;
pub mod view;

pub use error::ValidationError;
pub use signatures::validate_signatures;
pub use validation::{
    storage_proof_segment, validate, validate_file_contracts, validate_siacoins,
    validate_siafunds, validate_storage_proof_rules, validate_storage_proofs,
    validate_terminations,
};
pub use view::{ConsensusView, Snapshot};
