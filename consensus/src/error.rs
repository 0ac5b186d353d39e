use cairn_types::{Currency, FileContractId, SiacoinOutputId, SiafundOutputId};
use thiserror::Error;

/// The first rule a transaction breaks, in validation order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    // Structural
    #[error("transaction combines storage proofs with outputs or contracts")]
    StorageProofWithForbiddenOutputs,

    #[error("whole-transaction signature also names explicit field indices")]
    WholeTransactionWithExplicitFields,

    #[error("covered fields reference elements the transaction does not have")]
    InvalidCoveredFields,

    // Missing referents
    #[error("transaction spends a nonexisting siacoin output {0}")]
    MissingSiacoinOutput(SiacoinOutputId),

    #[error("transaction spends a nonexisting siafund output {0}")]
    MissingSiafundOutput(SiafundOutputId),

    #[error("transaction references a nonexisting file contract {0}")]
    MissingFileContract(FileContractId),

    // Consensus rules
    #[error("unlock conditions do not match the output's unlock hash")]
    UnlockHashMismatch,

    #[error("unlock condition timelock has not been met")]
    TimelockNotMet,

    #[error("siacoin inputs ({inputs}) do not equal siacoin outputs ({outputs})")]
    InputsOutputsMismatch { inputs: Currency, outputs: Currency },

    #[error("file contract must start in the future")]
    ContractStartInPast,

    #[error("file contract duration must be at least one block")]
    ContractDurationZero,

    #[error("file contract proof outputs do not sum to the payout")]
    ContractPayoutMismatch,

    #[error("contract termination payouts do not sum to the contract payout")]
    ContractTerminationMismatch,

    #[error("no block found at the contract's trigger height")]
    TriggerBlockNotFound,

    #[error("provided storage proof is invalid")]
    StorageProofInvalid,

    #[error("created siafund output has a nonzero claim start")]
    NonZeroClaimStart,

    #[error("siafund inputs ({inputs}) do not equal siafund outputs ({outputs})")]
    SiafundInputsOutputsMismatch { inputs: Currency, outputs: Currency },

    // Signatures
    #[error("signature does not correspond to any input or termination")]
    UnrelatedSignature,

    #[error("signature names a public key index that does not exist")]
    InvalidPublicKeyIndex,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("insufficient signatures: required {required}, got {got}")]
    InsufficientSignatures { required: u64, got: u64 },
}
