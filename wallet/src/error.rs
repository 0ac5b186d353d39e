use cairn_types::{Currency, Hash};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("output is too small to spend")]
    DustOutput,

    #[error("output timelock has not matured at the current height")]
    OutputTimelock,

    #[error("output was tentatively spent within the respend window")]
    SpendHeightTooHigh,

    #[error("insufficient balance: need {needed}, have {available}")]
    LowBalance { needed: Currency, available: Currency },

    #[error("funds are sufficient but reserved by unconfirmed transactions")]
    IncompleteTransactions,

    #[error("sign has already been called on this transaction builder, multiple calls can cause issues")]
    BuilderAlreadySigned,

    #[error("transaction builder added an input that it cannot sign")]
    CannotSignInput,

    #[error("signing request references ids not present in the transaction")]
    UnknownSignatureParent,

    #[error("no transaction signature references parent {0}")]
    MissingTransactionSignature(Hash),

    #[error("could not locate a signing key within the derivation bound")]
    KeySearchExhausted,

    #[error("explicit parent ids are required when signing from a bare seed")]
    ToSignEmpty,

    #[error("covered fields reference elements the transaction does not have")]
    InvalidCoveredFields,
}
