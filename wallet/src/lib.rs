//! Wallet state and the transaction builder.
//!
//! The wallet is a passive holder of spend keys, unspent outputs and
//! recently-spent reservations; consensus updates are fed in through
//! explicit methods. Builders borrow the wallet, fund transactions from its
//! outputs, and sign with its keys. All shared state sits behind one
//! readers-writers lock: funding and signing take it exclusively, the
//! keyless signing path reads.

pub mod builder;
pub mod error;
pub mod keys;
pub mod sign;
pub mod wallet;

pub use builder::TransactionBuilder;
pub use error::WalletError;
pub use keys::{generate_keys, generate_spendable_key, SpendableKey};
pub use sign::sign_transaction_with_seed;
pub use wallet::Wallet;
