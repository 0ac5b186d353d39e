//! Host-side contract-manager persistence.
//!
//! The contract manager durably tracks which sectors live where, so that
//! storage-proof challenges can be answered and a restart reconstructs the
//! exact sector layout. Persistence is three flat formats:
//!
//! - a settings file (salt + storage-folder list), replaced atomically
//! - one metadata file per storage folder holding fixed 14-byte records
//! - one sector file per storage folder holding the raw sector slots

pub mod error;
pub mod manager;
pub mod sector;
pub mod settings;
pub mod storage_folder;
pub mod usage;

pub use error::HostError;
pub use manager::ContractManager;
pub use sector::{SectorId, SectorLocation};
pub use settings::{SavedSettings, SavedStorageFolder};
pub use storage_folder::StorageFolder;
