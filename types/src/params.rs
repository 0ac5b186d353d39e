//! Network parameters, fixed at compile time.
//!
//! Every constant here participates in consensus or an on-disk format.
//! Changing one is a hard fork or a storage migration, never a patch.

use crate::hash::Specifier;

/// Size in bytes of one Merkle-tree leaf in a contracted file.
pub const SEGMENT_SIZE: usize = 64;

/// Size in bytes of one host sector.
pub const SECTOR_SIZE: u64 = 1 << 22; // 4 MiB

/// Number of sector slots covered by one 64-bit usage-bitmap word, and the
/// unit in which storage folders grow or shrink.
pub const STORAGE_FOLDER_GRANULARITY: u64 = 64;

/// On-disk size of one sector metadata record: a 12-byte sector id followed
/// by a 2-byte little-endian reference count.
pub const SECTOR_METADATA_DISK_SIZE: u64 = 14;

/// Number of blocks an output tentatively spent by the wallet stays
/// unavailable to new builds.
pub const RESPEND_TIMEOUT: u64 = 40;

/// The siafund tax on file contract payouts, as a fraction.
pub const TAX_NUMERATOR: u64 = 4;
pub const TAX_DENOMINATOR: u64 = 100;

/// Key algorithm tag for Ed25519.
pub const SPECIFIER_ED25519: Specifier = Specifier::new(*b"ed25519\0\0\0\0\0\0\0\0\0");

/// Object kind tags mixed into derived identifiers.
pub const SPECIFIER_SIACOIN_OUTPUT: Specifier = Specifier::new(*b"siacoin output\0\0");
pub const SPECIFIER_SIAFUND_OUTPUT: Specifier = Specifier::new(*b"siafund output\0\0");
pub const SPECIFIER_FILE_CONTRACT: Specifier = Specifier::new(*b"file contract\0\0\0");

/// Contract-manager file names. The settings file lives in the manager's
/// persist directory; the other two live inside each storage folder.
pub const SETTINGS_FILE: &str = "contractmanager.json";
pub const METADATA_FILE: &str = "siahostmetadata.dat";
pub const SECTOR_FILE: &str = "siahostdata.dat";
