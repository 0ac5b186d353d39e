//! Sector identifiers, locations, and the on-disk metadata record.

use serde::{Deserialize, Serialize};
use std::fmt;

use cairn_types::params::SECTOR_METADATA_DISK_SIZE;
use cairn_types::Hash;

/// A 12-byte sector id, derived from the sector's Merkle root and the
/// manager's secret salt. The salt keeps remote parties from predicting
/// where on disk a given sector lands.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorId(pub [u8; 12]);

impl SectorId {
    pub const ZERO: Self = Self([0u8; 12]);

    pub fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Derive the id for a sector with Merkle root `root` under `salt`.
    pub fn derive(salt: &Hash, root: &Hash) -> Self {
        let digest = Hash::of_all(&[salt.as_bytes(), root.as_bytes()]);
        let mut id = [0u8; 12];
        id.copy_from_slice(&digest.as_bytes()[..12]);
        Self(id)
    }
}

impl fmt::Debug for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectorId(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Where a sector lives: which folder, which slot, and how many contracts
/// reference it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorLocation {
    /// Slot index within the storage folder.
    pub index: u64,
    /// Index of the storage folder holding the sector.
    pub storage_folder: u16,
    /// Reference count of contracts using the sector.
    pub count: u16,
}

/// Encode one metadata record: 12 bytes of sector id followed by the
/// little-endian reference count.
pub fn encode_record(id: &SectorId, count: u16) -> [u8; SECTOR_METADATA_DISK_SIZE as usize] {
    let mut record = [0u8; SECTOR_METADATA_DISK_SIZE as usize];
    record[..12].copy_from_slice(id.as_bytes());
    record[12..14].copy_from_slice(&count.to_le_bytes());
    record
}

/// Decode one metadata record.
pub fn decode_record(record: &[u8; SECTOR_METADATA_DISK_SIZE as usize]) -> (SectorId, u16) {
    let mut id = [0u8; 12];
    id.copy_from_slice(&record[..12]);
    let count = u16::from_le_bytes([record[12], record[13]]);
    (SectorId::new(id), count)
}
