//! A storage folder: one directory holding a sector file and a metadata
//! file, tracked by an in-memory usage bitmap.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;

use cairn_types::params::{
    METADATA_FILE, SECTOR_FILE, SECTOR_METADATA_DISK_SIZE, SECTOR_SIZE,
    STORAGE_FOLDER_GRANULARITY,
};

use crate::error::HostError;
use crate::sector::{decode_record, encode_record, SectorId};
use crate::settings::SavedStorageFolder;
use crate::usage;

/// One storage folder and its open file handles.
///
/// Field order matters for shutdown: the sector file was opened after the
/// metadata file, and dropping fields in declaration order releases the
/// handles in reverse open order.
pub struct StorageFolder {
    pub index: u16,
    pub path: PathBuf,
    /// Occupancy bitmap over the folder's sector slots.
    pub usage: Vec<u64>,
    sector_file: File,
    metadata_file: File,
    /// In-flight writes: slot assignments that are not yet committed to the
    /// location map. Masked out of the persisted usage bitmap.
    pub queued_sectors: HashMap<SectorId, u64>,
    /// Number of committed sectors in this folder.
    pub sectors: u64,
    /// Set when a metadata scan failed; the folder stops accepting sectors
    /// until an operator intervenes.
    pub degraded: bool,
    pub atomic_failed_reads: AtomicU64,
    pub atomic_successful_reads: AtomicU64,
}

impl StorageFolder {
    /// Create a new storage folder at `path` with room for `size` bytes of
    /// sectors. The slot count is rounded down to a granularity multiple;
    /// folders smaller than one granularity are rejected.
    pub fn create(index: u16, path: &Path, size: u64) -> Result<Self, HostError> {
        let slots = (size / SECTOR_SIZE) / STORAGE_FOLDER_GRANULARITY * STORAGE_FOLDER_GRANULARITY;
        if slots == 0 {
            return Err(HostError::InvalidFolderSize);
        }

        std::fs::create_dir_all(path).map_err(|source| HostError::FolderOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let (metadata_file, sector_file) = open_files(path, true)?;
        metadata_file
            .set_len(slots * SECTOR_METADATA_DISK_SIZE)
            .map_err(|source| HostError::FolderOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        sector_file
            .set_len(slots * SECTOR_SIZE)
            .map_err(|source| HostError::FolderOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            index,
            path: path.to_path_buf(),
            usage: vec![0u64; usage::words_for_slots(slots)],
            sector_file,
            metadata_file,
            queued_sectors: HashMap::new(),
            sectors: 0,
            degraded: false,
            atomic_failed_reads: AtomicU64::new(0),
            atomic_successful_reads: AtomicU64::new(0),
        })
    }

    /// Reopen a storage folder recorded in the settings file.
    pub fn open(saved: &SavedStorageFolder) -> Result<Self, HostError> {
        let (metadata_file, sector_file) = open_files(&saved.path, false)?;
        Ok(Self {
            index: saved.index,
            path: saved.path.clone(),
            usage: saved.usage.clone(),
            sector_file,
            metadata_file,
            queued_sectors: HashMap::new(),
            sectors: 0,
            degraded: false,
            atomic_failed_reads: AtomicU64::new(0),
            atomic_successful_reads: AtomicU64::new(0),
        })
    }

    /// Total sector slots in this folder.
    pub fn num_slots(&self) -> u64 {
        self.usage.len() as u64 * 64
    }

    /// The persistent form of this folder, with in-flight slots masked out
    /// so the saved settings describe only committed sectors.
    pub fn saved(&self) -> SavedStorageFolder {
        let mut persisted_usage = self.usage.clone();
        for &slot in self.queued_sectors.values() {
            usage::clear_usage(&mut persisted_usage, slot);
        }
        SavedStorageFolder {
            index: self.index,
            path: self.path.clone(),
            usage: persisted_usage,
        }
    }

    /// Read the metadata record for one slot.
    pub fn read_metadata_record(&self, slot: u64) -> std::io::Result<(SectorId, u16)> {
        let mut record = [0u8; SECTOR_METADATA_DISK_SIZE as usize];
        let mut file = &self.metadata_file;
        file.seek(SeekFrom::Start(slot * SECTOR_METADATA_DISK_SIZE))?;
        file.read_exact(&mut record)?;
        Ok(decode_record(&record))
    }

    /// Write the metadata record for one slot.
    pub fn write_metadata_record(
        &self,
        slot: u64,
        id: &SectorId,
        count: u16,
    ) -> std::io::Result<()> {
        let record = encode_record(id, count);
        let mut file = &self.metadata_file;
        file.seek(SeekFrom::Start(slot * SECTOR_METADATA_DISK_SIZE))?;
        file.write_all(&record)
    }

    /// Write sector data into a slot, zero-padded to the full sector size.
    pub fn write_sector(&self, slot: u64, data: &[u8]) -> std::io::Result<()> {
        let mut padded = vec![0u8; SECTOR_SIZE as usize];
        padded[..data.len()].copy_from_slice(data);
        let mut file = &self.sector_file;
        file.seek(SeekFrom::Start(slot * SECTOR_SIZE))?;
        file.write_all(&padded)
    }

    /// Read the full sector stored in a slot.
    pub fn read_sector(&self, slot: u64) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; SECTOR_SIZE as usize];
        let mut file = &self.sector_file;
        file.seek(SeekFrom::Start(slot * SECTOR_SIZE))?;
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Flush both files to disk.
    pub fn sync(&self) -> std::io::Result<()> {
        self.sector_file.sync_all()?;
        self.metadata_file.sync_all()
    }
}

fn open_files(path: &Path, create: bool) -> Result<(File, File), HostError> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(create);

    // metadata first, sector second; shutdown releases in reverse
    let metadata_file =
        options
            .open(path.join(METADATA_FILE))
            .map_err(|source| HostError::FolderOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
    let sector_file =
        options
            .open(path.join(SECTOR_FILE))
            .map_err(|source| HostError::FolderOpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
    Ok((metadata_file, sector_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_folder(dir: &Path) -> StorageFolder {
        StorageFolder::create(0, dir, STORAGE_FOLDER_GRANULARITY * SECTOR_SIZE).unwrap()
    }

    #[test]
    fn create_sizes_files() {
        let dir = tempfile::tempdir().unwrap();
        let folder = small_folder(dir.path());
        assert_eq!(folder.num_slots(), STORAGE_FOLDER_GRANULARITY);
        let metadata_len = std::fs::metadata(dir.path().join(METADATA_FILE)).unwrap().len();
        assert_eq!(
            metadata_len,
            STORAGE_FOLDER_GRANULARITY * SECTOR_METADATA_DISK_SIZE
        );
    }

    #[test]
    fn too_small_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = StorageFolder::create(0, dir.path(), SECTOR_SIZE);
        assert!(matches!(result, Err(HostError::InvalidFolderSize)));
    }

    #[test]
    fn metadata_record_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let folder = small_folder(dir.path());
        let id = SectorId::new([9u8; 12]);
        folder.write_metadata_record(42, &id, 3).unwrap();
        assert_eq!(folder.read_metadata_record(42).unwrap(), (id, 3));
        // neighboring records are untouched
        assert_eq!(
            folder.read_metadata_record(41).unwrap(),
            (SectorId::ZERO, 0)
        );
    }

    #[test]
    fn sector_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let folder = small_folder(dir.path());
        folder.write_sector(5, b"sector payload").unwrap();
        let data = folder.read_sector(5).unwrap();
        assert_eq!(&data[..14], b"sector payload");
        assert!(data[14..].iter().all(|&b| b == 0));
    }

    #[test]
    fn saved_masks_queued_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut folder = small_folder(dir.path());
        usage::set_usage(&mut folder.usage, 3);
        usage::set_usage(&mut folder.usage, 7);
        folder.queued_sectors.insert(SectorId::new([1u8; 12]), 7);

        let saved = folder.saved();
        assert!(usage::is_set(&saved.usage, 3));
        assert!(!usage::is_set(&saved.usage, 7));
        // the live bitmap still has the queued bit
        assert!(usage::is_set(&folder.usage, 7));
    }
}
