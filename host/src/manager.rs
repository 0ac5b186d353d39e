//! The contract manager: durable sector placement across storage folders.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use rand::RngCore;

use cairn_types::params::{SECTOR_SIZE, SETTINGS_FILE};
use cairn_types::Hash;

use crate::error::HostError;
use crate::sector::{SectorId, SectorLocation};
use crate::settings::{load_settings, save_settings, SavedSettings};
use crate::storage_folder::StorageFolder;
use crate::usage;

/// Tracks which sectors live where, durably.
///
/// On startup the manager either initializes fresh settings (first run) or
/// reloads the settings file and rebuilds the in-memory sector-location map
/// from each folder's metadata file. All folder maps live under one mutex;
/// the per-folder read counters are lock-free atomics.
pub struct ContractManager {
    persist_dir: PathBuf,
    state: Mutex<ManagerState>,
}

struct ManagerState {
    sector_salt: Hash,
    folders: BTreeMap<u16, StorageFolder>,
    sector_locations: HashMap<SectorId, SectorLocation>,
}

impl ManagerState {
    fn saved_settings(&self) -> SavedSettings {
        let mut settings = SavedSettings::new(self.sector_salt);
        for folder in self.folders.values() {
            settings.storage_folders.push(folder.saved());
        }
        settings
    }
}

impl ContractManager {
    /// Open the contract manager rooted at `persist_dir`.
    ///
    /// A missing settings file means a first start: a random sector salt is
    /// generated and the settings are written out immediately. Otherwise
    /// the settings are loaded, every declared folder's files are opened
    /// (an open failure is fatal), and the sector locations are scanned
    /// back into memory. A folder whose metadata cannot be read is logged,
    /// counted and marked degraded; its sectors stay on disk untouched.
    pub fn open(persist_dir: impl Into<PathBuf>) -> Result<Self, HostError> {
        let persist_dir = persist_dir.into();
        std::fs::create_dir_all(&persist_dir).map_err(|source| HostError::FolderOpenFailed {
            path: persist_dir.clone(),
            source,
        })?;
        let settings_path = persist_dir.join(SETTINGS_FILE);

        let state = match load_settings(&settings_path)? {
            None => {
                let mut salt_bytes = [0u8; 32];
                rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
                let state = ManagerState {
                    sector_salt: Hash::new(salt_bytes),
                    folders: BTreeMap::new(),
                    sector_locations: HashMap::new(),
                };
                save_settings(&state.saved_settings(), &settings_path)?;
                tracing::info!(dir = %persist_dir.display(), "initialized contract manager");
                state
            }
            Some(settings) => {
                let mut state = ManagerState {
                    sector_salt: settings.sector_salt,
                    folders: BTreeMap::new(),
                    sector_locations: HashMap::new(),
                };
                for saved in &settings.storage_folders {
                    let folder = StorageFolder::open(saved)?;
                    state.folders.insert(folder.index, folder);
                }
                load_sector_locations(&mut state);
                tracing::info!(
                    dir = %persist_dir.display(),
                    folders = state.folders.len(),
                    sectors = state.sector_locations.len(),
                    "contract manager loaded"
                );
                state
            }
        };

        Ok(Self {
            persist_dir,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn settings_path(&self) -> PathBuf {
        self.persist_dir.join(SETTINGS_FILE)
    }

    /// The id the manager files a sector under, derived from the sector's
    /// Merkle root and the secret salt.
    pub fn sector_id(&self, sector_root: &Hash) -> SectorId {
        SectorId::derive(&self.lock().sector_salt, sector_root)
    }

    /// Add a storage folder at `path` sized for `size` bytes of sectors,
    /// returning its index. The settings file is updated before the folder
    /// is visible.
    pub fn add_storage_folder(&self, path: &Path, size: u64) -> Result<u16, HostError> {
        let mut state = self.lock();
        if state.folders.values().any(|f| f.path == path) {
            return Err(HostError::DuplicateFolder);
        }
        let index = (0..=u16::MAX)
            .find(|i| !state.folders.contains_key(i))
            .ok_or(HostError::FolderLimitReached)?;

        let folder = StorageFolder::create(index, path, size)?;
        state.folders.insert(index, folder);
        save_settings(&state.saved_settings(), &self.settings_path())?;
        tracing::info!(folder = index, path = %path.display(), "added storage folder");
        Ok(index)
    }

    /// Store a sector, or bump its reference count if it is already held.
    ///
    /// New sectors go to the lowest free slot of the lowest-indexed healthy
    /// folder. The slot is queued while the data and metadata writes are in
    /// flight and committed to the location map afterwards, so concurrent
    /// settings snapshots never persist a half-written slot.
    pub fn add_sector(&self, sector_root: &Hash, data: &[u8]) -> Result<(), HostError> {
        if data.len() as u64 > SECTOR_SIZE {
            return Err(HostError::BadSectorSize);
        }

        let mut state = self.lock();
        let id = SectorId::derive(&state.sector_salt, sector_root);

        if let Some(location) = state.sector_locations.get(&id).copied() {
            let count = location.count.saturating_add(1);
            let folder = state
                .folders
                .get(&location.storage_folder)
                .ok_or(HostError::UnknownSector)?;
            folder
                .write_metadata_record(location.index, &id, count)
                .map_err(|source| HostError::SectorIo {
                    folder: location.storage_folder,
                    source,
                })?;
            state
                .sector_locations
                .insert(id, SectorLocation { count, ..location });
            return Ok(());
        }

        // pick the first healthy folder with a free slot
        let mut placement = None;
        for (&index, folder) in state.folders.iter() {
            if folder.degraded {
                continue;
            }
            if let Some(slot) = usage::free_slot(&folder.usage) {
                if slot < folder.num_slots() {
                    placement = Some((index, slot));
                    break;
                }
            }
        }
        let (folder_index, slot) = placement.ok_or(HostError::NoFreeSlots)?;

        let folder = state
            .folders
            .get_mut(&folder_index)
            .ok_or(HostError::NoFreeSlots)?;
        usage::set_usage(&mut folder.usage, slot);
        folder.queued_sectors.insert(id, slot);

        let write_result = folder
            .write_sector(slot, data)
            .and_then(|()| folder.write_metadata_record(slot, &id, 1));
        match write_result {
            Ok(()) => {
                folder.queued_sectors.remove(&id);
                folder.sectors += 1;
                state.sector_locations.insert(
                    id,
                    SectorLocation {
                        index: slot,
                        storage_folder: folder_index,
                        count: 1,
                    },
                );
                Ok(())
            }
            Err(source) => {
                usage::clear_usage(&mut folder.usage, slot);
                folder.queued_sectors.remove(&id);
                tracing::warn!(folder = folder_index, slot, error = %source, "sector write failed");
                Err(HostError::SectorIo {
                    folder: folder_index,
                    source,
                })
            }
        }
    }

    /// Drop one reference to a sector, freeing its slot when the count
    /// reaches zero.
    pub fn remove_sector(&self, sector_root: &Hash) -> Result<(), HostError> {
        let mut state = self.lock();
        let id = SectorId::derive(&state.sector_salt, sector_root);
        let location = state
            .sector_locations
            .get(&id)
            .copied()
            .ok_or(HostError::UnknownSector)?;

        let folder = state
            .folders
            .get_mut(&location.storage_folder)
            .ok_or(HostError::UnknownSector)?;

        if location.count <= 1 {
            folder
                .write_metadata_record(location.index, &SectorId::ZERO, 0)
                .map_err(|source| HostError::SectorIo {
                    folder: location.storage_folder,
                    source,
                })?;
            usage::clear_usage(&mut folder.usage, location.index);
            folder.sectors = folder.sectors.saturating_sub(1);
            state.sector_locations.remove(&id);
        } else {
            let count = location.count - 1;
            folder
                .write_metadata_record(location.index, &id, count)
                .map_err(|source| HostError::SectorIo {
                    folder: location.storage_folder,
                    source,
                })?;
            state
                .sector_locations
                .insert(id, SectorLocation { count, ..location });
        }
        Ok(())
    }

    /// Read a stored sector back, e.g. to answer a storage-proof challenge.
    pub fn read_sector(&self, sector_root: &Hash) -> Result<Vec<u8>, HostError> {
        let state = self.lock();
        let id = SectorId::derive(&state.sector_salt, sector_root);
        let location = state
            .sector_locations
            .get(&id)
            .ok_or(HostError::UnknownSector)?;
        let folder = state
            .folders
            .get(&location.storage_folder)
            .ok_or(HostError::UnknownSector)?;
        folder
            .read_sector(location.index)
            .map_err(|source| HostError::SectorIo {
                folder: location.storage_folder,
                source,
            })
    }

    /// Where a sector is stored, if the manager holds it.
    pub fn sector_location(&self, sector_root: &Hash) -> Option<SectorLocation> {
        let state = self.lock();
        let id = SectorId::derive(&state.sector_salt, sector_root);
        state.sector_locations.get(&id).copied()
    }

    /// Number of committed sectors across all folders.
    pub fn sector_count(&self) -> usize {
        self.lock().sector_locations.len()
    }

    /// A consistent snapshot of the persisted settings, with in-flight
    /// slots masked out.
    pub fn settings_snapshot(&self) -> SavedSettings {
        self.lock().saved_settings()
    }

    /// Persist the current settings atomically.
    pub fn save_settings(&self) -> Result<(), HostError> {
        let settings = self.lock().saved_settings();
        save_settings(&settings, &self.settings_path())
    }

    /// The failed/successful metadata read counters for a folder.
    pub fn read_counters(&self, folder_index: u16) -> Option<(u64, u64)> {
        let state = self.lock();
        let folder = state.folders.get(&folder_index)?;
        Some((
            folder.atomic_failed_reads.load(Ordering::Relaxed),
            folder.atomic_successful_reads.load(Ordering::Relaxed),
        ))
    }

    /// Whether a folder has been marked degraded.
    pub fn is_degraded(&self, folder_index: u16) -> Option<bool> {
        self.lock().folders.get(&folder_index).map(|f| f.degraded)
    }

    /// Flush settings and release every file handle, newest folder first.
    pub fn shutdown(self) -> Result<(), HostError> {
        let mut state = self.lock();
        let settings = state.saved_settings();
        save_settings(&settings, &self.persist_dir.join(SETTINGS_FILE))?;

        let indices: Vec<u16> = state.folders.keys().rev().copied().collect();
        for index in indices {
            if let Some(folder) = state.folders.remove(&index) {
                if let Err(error) = folder.sync() {
                    tracing::warn!(folder = index, error = %error, "sync on shutdown failed");
                }
                // dropping the folder closes its handles, sector file first
                drop(folder);
            }
        }
        Ok(())
    }
}

/// Rebuild the in-memory sector-location map from each folder's metadata
/// file, mirroring what was committed before the last shutdown or crash.
///
/// A folder whose scan fails contributes no locations at all: it is logged
/// through [`HostError::MetadataReadFailed`], counted and marked degraded,
/// while its files stay on disk untouched.
fn load_sector_locations(state: &mut ManagerState) {
    let mut locations: Vec<(SectorId, SectorLocation)> = Vec::new();
    for folder in state.folders.values_mut() {
        let mut folder_locations: Vec<(SectorId, SectorLocation)> = Vec::new();
        let mut scan_error = None;
        for slot in usage::usage_sectors(&folder.usage) {
            match folder.read_metadata_record(slot) {
                Ok((id, count)) => folder_locations.push((
                    id,
                    SectorLocation {
                        index: slot,
                        storage_folder: folder.index,
                        count,
                    },
                )),
                Err(source) => {
                    scan_error = Some(HostError::MetadataReadFailed {
                        folder: folder.index,
                        source,
                    });
                    break;
                }
            }
        }

        if let Some(error) = scan_error {
            tracing::warn!(
                folder = folder.index,
                error = %error,
                "sector metadata scan failed, marking folder degraded"
            );
            folder.atomic_failed_reads.fetch_add(1, Ordering::Relaxed);
            folder.degraded = true;
            continue;
        }
        folder
            .atomic_successful_reads
            .fetch_add(1, Ordering::Relaxed);
        folder.sectors = folder_locations.len() as u64;
        locations.extend(folder_locations);
    }
    for (id, location) in locations {
        state.sector_locations.insert(id, location);
    }
}
