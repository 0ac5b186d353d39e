//! The durable settings file.
//!
//! One JSON file in the contract-manager directory records the sector salt
//! and the storage-folder list (index, path, usage bitmap). Writes go
//! through a temp file, fsync and rename, so a crash leaves either the old
//! or the new settings intact, never a torn file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cairn_types::Hash;

use crate::error::HostError;

const SETTINGS_VERSION: u32 = 1;

/// The persisted fields of one storage folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedStorageFolder {
    pub index: u16,
    pub path: PathBuf,
    pub usage: Vec<u64>,
}

/// Everything the contract manager saves atomically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSettings {
    pub version: u32,
    pub sector_salt: Hash,
    pub storage_folders: Vec<SavedStorageFolder>,
}

impl SavedSettings {
    pub fn new(sector_salt: Hash) -> Self {
        Self {
            version: SETTINGS_VERSION,
            sector_salt,
            storage_folders: Vec::new(),
        }
    }
}

/// Write the settings with atomic replacement: serialize to a sibling temp
/// file, fsync it, then rename over the target.
pub fn save_settings(settings: &SavedSettings, path: &Path) -> Result<(), HostError> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| HostError::SettingsWriteFailed(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut tmp_path = path.to_path_buf();
    tmp_path.set_extension("json_temp");

    let mut tmp = File::create(&tmp_path).map_err(HostError::SettingsWriteFailed)?;
    tmp.write_all(json.as_bytes())
        .map_err(HostError::SettingsWriteFailed)?;
    tmp.sync_all().map_err(HostError::SettingsWriteFailed)?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(HostError::SettingsWriteFailed)?;
    Ok(())
}

/// Load the settings file. `Ok(None)` means the file does not exist, which
/// is how a first start is detected; any other failure is an error.
pub fn load_settings(path: &Path) -> Result<Option<SavedSettings>, HostError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(HostError::SettingsLoadFailed(err.to_string())),
    };
    let settings: SavedSettings = serde_json::from_str(&json)
        .map_err(|e| HostError::SettingsLoadFailed(format!("invalid settings JSON: {e}")))?;
    if settings.version != SETTINGS_VERSION {
        return Err(HostError::SettingsLoadFailed(format!(
            "unsupported settings version: {}",
            settings.version
        )));
    }
    Ok(Some(settings))
}
