use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to open storage folder {path}: {source}")]
    FolderOpenFailed { path: PathBuf, source: io::Error },

    #[error("failed to read sector metadata in folder {folder}: {source}")]
    MetadataReadFailed { folder: u16, source: io::Error },

    #[error("failed to write the settings file: {0}")]
    SettingsWriteFailed(io::Error),

    #[error("failed to load the settings file: {0}")]
    SettingsLoadFailed(String),

    #[error("sector i/o failed in folder {folder}: {source}")]
    SectorIo { folder: u16, source: io::Error },

    #[error("no storage folder has a free sector slot")]
    NoFreeSlots,

    #[error("no sector with that id is stored")]
    UnknownSector,

    #[error("a storage folder at that path already exists")]
    DuplicateFolder,

    #[error("storage folder index space is exhausted")]
    FolderLimitReached,

    #[error("storage folder size must hold at least one granularity of sectors")]
    InvalidFolderSize,

    #[error("sector data exceeds the sector size")]
    BadSectorSize,
}
