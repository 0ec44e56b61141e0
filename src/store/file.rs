use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{info, warn};

use super::{Snapshot, SnapshotStore, StoreError, export_file_name};
use crate::config::get_data_path;

/// Snapshot kept as a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store in the default data directory
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::at(get_data_path()?))
    }

    /// Open a store backed by `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }
}

impl SnapshotStore for JsonFileStore {
    /// A missing file is "no data". So is a corrupt one, which is moved aside
    /// first so the next save does not overwrite it.
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match Snapshot::from_json(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "Data file {} is unreadable ({}), moving it to {}",
                    self.path.display(),
                    e,
                    backup.display()
                );
                fs::rename(&self.path, &backup)?;
                Ok(None)
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write then rename so a crash never leaves a half-written file
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, snapshot.to_json()?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Write an export of `snapshot` into `dir`, returning the file path
pub fn export_to_dir(
    dir: &Path,
    snapshot: &Snapshot,
    now: DateTime<Local>,
) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(now.date_naive()));
    fs::write(&path, snapshot.export(now)?)?;
    info!("Exported {} sessions to {}", snapshot.history.len(), path.display());
    Ok(path)
}

/// Read a snapshot from an export file
pub fn import_file(path: &Path) -> Result<Snapshot, StoreError> {
    let bytes = fs::read(path)?;
    let snapshot = Snapshot::import(&bytes)?;
    info!(
        "Imported {} topics and {} sessions from {}",
        snapshot.topics.len(),
        snapshot.history.len(),
        path.display()
    );
    Ok(snapshot)
}
