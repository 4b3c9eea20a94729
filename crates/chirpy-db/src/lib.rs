pub mod bootstrap;
pub mod error;
pub mod models;
pub mod queries;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};
use uuid::Uuid;

pub use error::{Result, StoreError};
pub use models::{ChirpRow, Dataset, RefreshTokenRow, UserRow};

/// Flat-file record store. The whole dataset lives in one JSON document that
/// is read and rewritten in full on every call; nothing is cached in memory.
///
/// `load` and `read` take the shared side of the lock, `save` and `update`
/// the exclusive side. `update` holds it across load, mutate and save, so
/// concurrent mutations never overwrite each other.
pub struct Database {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        bootstrap::ensure(path)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            lock: RwLock::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current file contents.
    pub fn load(&self) -> Result<Dataset> {
        // The lock guards no in-memory state, so a panic elsewhere cannot
        // leave anything inconsistent behind it.
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.read_file()
    }

    /// Overwrite the file with `data`. Prefer [`Database::update`] for
    /// read-modify-write; a bare load/save pair can lose concurrent writes.
    pub fn save(&self, data: &Dataset) -> Result<()> {
        let payload = encode(data)?;
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        self.write_file(&payload)
    }

    /// Run `f` against a freshly loaded snapshot.
    pub fn read<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Dataset) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let data = self.load()?;
        f(&data)
    }

    /// Run `f` against the latest snapshot and persist the result, all under
    /// the exclusive lock. Nothing is written if `f` fails.
    pub fn update<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Dataset) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut data = self.read_file()?;
        let out = f(&mut data)?;
        self.write_file(&encode(&data)?)?;
        Ok(out)
    }

    fn read_file(&self) -> Result<Dataset> {
        let raw = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;

        // An interrupted bootstrap leaves a zero-length file behind.
        if raw.is_empty() {
            return Ok(Dataset::default());
        }

        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_file(&self, payload: &[u8]) -> Result<()> {
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        fs::write(&temp_path, payload).map_err(|e| StoreError::io(&temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&self.path, e));
        }

        debug!("Wrote {} bytes to {}", payload.len(), self.path.display());
        Ok(())
    }
}

fn encode(data: &Dataset) -> Result<Vec<u8>> {
    serde_json::to_vec(data).map_err(StoreError::Encode)
}
