use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, StoreError};
use crate::models::Dataset;

/// Create the database file with an empty dataset if it does not exist yet.
/// An existing file is left untouched, whatever its contents.
pub fn ensure(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let empty = serde_json::to_vec(&Dataset::default()).map_err(StoreError::Encode)?;

    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(&empty).map_err(|e| StoreError::io(path, e))?;
            info!("Created empty database at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
