//! Filesystem helpers for export.
//!
//! Export never overwrites: every file is created with
//! [`OpenOptions::create_new`], and folder names taken from a backup are
//! checked before they are used as path components.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::NbuError;

/// Create `dir` if it does not exist yet. An existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<(), NbuError> {
    match std::fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(NbuError::Io(format!(
            "Cannot create directory {}: {}",
            dir.display(),
            e
        ))),
    }
}

/// Create a new file for writing; fails if `path` already exists.
pub fn create_new(path: &Path) -> Result<File, NbuError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| NbuError::Io(format!("Cannot create {}: {}", path.display(), e)))
}

/// Check that a folder name from a backup is safe to use as one path component.
pub fn validate_folder_name(name: &str) -> Result<(), NbuError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(NbuError::InvalidRecord(format!(
            "Invalid folder name {:?}",
            name
        )));
    }
    Ok(())
}
