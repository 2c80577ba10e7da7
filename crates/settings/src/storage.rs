use std::fs;
use std::path::Path;

use scriptproof_core::write_atomic;

use crate::SettingsError;

/// Replaces the settings file at `path`, creating its directory first.
pub(crate) fn store(path: &Path, data: &[u8]) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(path, data).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
