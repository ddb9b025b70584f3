use crate::error::{Blupd8Error, Result};
use std::path::Path;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| permission_or_io(e, path))?;
    }
    Ok(())
}

pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(permission_or_io(e, path)),
    }
}

/// Size of a regular file, or `None` when it is missing or not a file.
pub fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

pub fn permission_or_io(e: std::io::Error, path: &Path) -> Blupd8Error {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => Blupd8Error::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Blupd8Error::from(e),
    }
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
