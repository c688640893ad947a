//! Atomic in-place rewrites of target files.
//!
//! A rewrite never leaves a half-written file behind:
//! 1. Write the new content to a sibling temp file
//! 2. Flush and sync it to disk
//! 3. Optionally copy the original to a `.bak` file
//! 4. Rename the temp file over the target

use crate::config::PatcherConfig;
use crate::error::{PatchError, Result};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};

/// Replace the content of `path` with `content` atomically.
///
/// The original file's permissions are carried over to the new file.
pub fn atomic_write_text(path: &Path, content: &str, keep_backup: bool) -> Result<()> {
    let temp_path = sibling(path, &format!("{}.{}", process::id(), PatcherConfig::TEMP_SUFFIX));

    let result = write_temp(&temp_path, content).and_then(|()| {
        if let Ok(metadata) = fs::metadata(path) {
            if let Err(e) = fs::set_permissions(&temp_path, metadata.permissions()) {
                debug!("Could not copy permissions to {}: {}", temp_path.display(), e);
            }
        }

        if keep_backup && path.exists() {
            let backup_path = sibling(path, PatcherConfig::BACKUP_SUFFIX);
            if let Err(e) = fs::copy(path, &backup_path) {
                warn!("Failed to create backup {}: {}", backup_path.display(), e);
            } else {
                debug!("Created backup: {}", backup_path.display());
            }
        }

        fs::rename(&temp_path, path).map_err(|e| PatchError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })
    });

    if result.is_err() && temp_path.exists() {
        fs::remove_file(&temp_path).ok();
    }
    result?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_temp(temp_path: &Path, content: &str) -> Result<()> {
    let io_err = |e: std::io::Error, what: &str| PatchError::Io {
        message: format!("Failed to {} temp file {}", what, temp_path.display()),
        path: Some(temp_path.to_path_buf()),
        source: Some(e),
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| io_err(e, "create"))?;

    file.write_all(content.as_bytes())
        .map_err(|e| io_err(e, "write"))?;
    file.flush().map_err(|e| io_err(e, "flush"))?;
    file.sync_all().map_err(|e| io_err(e, "sync"))?;
    Ok(())
}

/// `path` with `.suffix` appended to its file name (`string.cc` -> `string.cc.bak`).
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("string.cc");
        fs::write(&path, "old").unwrap();

        atomic_write_text(&path, "new", false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_dir.path().join("string.cc.bak").exists());
    }

    #[test]
    fn test_atomic_write_creates_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("string.cc");
        fs::write(&path, "original").unwrap();

        atomic_write_text(&path, "patched", true).unwrap();

        let backup = temp_dir.path().join("string.cc.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), "original");
        assert_eq!(fs::read_to_string(&path).unwrap(), "patched");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deserializer.cc");
        fs::write(&path, "old").unwrap();

        atomic_write_text(&path, "new", false).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("deserializer.cc")]);
    }

    #[test]
    fn test_atomic_write_fails_for_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("string.cc");

        let err = atomic_write_text(&path, "new", false).unwrap_err();
        assert!(matches!(err, PatchError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("code-serializer.cc");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        atomic_write_text(&path, "new", false).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
