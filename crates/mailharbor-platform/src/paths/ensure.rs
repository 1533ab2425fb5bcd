use std::fs;
use std::path::Path;

use mailharbor_common::PlatformError;

/// Create a directory (and its ancestors) if it does not already exist.
pub fn ensure_dir(path: &Path) -> Result<(), PlatformError> {
    fs::create_dir_all(path).map_err(|e| {
        PlatformError::PathError(format!("failed to create {}: {e}", path.display()))
    })
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<(), PlatformError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Create a maildir layout (`cur`/`new`/`tmp`) under `dir`.
pub fn ensure_maildir(dir: &Path) -> Result<(), PlatformError> {
    for sub in ["cur", "new", "tmp"] {
        ensure_dir(&dir.join(sub))?;
    }
    Ok(())
}

/// Create a per-account full-text index directory.
pub fn ensure_fts_dir(dir: &Path) -> Result<(), PlatformError> {
    ensure_dir(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_maildir_creates_cur_new_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = dir.path().join("alice");
        ensure_maildir(&mailbox).unwrap();
        assert!(mailbox.join("cur").is_dir());
        assert!(mailbox.join("new").is_dir());
        assert!(mailbox.join("tmp").is_dir());
    }

    #[test]
    fn ensure_maildir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = dir.path().join("bob");
        ensure_maildir(&mailbox).unwrap();
        ensure_maildir(&mailbox).unwrap();
        assert!(mailbox.join("new").is_dir());
    }

    #[test]
    fn ensure_parent_handles_nested_targets() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("deep").join("nested").join("users");
        ensure_parent(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
        assert!(!target.exists());
    }
}
