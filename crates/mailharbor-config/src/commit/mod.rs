//! Atomic, all-or-nothing commit of a rendered config set.
//!
//! Per file: write to a temporary sibling, flush, rename over the final
//! path, so a reader never observes a partial file. Across the set: the
//! prior bytes of every target are snapshotted before the first rename,
//! and any failure restores every already-renamed target, so the fetch
//! agent and the mail server always see configs generated from the same
//! snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};

use mailharbor_common::CycleError;
use tracing::{debug, info};

use crate::render::RenderedConfigSet;
use crate::schema::EngineSection;

/// fetchmailrc embeds remote passwords.
const MODE_FETCHMAILRC: u32 = 0o600;
/// Dovecot reads the users file as its own group.
const MODE_USERS: u32 = 0o640;
const MODE_CONF: u32 = 0o644;

/// Where the rendered set lands on disk.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub fetchmailrc: PathBuf,
    pub dovecot_conf: PathBuf,
    pub dovecot_users: PathBuf,
}

impl OutputPaths {
    pub fn from_engine(engine: &EngineSection) -> Self {
        Self {
            fetchmailrc: engine.fetchmailrc.clone(),
            dovecot_conf: engine.dovecot_conf.clone(),
            dovecot_users: engine.dovecot_users.clone(),
        }
    }
}

/// Which targets actually changed content this cycle.
#[derive(Debug, Clone, Default)]
pub struct CommitReceipt {
    pub changed: Vec<PathBuf>,
}

impl CommitReceipt {
    pub fn files_changed(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// A committed set that can still be rolled back to its pre-cycle bytes,
/// for the window between commit and the daemon's dry-run check.
#[derive(Debug)]
pub struct PendingCommit {
    /// `(path, pre-cycle bytes, mode)` for every target renamed this cycle.
    renamed: Vec<(PathBuf, Option<Vec<u8>>, u32)>,
    pub receipt: CommitReceipt,
}

impl PendingCommit {
    /// Restore every renamed target to its pre-cycle content. Failure here
    /// is unrecoverable: the cross-file consistency invariant can no longer
    /// be guaranteed.
    pub fn roll_back(self) -> Result<(), CycleError> {
        restore(&self.renamed)
    }
}

/// Commit the whole set. On any individual failure, targets already
/// renamed this cycle are restored before the error returns.
pub fn commit(set: &RenderedConfigSet, paths: &OutputPaths) -> Result<PendingCommit, CycleError> {
    let targets = [
        (&paths.fetchmailrc, set.fetchmailrc.as_str(), MODE_FETCHMAILRC),
        (&paths.dovecot_conf, set.dovecot_conf.as_str(), MODE_CONF),
        (&paths.dovecot_users, set.dovecot_users.as_str(), MODE_USERS),
    ];

    // Snapshot prior bytes before touching anything.
    let mut snapshot = Vec::with_capacity(targets.len());
    for (path, _, mode) in &targets {
        let prior = match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(CycleError::Commit(format!(
                    "failed to read prior {}: {e}",
                    path.display()
                )));
            }
        };
        snapshot.push((path.to_path_buf(), prior, *mode));
    }

    let mut renamed: Vec<(PathBuf, Option<Vec<u8>>, u32)> = Vec::new();
    let mut receipt = CommitReceipt::default();

    for ((path, content, mode), (_, prior, _)) in targets.iter().zip(&snapshot) {
        if prior.as_deref() == Some(content.as_bytes()) {
            debug!("{} unchanged, skipping", path.display());
            continue;
        }

        if let Err(e) = write_atomic(path, content.as_bytes(), *mode) {
            let message = format!("failed to write {}: {e}", path.display());
            restore(&renamed)?;
            return Err(CycleError::Commit(message));
        }

        renamed.push((path.to_path_buf(), prior.clone(), *mode));
        receipt.changed.push(path.to_path_buf());
    }

    if receipt.files_changed() {
        info!("committed {} config file(s)", receipt.changed.len());
    }
    Ok(PendingCommit { renamed, receipt })
}

/// Write-temp-then-rename with the given unix mode. Used for the rendered
/// configs and for the engine's status file.
pub(crate) fn write_atomic(path: &Path, content: &[u8], mode: u32) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    {
        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        let mut file = opts.open(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn restore(renamed: &[(PathBuf, Option<Vec<u8>>, u32)]) -> Result<(), CycleError> {
    for (path, prior, mode) in renamed.iter().rev() {
        let result = match prior {
            Some(bytes) => write_atomic(path, bytes, *mode),
            None => match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        };
        if let Err(e) = result {
            return Err(CycleError::Unrecoverable(format!(
                "rollback of {} failed: {e}",
                path.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tag: &str) -> RenderedConfigSet {
        RenderedConfigSet {
            fetchmailrc: format!("# fetchmailrc {tag}\n"),
            dovecot_conf: format!("# dovecot.conf {tag}\n"),
            dovecot_users: format!("alice:hash-{tag}:5000:5000::/data/mail/alice\n"),
        }
    }

    fn paths(dir: &Path) -> OutputPaths {
        OutputPaths {
            fetchmailrc: dir.join("fetchmailrc"),
            dovecot_conf: dir.join("dovecot").join("dovecot.conf"),
            dovecot_users: dir.join("dovecot").join("users"),
        }
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn commit_writes_all_targets_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());

        let pending = commit(&set("v1"), &paths).unwrap();
        assert_eq!(pending.receipt.changed.len(), 3);
        assert_eq!(read(&paths.fetchmailrc), "# fetchmailrc v1\n");
        assert!(read(&paths.dovecot_users).contains("hash-v1"));
    }

    #[test]
    fn recommit_of_identical_content_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());

        commit(&set("v1"), &paths).unwrap();
        let pending = commit(&set("v1"), &paths).unwrap();
        assert!(!pending.receipt.files_changed());
    }

    #[test]
    fn partial_change_only_touches_the_changed_target() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        commit(&set("v1"), &paths).unwrap();

        let mut next = set("v1");
        next.fetchmailrc = "# fetchmailrc v2\n".into();
        let pending = commit(&next, &paths).unwrap();
        assert_eq!(pending.receipt.changed, vec![paths.fetchmailrc.clone()]);
    }

    #[test]
    fn no_tmp_files_survive_a_commit() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        commit(&set("v1"), &paths).unwrap();

        assert!(!tmp_path(&paths.fetchmailrc).exists());
        assert!(!tmp_path(&paths.dovecot_conf).exists());
        assert!(!tmp_path(&paths.dovecot_users).exists());
    }

    #[test]
    fn mid_commit_failure_restores_every_target() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        commit(&set("v1"), &paths).unwrap();

        // Force the third target's temp write to fail after the first two
        // targets have already been renamed.
        std::fs::create_dir_all(tmp_path(&paths.dovecot_users)).unwrap();

        let err = commit(&set("v2"), &paths).unwrap_err();
        assert!(matches!(err, CycleError::Commit(_)));

        assert_eq!(read(&paths.fetchmailrc), "# fetchmailrc v1\n");
        assert_eq!(read(&paths.dovecot_conf), "# dovecot.conf v1\n");
        assert!(read(&paths.dovecot_users).contains("hash-v1"));
    }

    #[test]
    fn failure_on_first_commit_leaves_no_targets_behind() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());

        std::fs::create_dir_all(tmp_path(&paths.dovecot_users)).unwrap();
        let err = commit(&set("v1"), &paths).unwrap_err();
        assert!(matches!(err, CycleError::Commit(_)));

        // Targets renamed before the failure are removed again.
        assert!(!paths.fetchmailrc.exists());
        assert!(!paths.dovecot_conf.exists());
        assert!(!paths.dovecot_users.exists());
    }

    #[test]
    fn roll_back_restores_pre_cycle_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        commit(&set("v1"), &paths).unwrap();

        let pending = commit(&set("v2"), &paths).unwrap();
        assert_eq!(read(&paths.fetchmailrc), "# fetchmailrc v2\n");

        pending.roll_back().unwrap();
        assert_eq!(read(&paths.fetchmailrc), "# fetchmailrc v1\n");
        assert_eq!(read(&paths.dovecot_conf), "# dovecot.conf v1\n");
        assert!(read(&paths.dovecot_users).contains("hash-v1"));
    }

    #[cfg(unix)]
    #[test]
    fn secret_bearing_targets_get_restrictive_modes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        commit(&set("v1"), &paths).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&paths.fetchmailrc), 0o600);
        assert_eq!(mode(&paths.dovecot_users), 0o640);
        assert_eq!(mode(&paths.dovecot_conf), 0o644);
    }
}
