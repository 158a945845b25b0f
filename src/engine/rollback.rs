//! Rollback: restore captured artifacts in reverse action order
//!
//! Best-effort per artifact. A failure restoring one artifact is recorded
//! and the rest are still attempted; "mostly old, one artifact unresolved"
//! beats "half old, half new", and the one outcome never produced silently
//! is a partial restore reported as success.

use std::fs;
use std::path::PathBuf;

use crate::engine::backup::Backup;
use crate::fsops;

/// Per-artifact failure needing manual attention
#[derive(Debug, Clone)]
pub struct RollbackFailure {
    pub artifact: PathBuf,
    /// Where the snapshot lives, for manual restoration
    pub snapshot: Option<PathBuf>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    /// Artifacts restored from their snapshots
    pub restored: Vec<PathBuf>,
    /// Artifacts deleted because they did not exist before the run
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RollbackFailure>,
}

impl RollbackReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Undo a failed run from its backups, newest first.
pub fn rollback(backups: &[Backup]) -> RollbackReport {
    let mut report = RollbackReport::default();

    for backup in backups.iter().rev() {
        let outcome = if backup.existed_before {
            restore(backup)
        } else {
            remove(backup)
        };

        match outcome {
            Ok(()) if backup.existed_before => report.restored.push(backup.artifact_path.clone()),
            Ok(()) => report.removed.push(backup.artifact_path.clone()),
            Err(reason) => report.failures.push(RollbackFailure {
                artifact: backup.artifact_path.clone(),
                snapshot: backup.snapshot_path.clone(),
                reason: format!("{reason} (while undoing '{}')", backup.action_id),
            }),
        }
    }

    report
}

fn restore(backup: &Backup) -> Result<(), String> {
    let snapshot = backup
        .snapshot_path
        .as_ref()
        .ok_or_else(|| "snapshot missing".to_string())?;

    // never destroy the current state unless the snapshot is actually there
    if !snapshot.exists() {
        return Err(format!("snapshot not found: {}", snapshot.display()));
    }

    fsops::remove_path_all(&backup.artifact_path)
        .map_err(|err| format!("cannot clear current state: {err}"))?;

    if snapshot.is_dir() {
        fsops::copy_dir_recursive(snapshot, &backup.artifact_path, true)
            .map_err(|err| format!("cannot restore tree: {err}"))
    } else {
        if let Some(parent) = backup.artifact_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("cannot recreate parent directory: {err}"))?;
        }
        fs::copy(snapshot, &backup.artifact_path)
            .map(|_| ())
            .map_err(|err| format!("cannot restore file: {err}"))
    }
}

fn remove(backup: &Backup) -> Result<(), String> {
    fsops::remove_path_all(&backup.artifact_path)
        .map_err(|err| format!("cannot remove created artifact: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backup::BackupManager;
    use tempfile::TempDir;

    #[test]
    fn test_rollback_restores_modified_file_byte_identical() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("config.json");
        fs::write(&artifact, "original content").unwrap();

        let mut manager = BackupManager::new().unwrap();
        let backup = manager.capture("write:config", &artifact).unwrap();
        fs::write(&artifact, "clobbered").unwrap();

        let report = rollback(&[backup]);

        assert!(report.is_clean());
        assert_eq!(fs::read_to_string(&artifact).unwrap(), "original content");
    }

    #[test]
    fn test_rollback_deletes_artifact_that_did_not_exist() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("ccnotify.py");

        let mut manager = BackupManager::new().unwrap();
        let backup = manager.capture("write:hook-script", &artifact).unwrap();
        fs::write(&artifact, "new file").unwrap();

        let report = rollback(&[backup]);

        assert!(report.is_clean());
        assert!(!artifact.exists());
        assert_eq!(report.removed.len(), 1);
    }

    #[test]
    fn test_rollback_restores_deleted_tree() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("legacy");
        fs::create_dir_all(&tree).unwrap();
        fs::write(tree.join("config.json"), "legacy config").unwrap();

        let mut manager = BackupManager::new().unwrap();
        let backup = manager.capture("purge:legacy", &tree).unwrap();
        fsops::remove_path_all(&tree).unwrap();
        assert!(!tree.exists());

        let report = rollback(&[backup]);

        assert!(report.is_clean());
        assert_eq!(
            fs::read_to_string(tree.join("config.json")).unwrap(),
            "legacy config"
        );
    }

    #[test]
    fn test_rollback_runs_in_reverse_order() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("base");
        let file = dir.join("config.json");

        let mut manager = BackupManager::new().unwrap();
        // captured in execution order: dir created first, then file written
        let dir_backup = manager.capture("create-dir:base", &dir).unwrap();
        fs::create_dir_all(&dir).unwrap();
        let file_backup = manager.capture("write:config", &file).unwrap();
        fs::write(&file, "x").unwrap();

        let report = rollback(&[dir_backup, file_backup]);

        // file removed before its directory, so both removals succeed
        assert!(report.is_clean());
        assert!(!dir.exists());
    }

    #[test]
    fn test_rollback_failure_is_recorded_not_propagated() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.json");
        fs::write(&good, "keep me").unwrap();

        let mut manager = BackupManager::new().unwrap();
        let mut broken = manager.capture("write:config", &good).unwrap();
        // sabotage: snapshot path that no longer exists
        broken.snapshot_path = Some(temp.path().join("vanished-snapshot"));
        let ok_backup = manager.capture("write:hook-script", &good).unwrap();
        fs::write(&good, "clobbered").unwrap();

        let report = rollback(&[broken, ok_backup]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.restored.len(), 1);
        // the healthy backup was still applied
        assert_eq!(fs::read_to_string(&good).unwrap(), "keep me");
    }
}
