//! Pre-action artifact snapshots, held for the duration of one run
//!
//! Every mutating action gets its targets captured here before it runs.
//! Snapshots live in a quarantine directory keyed by a run identifier, so
//! two concurrent invocations never collide, and are discarded when the run
//! succeeds. A backup for a path that did not exist records that fact; its
//! rollback is a delete, not a restore.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

use crate::error::{CcnotifyError, Result};
use crate::fsops;

/// One captured artifact
#[derive(Debug, Clone)]
pub struct Backup {
    pub action_id: String,
    pub artifact_path: PathBuf,
    /// Quarantine copy; `None` when the artifact did not exist
    pub snapshot_path: Option<PathBuf>,
    pub existed_before: bool,
}

/// Owns the quarantine directory and every snapshot taken during one run
pub struct BackupManager {
    quarantine: Option<TempDir>,
    seq: u32,
}

impl BackupManager {
    pub fn new() -> Result<Self> {
        let run_id = format!("{}-{}", std::process::id(), unix_millis());
        let quarantine = tempfile::Builder::new()
            .prefix(&format!("ccnotify-backup-{run_id}-"))
            .tempdir()
            .map_err(|err| CcnotifyError::IoError {
                message: format!("cannot create quarantine directory: {err}"),
            })?;

        Ok(Self {
            quarantine: Some(quarantine),
            seq: 0,
        })
    }

    /// Snapshot one artifact ahead of the action that will touch it.
    pub fn capture(
        &mut self,
        action_id: &str,
        artifact: &Path,
    ) -> std::result::Result<Backup, String> {
        if !artifact.exists() {
            return Ok(Backup {
                action_id: action_id.to_string(),
                artifact_path: artifact.to_path_buf(),
                snapshot_path: None,
                existed_before: false,
            });
        }

        let quarantine = self
            .quarantine
            .as_ref()
            .ok_or_else(|| "quarantine directory already released".to_string())?;

        self.seq += 1;
        let file_name = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let snapshot = quarantine.path().join(format!("{:03}-{file_name}", self.seq));

        let copied = if artifact.is_dir() {
            fsops::copy_dir_recursive(artifact, &snapshot, true)
        } else {
            fs::copy(artifact, &snapshot).map(|_| ())
        };
        copied.map_err(|err| format!("cannot snapshot {}: {err}", artifact.display()))?;

        Ok(Backup {
            action_id: action_id.to_string(),
            artifact_path: artifact.to_path_buf(),
            snapshot_path: Some(snapshot),
            existed_before: true,
        })
    }

    /// Persist the quarantine directory past the end of the run. Used only
    /// for partial rollbacks, where the operator needs the snapshots.
    pub fn retain(mut self) -> Option<PathBuf> {
        self.quarantine.take().map(TempDir::keep)
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}
