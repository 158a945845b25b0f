//! Reconciliation engine
//!
//! One invocation moves through `Probing -> Diagnosing -> Planning ->
//! (confirmation) -> Executing -> {Succeeded | RollingBack -> {RolledBack |
//! PartialRollback}}`. The modules here map onto those stages; the command
//! layer owns the confirmation step and the rendering of every report.

pub mod backup;
pub mod diagnose;
pub mod executor;
pub mod plan;
pub mod rollback;
pub mod state;
pub mod target;

use std::path::PathBuf;

use crate::assets::ModelFetcher;
use crate::error::Result;
use crate::paths::InstallPaths;

use backup::BackupManager;
use executor::{ActionFailure, ExecutionReport, Executor};
use plan::Plan;
use rollback::RollbackReport;

/// Terminal state of one plan application
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Every action succeeded or was already satisfied
    Completed(ExecutionReport),

    /// An action failed and every captured artifact was restored
    RolledBack {
        report: ExecutionReport,
        failure: ActionFailure,
        rollback: RollbackReport,
    },

    /// An action failed and rollback could not restore every artifact;
    /// the quarantine directory is kept on disk for manual restoration
    PartiallyRolledBack {
        report: ExecutionReport,
        failure: ActionFailure,
        rollback: RollbackReport,
        quarantine: Option<PathBuf>,
    },
}

/// Apply a plan: capture before each mutating action, execute in order,
/// roll back automatically on the first failure.
pub fn apply(
    paths: &InstallPaths,
    plan: &Plan,
    fetcher: &dyn ModelFetcher,
) -> Result<ExecutionOutcome> {
    let mut backups = BackupManager::new()?;
    let executor = Executor::new(paths, fetcher);

    let (report, captured, failure) = executor.execute(plan, &mut backups);

    match failure {
        // backups are discarded with the manager on success
        None => Ok(ExecutionOutcome::Completed(report)),
        Some(failure) => {
            let rollback = rollback::rollback(&captured);
            if rollback.is_clean() {
                Ok(ExecutionOutcome::RolledBack {
                    report,
                    failure,
                    rollback,
                })
            } else {
                let quarantine = backups.retain();
                Ok(ExecutionOutcome::PartiallyRolledBack {
                    report,
                    failure,
                    rollback,
                    quarantine,
                })
            }
        }
    }
}
