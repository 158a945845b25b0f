//! Executor: applies a plan action-by-action
//!
//! Strict plan order, no automatic retry, no best-effort continuation. Each
//! action is pre-checked for satisfaction (a satisfied action is a skip, not
//! a rewrite), has its targets captured by the backup manager, and only then
//! runs. The first failure halts the run; the caller decides what to do with
//! the captured backups.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{self, ModelFetcher};
use crate::config::{self, ConfigProbe};
use crate::engine::backup::{Backup, BackupManager};
use crate::engine::plan::{Action, ActionKind, Payload, Plan};
use crate::fsops;
use crate::hooks;
use crate::paths::InstallPaths;
use crate::template;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// Pre-check found the action's effect already in place
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ActionReport {
    pub action_id: String,
    pub label: String,
    pub outcome: ActionOutcome,
}

/// Per-action outcomes for one run
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub entries: Vec<ActionReport>,
    /// Actions after the failing one that never ran
    pub not_run: usize,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Succeeded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, ActionOutcome::Skipped))
    }

    fn count(&self, predicate: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }
}

/// The action that halted a run
#[derive(Debug, Clone)]
pub struct ActionFailure {
    pub action_id: String,
    pub label: String,
    pub reason: String,
}

pub struct Executor<'a> {
    paths: &'a InstallPaths,
    fetcher: &'a dyn ModelFetcher,
}

impl<'a> Executor<'a> {
    pub fn new(paths: &'a InstallPaths, fetcher: &'a dyn ModelFetcher) -> Self {
        Self { paths, fetcher }
    }

    /// Run the plan, capturing every touched artifact into `backups` first.
    ///
    /// Returns the report, the backups taken (in execution order), and the
    /// failure that halted the run, if any.
    pub fn execute(
        &self,
        plan: &Plan,
        backups: &mut BackupManager,
    ) -> (ExecutionReport, Vec<Backup>, Option<ActionFailure>) {
        let mut report = ExecutionReport::default();
        let mut captured: Vec<Backup> = Vec::new();

        for (index, action) in plan.actions.iter().enumerate() {
            if self.is_satisfied(action) {
                report.entries.push(ActionReport {
                    action_id: action.id.clone(),
                    label: action.label(),
                    outcome: ActionOutcome::Skipped,
                });
                continue;
            }

            // capture first; the action only runs after a successful backup
            let capture_result = self
                .mutation_targets(action)
                .into_iter()
                .try_for_each(|target| {
                    backups
                        .capture(&action.id, &target)
                        .map(|backup| captured.push(backup))
                });

            let outcome = match capture_result {
                Ok(()) => self.perform(action),
                Err(reason) => Err(format!("backup failed: {reason}")),
            };

            match outcome {
                Ok(()) => report.entries.push(ActionReport {
                    action_id: action.id.clone(),
                    label: action.label(),
                    outcome: ActionOutcome::Succeeded,
                }),
                Err(reason) => {
                    report.entries.push(ActionReport {
                        action_id: action.id.clone(),
                        label: action.label(),
                        outcome: ActionOutcome::Failed(reason.clone()),
                    });
                    report.not_run = plan.actions.len() - index - 1;
                    let failure = ActionFailure {
                        action_id: action.id.clone(),
                        label: action.label(),
                        reason,
                    };
                    return (report, captured, Some(failure));
                }
            }
        }

        (report, captured, None)
    }

    /// Idempotence pre-check: is the action's effect already in place?
    fn is_satisfied(&self, action: &Action) -> bool {
        match &action.kind {
            ActionKind::CreateDir { path } => path.is_dir(),
            ActionKind::WriteFile { path, payload } => match payload {
                Payload::HookScript { version } => fs::read_to_string(path)
                    .ok()
                    .and_then(|content| template::extract_version(&content))
                    .is_some_and(|installed| installed == *version),
                Payload::Config { provider } => {
                    config::probe_file(path) == ConfigProbe::Present(*provider)
                }
                Payload::AssetsVersionMarker { version } => fs::read_to_string(path)
                    .ok()
                    .and_then(|content| semver::Version::parse(content.trim()).ok())
                    .is_some_and(|installed| installed == *version),
            },
            // a migration whose source is gone has already happened
            ActionKind::CopyTree { from, .. } => !from.exists(),
            ActionKind::DeleteTree { path } => !path.exists(),
            ActionKind::DownloadAsset {
                asset,
                dest,
                refresh,
            } => !*refresh && assets::is_intact(dest, asset),
            ActionKind::RegisterHook { events } => hooks::read_settings(&self.paths.settings_file)
                .map(|settings| hooks::registered_events(&settings, &self.paths.hook_script))
                .is_some_and(|registered| events.iter().all(|event| registered.contains(event))),
        }
    }

    /// Every path the action mutates, for pre-capture
    fn mutation_targets(&self, action: &Action) -> Vec<PathBuf> {
        match &action.kind {
            ActionKind::CreateDir { path }
            | ActionKind::WriteFile { path, .. }
            | ActionKind::DeleteTree { path } => vec![path.clone()],
            ActionKind::CopyTree { to, .. } => vec![to.clone()],
            ActionKind::DownloadAsset { dest, .. } => vec![dest.clone()],
            ActionKind::RegisterHook { .. } => vec![self.paths.settings_file.clone()],
        }
    }

    fn perform(&self, action: &Action) -> Result<(), String> {
        match &action.kind {
            ActionKind::CreateDir { path } => fs::create_dir_all(path)
                .map_err(|err| format!("cannot create {}: {err}", path.display())),
            ActionKind::WriteFile { path, payload } => self.write_payload(path, payload),
            ActionKind::CopyTree { from, to } => {
                // never clobber a current-layout file with its legacy twin
                fsops::copy_dir_recursive(from, to, false)
                    .map_err(|err| format!("cannot migrate {}: {err}", from.display()))
            }
            ActionKind::DeleteTree { path } => fsops::remove_path_all(path)
                .map_err(|err| format!("cannot remove {}: {err}", path.display())),
            ActionKind::DownloadAsset { asset, dest, .. } => self
                .fetcher
                .fetch(asset, dest)
                .map_err(|err| err.to_string()),
            ActionKind::RegisterHook { events } => {
                hooks::register_into_file(&self.paths.settings_file, events, &self.paths.hook_script)
            }
        }
    }

    fn write_payload(&self, path: &Path, payload: &Payload) -> Result<(), String> {
        let write_err = |err: std::io::Error| format!("cannot write {}: {err}", path.display());

        match payload {
            Payload::HookScript { version } => {
                fs::write(path, template::hook_script(version)).map_err(write_err)
            }
            Payload::Config { provider } => {
                let existing = fs::read_to_string(path)
                    .ok()
                    .and_then(|content| serde_json::from_str(&content).ok());
                let document = config::merged_document(existing.as_ref(), *provider);
                config::write_document(path, &document).map_err(|err| err.to_string())
            }
            Payload::AssetsVersionMarker { version } => {
                fs::write(path, format!("{version}\n")).map_err(write_err)
            }
        }
    }
}
