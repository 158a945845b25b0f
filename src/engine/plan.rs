//! Reconciliation planner: issues to an ordered, deduplicated action plan
//!
//! Each issue kind maps to one canonical action template. The builder
//! memoizes by action id so two issues needing the same fix produce one
//! action, inserts directory creation ahead of anything that writes beneath
//! it, and threads the legacy migration ahead of every other action. The
//! final order is a topological sort over `depends_on` with declaration
//! order breaking ties, so the same inputs always yield the same plan.

use std::collections::HashSet;
use std::path::PathBuf;

use semver::Version;

use crate::assets::{self, ModelAsset};
use crate::engine::diagnose::{Issue, IssueKind};
use crate::engine::target::{HookEvent, Provider, TargetSpec};
use crate::error::{CcnotifyError, Result};
use crate::paths::InstallPaths;

/// Content source for a `WriteFile` action
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The embedded hook script template at a given version
    HookScript { version: Version },
    /// The configuration document, merged over whatever exists
    Config { provider: Provider },
    /// The asset bundle version marker
    AssetsVersionMarker { version: Version },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    CreateDir {
        path: PathBuf,
    },
    WriteFile {
        path: PathBuf,
        payload: Payload,
    },
    CopyTree {
        from: PathBuf,
        to: PathBuf,
    },
    DeleteTree {
        path: PathBuf,
    },
    DownloadAsset {
        asset: ModelAsset,
        dest: PathBuf,
        /// Re-download even when the file on disk looks intact
        refresh: bool,
    },
    RegisterHook {
        events: Vec<HookEvent>,
    },
}

/// One idempotent step of a plan
#[derive(Debug, Clone)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub depends_on: Vec<String>,
}

impl Action {
    /// Short human description for plans and reports
    pub fn label(&self) -> String {
        match &self.kind {
            ActionKind::CreateDir { path } => format!("create directory {}", path.display()),
            ActionKind::WriteFile { path, payload } => match payload {
                Payload::HookScript { version } => {
                    format!("write hook script {} (v{version})", path.display())
                }
                Payload::Config { provider } => {
                    format!("write configuration {} (provider {provider})", path.display())
                }
                Payload::AssetsVersionMarker { version } => {
                    format!("record asset bundle version {version}")
                }
            },
            ActionKind::CopyTree { from, to } => {
                format!("migrate {} -> {}", from.display(), to.display())
            }
            ActionKind::DeleteTree { path } => format!("remove {}", path.display()),
            ActionKind::DownloadAsset { asset, .. } => {
                format!("download {} ({} MB)", asset.name, asset.size / 1_048_576)
            }
            ActionKind::RegisterHook { events } => {
                format!("register hooks for {} event(s)", events.len())
            }
        }
    }
}

/// Ordered action sequence plus the blocking issues it leaves unresolved
/// (only ever non-empty when the operator explicitly deferred a fix)
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub unresolved: Vec<String>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// Turn an issue set into an ordered plan against the given target.
pub fn plan(issues: &[Issue], target: &TargetSpec, paths: &InstallPaths) -> Result<Plan> {
    // fail fast before any side effect when a blocking issue cannot be fixed
    // without the operator
    if target.non_interactive {
        if let Some(issue) = issues
            .iter()
            .find(|issue| issue.is_blocking() && issue.proposed_fix.is_none())
        {
            return Err(CcnotifyError::PlanningFailed {
                reason: format!("{} ({})", issue.kind.as_str(), issue.detail),
            });
        }
    }

    let mut builder = PlanBuilder::new(target, paths);

    for issue in issues {
        match issue.kind {
            IssueKind::MissingInstall => builder.bootstrap()?,
            IssueKind::LegacyLayout => builder.ensure_migration(),
            IssueKind::StaleScript => builder.ensure_hook_script(),
            IssueKind::MissingConfig | IssueKind::CorruptConfig => builder.ensure_config()?,
            IssueKind::MissingModelAssets => {
                if target.fetch_assets {
                    builder.ensure_assets(false);
                } else {
                    // operator deferred the download; reported, never silent
                    builder.unresolved.push(format!(
                        "{}: {} (run 'ccnotify setup --kokoro' to fetch)",
                        issue.kind.as_str(),
                        issue.detail
                    ));
                }
            }
            IssueKind::StaleModelAssets => builder.ensure_assets(true),
            IssueKind::MissingHookRegistration => builder.ensure_register(),
        }
    }

    builder.into_plan()
}

struct PlanBuilder<'a> {
    target: &'a TargetSpec,
    paths: &'a InstallPaths,
    actions: Vec<Action>,
    unresolved: Vec<String>,
}

impl<'a> PlanBuilder<'a> {
    fn new(target: &'a TargetSpec, paths: &'a InstallPaths) -> Self {
        Self {
            target,
            paths,
            actions: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    fn has(&self, id: &str) -> bool {
        self.actions.iter().any(|action| action.id == id)
    }

    fn push(&mut self, id: &str, kind: ActionKind, depends_on: Vec<String>) {
        if !self.has(id) {
            self.actions.push(Action {
                id: id.to_string(),
                kind,
                depends_on,
            });
        }
    }

    /// Dependency every non-migration action must carry when a migration is
    /// planned: later actions assume the current layout.
    fn migration_dep(&self) -> Option<String> {
        self.has("migrate:legacy").then(|| "migrate:legacy".to_string())
    }

    fn base_deps(&self, mut deps: Vec<String>) -> Vec<String> {
        if let Some(migration) = self.migration_dep() {
            if !deps.contains(&migration) {
                deps.push(migration);
            }
        }
        deps
    }

    fn ensure_base_dir(&mut self) -> String {
        self.push(
            "create-dir:base",
            ActionKind::CreateDir {
                path: self.paths.base_dir.clone(),
            },
            Vec::new(),
        );
        "create-dir:base".to_string()
    }

    fn ensure_models_dir(&mut self) -> String {
        let base = self.ensure_base_dir();
        self.push(
            "create-dir:models",
            ActionKind::CreateDir {
                path: self.paths.models_dir.clone(),
            },
            self.base_deps(vec![base]),
        );
        "create-dir:models".to_string()
    }

    fn ensure_migration(&mut self) {
        let base = self.ensure_base_dir();
        self.push(
            "migrate:legacy",
            ActionKind::CopyTree {
                from: self.paths.legacy_dir.clone(),
                to: self.paths.base_dir.clone(),
            },
            vec![base],
        );
        self.push(
            "purge:legacy",
            ActionKind::DeleteTree {
                path: self.paths.legacy_dir.clone(),
            },
            vec!["migrate:legacy".to_string()],
        );
    }

    fn ensure_hook_script(&mut self) {
        let base = self.ensure_base_dir();
        self.push(
            "write:hook-script",
            ActionKind::WriteFile {
                path: self.paths.hook_script.clone(),
                payload: Payload::HookScript {
                    version: self.target.version.clone(),
                },
            },
            self.base_deps(vec![base]),
        );
    }

    fn ensure_config(&mut self) -> Result<()> {
        let provider = self.target.provider.ok_or_else(|| CcnotifyError::PlanningFailed {
            reason: "a configuration must be written but no TTS provider was chosen".to_string(),
        })?;

        let base = self.ensure_base_dir();
        self.push(
            "write:config",
            ActionKind::WriteFile {
                path: self.paths.config_file.clone(),
                payload: Payload::Config { provider },
            },
            self.base_deps(vec![base]),
        );
        Ok(())
    }

    fn ensure_assets(&mut self, refresh: bool) {
        let models = self.ensure_models_dir();
        let mut download_ids = Vec::new();

        for asset in assets::catalog() {
            let id = format!("fetch:{}", asset.name);
            self.push(
                &id,
                ActionKind::DownloadAsset {
                    asset: asset.clone(),
                    dest: self.paths.models_dir.join(asset.name),
                    refresh,
                },
                self.base_deps(vec![models.clone()]),
            );
            download_ids.push(id);
        }

        self.push(
            "write:assets-version",
            ActionKind::WriteFile {
                path: self.paths.assets_version_file.clone(),
                payload: Payload::AssetsVersionMarker {
                    version: assets::target_assets_version(),
                },
            },
            self.base_deps(download_ids),
        );
    }

    fn ensure_register(&mut self) {
        // registration records the script path, so the script write (if any)
        // comes first
        let deps = if self.has("write:hook-script") {
            vec!["write:hook-script".to_string()]
        } else {
            Vec::new()
        };

        self.push(
            "register:hooks",
            ActionKind::RegisterHook {
                events: self.target.events.clone(),
            },
            self.base_deps(deps),
        );
    }

    /// Full from-scratch template
    fn bootstrap(&mut self) -> Result<()> {
        self.ensure_hook_script();
        self.ensure_config()?;
        if self.target.wants_local_assets() && self.target.fetch_assets {
            self.ensure_assets(false);
        }
        if self.target.register_hooks {
            self.ensure_register();
        }
        Ok(())
    }

    fn into_plan(self) -> Result<Plan> {
        let actions = topo_sort(self.actions)?;
        Ok(Plan {
            actions,
            unresolved: self.unresolved,
        })
    }
}

/// Stable topological sort: among ready actions, declaration order wins.
fn topo_sort(actions: Vec<Action>) -> Result<Vec<Action>> {
    let mut remaining = actions;
    let mut sorted: Vec<Action> = Vec::with_capacity(remaining.len());
    let mut emitted: HashSet<String> = HashSet::new();

    while !remaining.is_empty() {
        let next = remaining.iter().position(|action| {
            action
                .depends_on
                .iter()
                .all(|dep| emitted.contains(dep) || !remaining.iter().any(|a| a.id == *dep))
        });

        match next {
            Some(index) => {
                let action = remaining.remove(index);
                emitted.insert(action.id.clone());
                sorted.push(action);
            }
            None => {
                return Err(CcnotifyError::PlanningFailed {
                    reason: "action dependency cycle".to_string(),
                });
            }
        }
    }

    Ok(sorted)
}
