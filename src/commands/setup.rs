//! Setup command implementation
//!
//! Reconciliation scoped to TTS asset management: install or refresh the
//! Kokoro models, list voices, or clean the models directory up. Asset
//! actions go through the same planner/executor/rollback machinery as a
//! full install; only the issue set is narrower.

use std::fs;
use std::path::PathBuf;

use console::Style;
use inquire::Confirm;

use crate::assets::{self, HttpModelFetcher};
use crate::cli::SetupArgs;
use crate::engine::diagnose::{Issue, IssueKind, Severity};
use crate::engine::state::probe;
use crate::engine::target::{Provider, TargetSpec};
use crate::engine::{self, ExecutionOutcome, plan};
use crate::error::{CcnotifyError, Result};
use crate::fsops;
use crate::paths::InstallPaths;
use crate::ui;

pub fn run(profile: Option<PathBuf>, args: SetupArgs) -> Result<()> {
    if args.voices {
        list_voices();
        return Ok(());
    }

    let paths = InstallPaths::resolve(profile)?;

    if args.cleanup {
        return cleanup_models(&paths, args.yes);
    }

    if !args.kokoro && !args.update {
        println!("Nothing to do.");
        println!("Pass --kokoro to install models, --voices to list voices, or --cleanup to remove them.");
        return Ok(());
    }

    reconcile_assets(&paths, &args)
}

fn reconcile_assets(paths: &InstallPaths, args: &SetupArgs) -> Result<()> {
    if !paths.profile_dir.is_dir() {
        return Err(CcnotifyError::ProfileNotFound {
            path: paths.profile_dir.display().to_string(),
        });
    }

    let state = probe(paths);
    let issues = asset_issues(&state.assets, args.update);

    if issues.is_empty() {
        println!(
            "{} model assets are installed and up to date (bundle {})",
            Style::new().green().bold().apply_to("OK:"),
            assets::target_assets_version()
        );
        return Ok(());
    }

    ui::render_issues(&issues);

    let mut target = TargetSpec::new(Some(Provider::Kokoro));
    target.register_hooks = false;
    target.non_interactive = args.yes;
    let plan = plan::plan(&issues, &target, paths)?;
    ui::render_plan(&plan);

    if !args.yes {
        let proceed = Confirm::new("Download now?").with_default(true).prompt()?;
        if !proceed {
            println!("Aborted. No changes were made.");
            return Ok(());
        }
    }

    let fetcher = HttpModelFetcher::new();
    let outcome = engine::apply(paths, &plan, &fetcher)?;
    ui::render_outcome(&outcome);

    match outcome {
        ExecutionOutcome::Completed(_) => Ok(()),
        ExecutionOutcome::RolledBack { failure, .. } => Err(CcnotifyError::ExecutionRolledBack {
            action: failure.label,
            reason: failure.reason,
        }),
        ExecutionOutcome::PartiallyRolledBack { failure, .. } => {
            Err(CcnotifyError::ExecutionPartialRollback {
                action: failure.label,
                reason: failure.reason,
            })
        }
    }
}

/// The asset-scoped slice of the issue catalog. `--update` forces a
/// re-download even when everything looks intact.
fn asset_issues(state: &assets::AssetState, update: bool) -> Vec<Issue> {
    if !state.all_present {
        return vec![Issue {
            kind: IssueKind::MissingModelAssets,
            severity: Severity::Blocking,
            detail: format!("missing model files: {}", state.missing.join(", ")),
            proposed_fix: Some("download the Kokoro model assets".to_string()),
        }];
    }

    let stale = state
        .version
        .as_ref()
        .is_none_or(|installed| *installed < assets::target_assets_version());

    if update || stale {
        return vec![Issue {
            kind: IssueKind::StaleModelAssets,
            severity: Severity::Blocking,
            detail: if update {
                "re-download requested".to_string()
            } else {
                format!(
                    "installed asset bundle is {}, target is {}",
                    state
                        .version
                        .as_ref()
                        .map_or_else(|| "unversioned".to_string(), ToString::to_string),
                    assets::target_assets_version()
                )
            },
            proposed_fix: Some("re-download the Kokoro model assets".to_string()),
        }];
    }

    Vec::new()
}

fn list_voices() {
    let heading = Style::new().bold();

    println!("{}", heading.apply_to("Available Kokoro voices:"));
    println!();
    for (category, names) in assets::voices() {
        println!("{}", heading.apply_to(*category));
        for name in *names {
            println!("  {name}");
        }
        println!();
    }
    println!("Voice blending examples:");
    println!("  af_sarah:60,am_adam:40  (60% Sarah + 40% Adam)");
    println!("  af_bella:80,af_nova:20  (80% Bella + 20% Nova)");
}

fn cleanup_models(paths: &InstallPaths, yes: bool) -> Result<()> {
    let files = assets::model_files(&paths.models_dir);
    if files.is_empty() {
        println!("No model files found to clean up.");
        return Ok(());
    }

    let total = fsops::dir_size(&paths.models_dir);
    println!(
        "Found {} model file(s) ({:.1} MB) under {}",
        files.len(),
        total as f64 / 1_048_576.0,
        paths.models_dir.display()
    );

    if !yes {
        let proceed = Confirm::new("Delete all model files?")
            .with_default(false)
            .prompt()?;
        if !proceed {
            println!("Cleanup cancelled.");
            return Ok(());
        }
    }

    for file in &files {
        fs::remove_file(file).map_err(|err| CcnotifyError::FileWriteFailed {
            path: file.display().to_string(),
            reason: err.to_string(),
        })?;
        println!("  deleted {}", file.display());
    }

    // the version marker describes files that are now gone
    let _ = fs::remove_file(&paths.assets_version_file);

    // drop the directory when nothing else lives in it
    if fs::read_dir(&paths.models_dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
    {
        let _ = fs::remove_dir(&paths.models_dir);
    }

    println!(
        "{} cleanup complete, reclaimed {:.1} MB",
        Style::new().green().bold().apply_to("OK:"),
        total as f64 / 1_048_576.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    #[test]
    fn test_asset_issues_missing_files() {
        let state = assets::AssetState {
            all_present: false,
            missing: vec!["kokoro-v1.0.onnx"],
            version: None,
        };

        let issues = asset_issues(&state, false);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingModelAssets);
    }

    #[test]
    fn test_asset_issues_up_to_date() {
        let state = assets::AssetState {
            all_present: true,
            missing: vec![],
            version: Some(assets::target_assets_version()),
        };

        assert!(asset_issues(&state, false).is_empty());
    }

    #[test]
    fn test_asset_issues_update_forces_redownload() {
        let state = assets::AssetState {
            all_present: true,
            missing: vec![],
            version: Some(assets::target_assets_version()),
        };

        let issues = asset_issues(&state, true);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::StaleModelAssets);
    }

    #[test]
    fn test_asset_issues_old_bundle_is_stale() {
        let state = assets::AssetState {
            all_present: true,
            missing: vec![],
            version: Some(Version::new(0, 9, 0)),
        };

        let issues = asset_issues(&state, false);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::StaleModelAssets);
    }
}
