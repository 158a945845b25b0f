//! Install command implementation
//!
//! Runs the full reconciliation cycle:
//! 1. Resolve paths and probe the existing install
//! 2. Resolve the target (provider from flag, existing config, or prompt)
//! 3. Diagnose issues and plan corrective actions
//! 4. Confirm with the operator (unless unattended)
//! 5. Execute with pre-capture backups; roll back on failure

use std::fs;
use std::path::PathBuf;

use console::Style;
use inquire::{Confirm, Select};

use crate::assets::HttpModelFetcher;
use crate::cli::InstallArgs;
use crate::config::ConfigProbe;
use crate::engine::diagnose::diagnose;
use crate::engine::state::{InstallationState, probe};
use crate::engine::target::{Provider, TargetSpec};
use crate::engine::{self, ExecutionOutcome, plan};
use crate::error::{CcnotifyError, Result};
use crate::paths::InstallPaths;
use crate::ui;

pub fn run(profile: Option<PathBuf>, verbose: bool, args: InstallArgs) -> Result<()> {
    let paths = InstallPaths::resolve(profile)?;
    ensure_profile_dir(&paths, args.force)?;

    let state = probe(&paths);
    if verbose {
        ui::render_state(&state);
    }

    let provider = resolve_provider(&state, &args)?;
    let mut target = TargetSpec::new(provider);
    target.force = args.force;
    target.non_interactive = args.non_interactive;
    if target.wants_local_assets() && !args.non_interactive && !args.yes {
        target.fetch_assets = Confirm::new("Download the Kokoro models now (~350 MB)?")
            .with_default(true)
            .prompt()?;
    }

    let issues = diagnose(&state, &target);
    if issues.is_empty() {
        println!(
            "{} ccnotify {} is already installed and healthy. Nothing to do.",
            Style::new().green().bold().apply_to("OK:"),
            target.version
        );
        return Ok(());
    }

    ui::render_issues(&issues);

    let plan = plan::plan(&issues, &target, &paths)?;
    if plan.is_empty() {
        for note in &plan.unresolved {
            println!("  deferred: {note}");
        }
        println!("Nothing to apply.");
        return Ok(());
    }

    ui::render_plan(&plan);

    if !args.yes && !args.non_interactive {
        let proceed = Confirm::new(&format!("Apply these {} action(s)?", plan.len()))
            .with_default(true)
            .prompt()?;
        if !proceed {
            println!("Aborted. No changes were made.");
            return Ok(());
        }
    }

    let fetcher = HttpModelFetcher::new();
    let outcome = engine::apply(&paths, &plan, &fetcher)?;
    ui::render_outcome(&outcome);

    match outcome {
        ExecutionOutcome::Completed(_) => {
            print_next_steps(&paths, &target, &plan.unresolved);
            Ok(())
        }
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

/// The profile directory belongs to Claude Code; a missing one usually means
/// the host tool never ran. `--force` creates it anyway.
fn ensure_profile_dir(paths: &InstallPaths, force: bool) -> Result<()> {
    if paths.profile_dir.is_dir() {
        return Ok(());
    }

    if force {
        return fs::create_dir_all(&paths.profile_dir).map_err(|err| CcnotifyError::IoError {
            message: format!(
                "cannot create profile directory {}: {err}",
                paths.profile_dir.display()
            ),
        });
    }

    Err(CcnotifyError::ProfileNotFound {
        path: paths.profile_dir.display().to_string(),
    })
}

/// Provider precedence: flag, then the existing configuration, then a prompt.
/// Unattended runs never guess; planning fails instead.
fn resolve_provider(state: &InstallationState, args: &InstallArgs) -> Result<Option<Provider>> {
    if let Some(provider) = args.provider {
        return Ok(Some(provider));
    }

    if let ConfigProbe::Present(configured) = state.config {
        return Ok(Some(configured));
    }

    if args.non_interactive {
        return Ok(None);
    }

    let choice = Select::new(
        "Which TTS provider would you like to use?",
        vec![
            "kokoro - local, private, ~350 MB model download",
            "elevenlabs - cloud, needs an API key",
            "none - visual notifications only",
        ],
    )
    .prompt()?;

    let name = choice.split_whitespace().next().unwrap_or("none");
    Ok(Provider::from_name(name))
}

fn print_next_steps(paths: &InstallPaths, target: &TargetSpec, unresolved: &[String]) {
    let heading = Style::new().bold();

    println!();
    println!("{}", heading.apply_to("Next steps:"));
    println!("  1. Restart Claude Code to load the new hooks");
    println!(
        "  2. Review the configuration at {}",
        paths.config_file.display()
    );
    match target.provider {
        Some(Provider::Kokoro) => {
            println!("  3. Try 'ccnotify setup --voices' to pick a different voice");
        }
        Some(Provider::Elevenlabs) => {
            println!("  3. Add your ElevenLabs API key to the configuration");
        }
        _ => {
            println!("  3. Configure a TTS provider later with 'ccnotify install'");
        }
    }
    for note in unresolved {
        println!(
            "  {} {note}",
            Style::new().yellow().apply_to("still pending:")
        );
    }
}
