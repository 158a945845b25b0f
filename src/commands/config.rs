//! Config command implementation
//!
//! Read-only display or single-artifact reconciliation of `config.json`.
//! Everything here is scoped to the configuration file; hooks and models are
//! untouched.

use std::path::PathBuf;

use console::Style;
use inquire::Confirm;

use crate::config::{self, ConfigProbe};
use crate::cli::ConfigArgs;
use crate::engine::target::Provider;
use crate::error::Result;
use crate::paths::InstallPaths;

pub fn run(profile: Option<PathBuf>, args: ConfigArgs) -> Result<()> {
    let paths = InstallPaths::resolve(profile)?;

    if args.init {
        return init(&paths);
    }
    if args.reset {
        return reset(&paths, args.yes);
    }
    if args.show {
        return show(&paths);
    }

    // no flag given: default to showing
    show(&paths)
}

fn show(paths: &InstallPaths) -> Result<()> {
    let heading = Style::new().bold();

    println!("{}", heading.apply_to("ccnotify configuration:"));
    println!("  profile directory: {}", paths.profile_dir.display());
    println!("  config file:       {}", paths.config_file.display());
    println!("  models directory:  {}", paths.models_dir.display());
    println!("  settings file:     {}", paths.settings_file.display());
    println!();

    match config::probe_file(&paths.config_file) {
        ConfigProbe::Missing => {
            println!("No configuration found. Create one with 'ccnotify config --init'.");
        }
        ConfigProbe::Corrupt(reason) => {
            println!(
                "{} configuration fails validation: {reason}",
                Style::new().red().bold().apply_to("Warning:")
            );
            println!("Repair it with 'ccnotify install' or 'ccnotify config --reset'.");
        }
        ConfigProbe::Present(_) => {
            let config = config::load(&paths.config_file)?;
            println!("  provider:      {}", config.tts.provider);
            println!("  tts enabled:   {}", config.tts.enabled);
            println!("  notifications: {}", config.notifications.enabled);
            println!("  logging:       {}", config.logging.enabled);
            if let Some(kokoro) = &config.kokoro {
                println!("  kokoro voice:  {} (speed {})", kokoro.voice, kokoro.speed);
            }
            if let Some(elevenlabs) = &config.elevenlabs {
                println!(
                    "  elevenlabs:    voice {} / model {}",
                    elevenlabs.voice_id, elevenlabs.model_id
                );
            }
        }
    }

    Ok(())
}

fn init(paths: &InstallPaths) -> Result<()> {
    if paths.config_file.exists() {
        println!(
            "Configuration already exists at {}",
            paths.config_file.display()
        );
        println!("Use 'ccnotify config --reset' to start over.");
        return Ok(());
    }

    if let Some(parent) = paths.config_file.parent() {
        std::fs::create_dir_all(parent).map_err(|err| crate::error::CcnotifyError::IoError {
            message: format!("cannot create {}: {err}", parent.display()),
        })?;
    }

    let document = config::merged_document(None, Provider::None);
    config::write_document(&paths.config_file, &document)?;
    println!(
        "{} created {}",
        Style::new().green().bold().apply_to("OK:"),
        paths.config_file.display()
    );
    println!("Pick a TTS provider with 'ccnotify install'.");
    Ok(())
}

fn reset(paths: &InstallPaths, yes: bool) -> Result<()> {
    if !yes {
        let proceed = Confirm::new("Reset configuration to defaults?")
            .with_default(false)
            .prompt()?;
        if !proceed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    // resetting keeps the configured provider; everything else returns to
    // defaults
    let provider = match config::probe_file(&paths.config_file) {
        ConfigProbe::Present(provider) => provider,
        _ => Provider::None,
    };

    if let Some(parent) = paths.config_file.parent() {
        std::fs::create_dir_all(parent).map_err(|err| crate::error::CcnotifyError::IoError {
            message: format!("cannot create {}: {err}", parent.display()),
        })?;
    }

    let document = config::merged_document(None, provider);
    config::write_document(&paths.config_file, &document)?;
    println!(
        "{} configuration reset to defaults (provider {provider})",
        Style::new().green().bold().apply_to("OK:")
    );
    Ok(())
}
