//! On-disk layout of a ccnotify installation
//!
//! All path knowledge lives here so the probe, planner, and executor agree
//! on where every artifact belongs.
//!
//! ## Layout
//!
//! ```text
//! ~/.claude/                      # Claude profile directory
//! ├── settings.json               # host settings, hook entries merged in
//! ├── hooks/ccnotify/             # legacy base directory (pre-0.2)
//! └── ccnotify/                   # current base directory
//!     ├── ccnotify.py             # installed hook script
//!     ├── config.json             # ccnotify configuration
//!     └── models/                 # Kokoro model assets
//!         └── .assets-version     # installed asset bundle version
//! ```

use std::path::{Path, PathBuf};

use crate::error::{CcnotifyError, Result};

/// Base directory name under the profile directory
pub const BASE_DIR_NAME: &str = "ccnotify";

/// Parent of the legacy base directory
pub const LEGACY_PARENT: &str = "hooks";

/// Installed hook script filename
pub const HOOK_SCRIPT_FILE: &str = "ccnotify.py";

/// Configuration filename
pub const CONFIG_FILE: &str = "config.json";

/// Model assets subdirectory
pub const MODELS_DIR_NAME: &str = "models";

/// Asset bundle version marker, inside the models directory
pub const ASSETS_VERSION_FILE: &str = ".assets-version";

/// Host settings filename, directly under the profile directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Resolved locations of every artifact the engine manages
#[derive(Debug, Clone)]
pub struct InstallPaths {
    /// Claude profile directory (usually `~/.claude`)
    pub profile_dir: PathBuf,

    /// Current base directory (`<profile>/ccnotify`)
    pub base_dir: PathBuf,

    /// Legacy base directory (`<profile>/hooks/ccnotify`)
    pub legacy_dir: PathBuf,

    /// Installed hook script (`<base>/ccnotify.py`)
    pub hook_script: PathBuf,

    /// Configuration file (`<base>/config.json`)
    pub config_file: PathBuf,

    /// Model assets directory (`<base>/models`)
    pub models_dir: PathBuf,

    /// Asset bundle version marker (`<models>/.assets-version`)
    pub assets_version_file: PathBuf,

    /// Host settings file (`<profile>/settings.json`)
    pub settings_file: PathBuf,
}

impl InstallPaths {
    /// Resolve paths from an optional `--profile` override.
    ///
    /// Defaults to `~/.claude`. An existing profile directory is
    /// canonicalized so later comparisons are stable across symlinks.
    pub fn resolve(profile: Option<PathBuf>) -> Result<Self> {
        let profile_dir = match profile {
            Some(path) => expand_tilde(&path),
            None => dirs::home_dir()
                .map(|home| home.join(".claude"))
                .ok_or_else(|| CcnotifyError::IoError {
                    message: "could not determine home directory".to_string(),
                })?,
        };

        let profile_dir = if profile_dir.exists() {
            dunce::canonicalize(&profile_dir).unwrap_or(profile_dir)
        } else {
            profile_dir
        };

        Ok(Self::rooted_at(profile_dir))
    }

    /// Build the full path set under a known profile directory.
    pub fn rooted_at(profile_dir: PathBuf) -> Self {
        let base_dir = profile_dir.join(BASE_DIR_NAME);
        let legacy_dir = profile_dir.join(LEGACY_PARENT).join(BASE_DIR_NAME);
        let models_dir = base_dir.join(MODELS_DIR_NAME);

        Self {
            hook_script: base_dir.join(HOOK_SCRIPT_FILE),
            config_file: base_dir.join(CONFIG_FILE),
            assets_version_file: models_dir.join(ASSETS_VERSION_FILE),
            settings_file: profile_dir.join(SETTINGS_FILE),
            base_dir,
            legacy_dir,
            models_dir,
            profile_dir,
        }
    }

    /// Hook script location under the legacy layout
    pub fn legacy_hook_script(&self) -> PathBuf {
        self.legacy_dir.join(HOOK_SCRIPT_FILE)
    }

    /// Config file location under the legacy layout
    pub fn legacy_config_file(&self) -> PathBuf {
        self.legacy_dir.join(CONFIG_FILE)
    }

    /// Models directory under the legacy layout
    pub fn legacy_models_dir(&self) -> PathBuf {
        self.legacy_dir.join(MODELS_DIR_NAME)
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };

    if text == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }

    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    path.to_path_buf()
}
