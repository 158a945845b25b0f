//! State probe: an immutable snapshot of what is on disk
//!
//! Pure read. Nothing in here fails: an unreadable path is recorded as
//! absent, an unparsable version marker as "version unknown". The snapshot
//! is rebuilt on every invocation and never mutated downstream.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use semver::Version;

use crate::assets::{self, AssetState};
use crate::config::{self, ConfigProbe};
use crate::engine::target::HookEvent;
use crate::hooks;
use crate::paths::InstallPaths;
use crate::template;

/// Which directory convention an install was found under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// No install found
    None,
    /// Only the old base directory exists
    Legacy,
    /// The current base directory exists
    Current,
}

/// Snapshot of one install, as found by [`probe`]
#[derive(Debug, Clone)]
pub struct InstallationState {
    pub layout: Layout,

    /// The legacy directory also exists alongside a current install; it is
    /// surfaced as a migratable issue rather than a layout value
    pub legacy_remnant: bool,

    /// Version marker parsed from the installed hook script
    pub script_version: Option<Version>,

    pub config: ConfigProbe,

    pub assets: AssetState,

    /// Events with a hook entry pointing at the current script location
    pub registered_events: BTreeSet<HookEvent>,
}

impl InstallationState {
    /// Any install found at all
    pub fn present(&self) -> bool {
        self.layout != Layout::None
    }

    /// Where artifacts live for this snapshot's layout
    fn effective(paths: &InstallPaths, layout: Layout) -> (PathBuf, PathBuf) {
        match layout {
            Layout::Legacy => (paths.legacy_config_file(), paths.legacy_models_dir()),
            _ => (paths.config_file.clone(), paths.models_dir.clone()),
        }
    }
}

/// Inspect the filesystem and host configuration. No side effects.
pub fn probe(paths: &InstallPaths) -> InstallationState {
    let current = paths.base_dir.is_dir();
    let legacy = paths.legacy_dir.is_dir();

    // when both exist, current wins and legacy becomes a migratable remnant
    let (layout, legacy_remnant) = match (current, legacy) {
        (true, remnant) => (Layout::Current, remnant),
        (false, true) => (Layout::Legacy, false),
        (false, false) => (Layout::None, false),
    };

    let (config_file, models_dir) = InstallationState::effective(paths, layout);

    let registered_events = hooks::read_settings(&paths.settings_file)
        .map(|settings| hooks::registered_events(&settings, &paths.hook_script))
        .unwrap_or_default();

    InstallationState {
        layout,
        legacy_remnant,
        script_version: read_script_version(paths, layout),
        config: config::probe_file(&config_file),
        assets: assets::probe_assets(&models_dir),
        registered_events,
    }
}

fn read_script_version(paths: &InstallPaths, layout: Layout) -> Option<Version> {
    let script = match layout {
        Layout::Current => paths.hook_script.clone(),
        Layout::Legacy => paths.legacy_hook_script(),
        Layout::None => return None,
    };

    let content = fs::read_to_string(script).ok()?;
    template::extract_version(&content)
}
