//! Issue catalog: pure diagnosis of divergence from the target
//!
//! `diagnose` is a pure function of `(state, target)`: same inputs, same
//! issues, same order. Rule 1 (nothing installed) short-circuits; every
//! later rule fires independently, because multiple simultaneous issues are
//! the common case and fixing only the first one found is exactly the
//! regression this catalog exists to prevent.

use crate::config::ConfigProbe;
use crate::engine::state::{InstallationState, Layout};
use crate::engine::target::TargetSpec;
use crate::{assets, template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be corrected for the install to function
    Blocking,
    /// Safe to leave unresolved
    Advisory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    MissingInstall,
    LegacyLayout,
    StaleScript,
    MissingConfig,
    MissingModelAssets,
    StaleModelAssets,
    MissingHookRegistration,
    CorruptConfig,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingInstall => "missing install",
            IssueKind::LegacyLayout => "legacy layout",
            IssueKind::StaleScript => "stale hook script",
            IssueKind::MissingConfig => "missing configuration",
            IssueKind::MissingModelAssets => "missing model assets",
            IssueKind::StaleModelAssets => "stale model assets",
            IssueKind::MissingHookRegistration => "missing hook registration",
            IssueKind::CorruptConfig => "corrupt configuration",
        }
    }
}

/// One diagnosed divergence. Derived, never stored; recomputed each run.
#[derive(Debug, Clone)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub detail: String,
    /// Human description of the corrective action. `None` means there is no
    /// safe automatic fix; the planner refuses it under non-interactive mode
    /// and leaves the decision to the operator otherwise.
    pub proposed_fix: Option<String>,
}

impl Issue {
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

/// Map a state snapshot to the ordered set of issues between it and the
/// target.
pub fn diagnose(state: &InstallationState, target: &TargetSpec) -> Vec<Issue> {
    // Rule 1: nothing installed. A from-scratch install needs no diffing.
    if !state.present() {
        return vec![Issue {
            kind: IssueKind::MissingInstall,
            severity: Severity::Blocking,
            detail: "no ccnotify installation found".to_string(),
            proposed_fix: Some(
                "install the hook script, configuration, and hook registration".to_string(),
            ),
        }];
    }

    let mut issues = Vec::new();

    // Rule 2: legacy directory convention, either as the whole install or as
    // a remnant next to a current one.
    if state.layout == Layout::Legacy || state.legacy_remnant {
        issues.push(Issue {
            kind: IssueKind::LegacyLayout,
            severity: Severity::Blocking,
            detail: "install uses the old hooks/ccnotify directory".to_string(),
            proposed_fix: Some(
                "migrate the tree to the current directory, then remove the old one".to_string(),
            ),
        });
    }

    // Rule 3: installed script older than the target, or of unknown version.
    match &state.script_version {
        Some(installed) if *installed < target.version => {
            issues.push(Issue {
                kind: IssueKind::StaleScript,
                severity: if target.force {
                    Severity::Blocking
                } else {
                    Severity::Advisory
                },
                detail: format!("installed script is {installed}, target is {}", target.version),
                proposed_fix: Some("regenerate the hook script".to_string()),
            });
        }
        None => {
            // Unknown version: conservatively ask the operator under
            // non-interactive mode (fix withheld), treat as older otherwise.
            issues.push(Issue {
                kind: IssueKind::StaleScript,
                severity: Severity::Blocking,
                detail: format!(
                    "installed script carries no readable '{}' marker",
                    template::VERSION_MARKER
                ),
                proposed_fix: target
                    .force
                    .then(|| "regenerate the hook script".to_string()),
            });
        }
        Some(_) => {}
    }

    // Rule 4: model assets, relevant for the local provider only.
    if target.wants_local_assets() {
        if !state.assets.all_present {
            issues.push(Issue {
                kind: IssueKind::MissingModelAssets,
                severity: Severity::Blocking,
                detail: format!("missing model files: {}", state.assets.missing.join(", ")),
                proposed_fix: target
                    .fetch_assets
                    .then(|| "download the Kokoro model assets".to_string()),
            });
        } else {
            let stale = state
                .assets
                .version
                .as_ref()
                .is_none_or(|installed| *installed < assets::target_assets_version());
            if stale {
                issues.push(Issue {
                    kind: IssueKind::StaleModelAssets,
                    severity: Severity::Blocking,
                    detail: format!(
                        "installed asset bundle is {}, target is {}",
                        state
                            .assets
                            .version
                            .as_ref()
                            .map_or_else(|| "unversioned".to_string(), ToString::to_string),
                        assets::target_assets_version()
                    ),
                    proposed_fix: Some("re-download the Kokoro model assets".to_string()),
                });
            }
        }
    }

    // Rule 5: configuration artifact.
    match &state.config {
        ConfigProbe::Missing => issues.push(Issue {
            kind: IssueKind::MissingConfig,
            severity: Severity::Blocking,
            detail: "no config.json found".to_string(),
            proposed_fix: target
                .provider
                .map(|provider| format!("write a default configuration for provider '{provider}'")),
        }),
        ConfigProbe::Corrupt(reason) => issues.push(Issue {
            kind: IssueKind::CorruptConfig,
            severity: Severity::Blocking,
            detail: format!("config.json fails validation: {reason}"),
            proposed_fix: target
                .provider
                .map(|provider| format!("rewrite the configuration for provider '{provider}'")),
        }),
        ConfigProbe::Present(configured) => {
            if let Some(requested) = target.provider {
                if requested != *configured {
                    issues.push(Issue {
                        kind: IssueKind::MissingConfig,
                        severity: Severity::Blocking,
                        detail: format!(
                            "configured provider is '{configured}', requested '{requested}'"
                        ),
                        proposed_fix: Some(format!(
                            "switch the configuration to provider '{requested}', keeping other fields"
                        )),
                    });
                }
            }
        }
    }

    // Rule 6: hook registration per event type.
    if target.register_hooks {
        let missing: Vec<&'static str> = target
            .events
            .iter()
            .filter(|event| !state.registered_events.contains(event))
            .map(|event| event.as_str())
            .collect();

        if !missing.is_empty() {
            issues.push(Issue {
                kind: IssueKind::MissingHookRegistration,
                severity: Severity::Blocking,
                detail: format!("unregistered events: {}", missing.join(", ")),
                proposed_fix: Some("merge hook entries into settings.json".to_string()),
            });
        }
    }

    issues
}
