//! Desired end-state requested by the operator

use clap::ValueEnum;
use semver::Version;
use serde::{Deserialize, Serialize};

/// TTS provider choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Kokoro TTS; needs the model assets on disk
    Kokoro,
    /// ElevenLabs cloud TTS; needs an API key, no local models
    Elevenlabs,
    /// Visual notifications only
    None,
}

impl Provider {
    /// Whether this provider renders speech from local model assets
    pub fn is_local(&self) -> bool {
        matches!(self, Provider::Kokoro)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Kokoro => "kokoro",
            Provider::Elevenlabs => "elevenlabs",
            Provider::None => "none",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "kokoro" => Some(Provider::Kokoro),
            "elevenlabs" => Some(Provider::Elevenlabs),
            "none" => Some(Provider::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hook event types announced by the notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Stop,
    SubagentStop,
    Notification,
}

impl HookEvent {
    /// Every event the hook script handles, in registration order
    pub const ALL: [HookEvent; 5] = [
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::Stop,
        HookEvent::SubagentStop,
        HookEvent::Notification,
    ];

    /// Key used in the host settings file
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::Stop => "Stop",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::Notification => "Notification",
        }
    }
}

/// Desired end-state for one reconciliation run
#[derive(Debug, Clone)]
pub struct TargetSpec {
    /// Package version the installed hook script should carry
    pub version: Version,

    /// Chosen TTS provider; `None` means the choice is still unresolved
    pub provider: Option<Provider>,

    /// Whether missing model assets may be downloaded in this run
    pub fetch_assets: bool,

    /// Whether hook entries should be registered in the host settings
    pub register_hooks: bool,

    /// Event types to register
    pub events: Vec<HookEvent>,

    /// Overwrite/upgrade even where the current state would be kept
    pub force: bool,

    /// No prompts allowed; ambiguity becomes a planning error
    pub non_interactive: bool,
}

impl TargetSpec {
    /// Target derived from defaults and a provider choice.
    pub fn new(provider: Option<Provider>) -> Self {
        Self {
            version: current_version(),
            provider,
            fetch_assets: matches!(provider, Some(Provider::Kokoro)),
            register_hooks: true,
            events: HookEvent::ALL.to_vec(),
            force: false,
            non_interactive: false,
        }
    }

    /// Whether the target needs local model assets on disk
    pub fn wants_local_assets(&self) -> bool {
        matches!(self.provider, Some(provider) if provider.is_local())
    }
}

/// The version this binary installs.
pub fn current_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}
