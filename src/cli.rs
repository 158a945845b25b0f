//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::target::Provider;

/// ccnotify - audio notification hooks for Claude Code
#[derive(Parser, Debug)]
#[command(
    name = "ccnotify",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Intelligent audio notification hooks for Claude Code",
    long_about = "ccnotify installs, updates, and repairs a notification hook for Claude Code: \
                  tool-usage events are announced as text-to-speech plus a desktop notification. \
                  Every command probes the existing install first and applies only the minimal \
                  set of corrective actions, with rollback on partial failure.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  ccnotify install\n    \
                  ccnotify install --provider kokoro --non-interactive\n    \
                  ccnotify setup --kokoro\n    \
                  ccnotify setup --voices\n    \
                  ccnotify config --show\n\n\
                  \x1b[1m\x1b[32mDocumentation:\x1b[0m\n    \
                  https://github.com/ccnotify/ccnotify"
)]
pub struct Cli {
    /// Claude profile directory (defaults to ~/.claude)
    #[arg(long, short = 'p', global = true, value_name = "DIR")]
    pub profile: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install or repair the notification hook
    Install(InstallArgs),

    /// Manage TTS model assets
    Setup(SetupArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Interactive install:\n    ccnotify install\n\n\
                  Unattended install with a local provider:\n    ccnotify install --provider kokoro --non-interactive\n\n\
                  Cloud provider, no model downloads:\n    ccnotify install --provider elevenlabs --yes\n\n\
                  Repair a broken install, overwriting what is there:\n    ccnotify install --force")]
pub struct InstallArgs {
    /// TTS provider to configure (prompted for interactively when omitted)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Overwrite existing artifacts even when their state cannot be verified
    #[arg(long)]
    pub force: bool,

    /// Skip all prompts; ambiguity becomes an error instead of a question
    #[arg(long)]
    pub non_interactive: bool,

    /// Apply the plan without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install Kokoro TTS models:\n    ccnotify setup --kokoro\n\n\
                  Re-download models:\n    ccnotify setup --kokoro --update\n\n\
                  List available voices:\n    ccnotify setup --voices\n\n\
                  Remove downloaded models:\n    ccnotify setup --cleanup")]
pub struct SetupArgs {
    /// Reconcile the Kokoro model assets
    #[arg(long)]
    pub kokoro: bool,

    /// Re-download assets even when they look intact
    #[arg(long)]
    pub update: bool,

    /// List available Kokoro voices
    #[arg(long)]
    pub voices: bool,

    /// Delete downloaded model files
    #[arg(long)]
    pub cleanup: bool,

    /// Apply without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show configuration paths and values:\n    ccnotify config --show\n\n\
                  Create a default configuration:\n    ccnotify config --init\n\n\
                  Reset to defaults, keeping the provider:\n    ccnotify config --reset -y")]
pub struct ConfigArgs {
    /// Show configuration paths and current values
    #[arg(long)]
    pub show: bool,

    /// Create a default configuration if none exists
    #[arg(long)]
    pub init: bool,

    /// Reset the configuration to defaults
    #[arg(long)]
    pub reset: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    ccnotify completions --shell bash > ~/.bash_completion.d/ccnotify\n\n\
                  Generate zsh completions:\n    ccnotify completions --shell zsh > ~/.zfunc/_ccnotify\n\n\
                  Generate fish completions:\n    ccnotify completions --shell fish > ~/.config/fish/completions/ccnotify.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
