//! ccnotify - audio notification hooks for Claude Code
//!
//! Installs, updates, and repairs the notification hook for Claude Code.
//! Every invocation probes the existing install, diagnoses what diverges
//! from the requested target, plans the minimal corrective actions, and
//! applies them with pre-capture backups and rollback on failure.

use clap::Parser;

mod assets;
mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod fsops;
mod hooks;
mod paths;
mod progress;
mod template;
mod ui;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.profile, cli.verbose, args),
        Commands::Setup(args) => commands::setup::run(cli.profile, args),
        Commands::Config(args) => commands::config::run(cli.profile, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
