//! Version command implementation

use crate::assets;
use crate::error::Result;

/// Run version command
pub fn run() -> Result<()> {
    println!("ccnotify {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Minimum Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!("  Profile: {}", build_profile());
    println!("  Asset bundle: {}", assets::ASSETS_VERSION);

    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
