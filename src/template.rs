//! Embedded hook script payload
//!
//! The installed artifact is a self-contained notifier script generated from
//! this template. The engine treats its content as opaque bytes; only the
//! version marker line matters for reconciliation.

use semver::Version;

/// Marker line prefix parsed back out by the state probe
pub const VERSION_MARKER: &str = "# ccnotify-version:";

/// Leading lines scanned for the version marker
const MARKER_SCAN_LINES: usize = 20;

/// Render the hook script payload for the given package version.
pub fn hook_script(version: &Version) -> String {
    format!(
        r#"#!/usr/bin/env python3
{VERSION_MARKER} {version}
# /// script
# requires-python = ">=3.9"
# dependencies = [
#     "pync",
#     "requests",
#     "kokoro-onnx",
#     "pydub",
#     "soundfile",
#     "tqdm",
# ]
# ///

"""Notification handler for Claude Code, generated by the ccnotify installer.

Reads a hook event from stdin, decides whether it is worth announcing, and
renders the announcement as text-to-speech plus a desktop notification.
Regenerate with `ccnotify install`; do not edit in place.
"""

import json
import sys
from pathlib import Path

CONFIG_FILE = Path.home() / ".claude" / "ccnotify" / "config.json"


def load_config():
    if CONFIG_FILE.exists():
        try:
            with open(CONFIG_FILE) as f:
                return json.load(f)
        except Exception:
            pass
    return {{
        "tts": {{"provider": "none", "enabled": False}},
        "notifications": {{"enabled": True, "sound_enabled": False}},
    }}


def read_event():
    try:
        return json.load(sys.stdin)
    except Exception:
        return {{}}


def announce(config, message):
    if not config.get("notifications", {{}}).get("enabled", True):
        return
    try:
        if sys.platform == "darwin":
            import pync

            pync.notify(message, title="Claude Code")
        else:
            print(f"Notification: {{message}}", file=sys.stderr)
    except ImportError:
        print(f"Notification: {{message}}", file=sys.stderr)


def main():
    config = load_config()
    event = read_event()
    name = event.get("hook_event_name", "Notification")
    message = event.get("message") or f"Claude Code: {{name}}"
    announce(config, message)


if __name__ == "__main__":
    main()
"#
    )
}

/// Parse the version marker out of an installed script.
///
/// Returns `None` for a missing or unparsable marker; the probe maps that to
/// "version unknown" rather than an error.
pub fn extract_version(content: &str) -> Option<Version> {
    content
        .lines()
        .take(MARKER_SCAN_LINES)
        .find_map(|line| line.strip_prefix(VERSION_MARKER))
        .and_then(|rest| Version::parse(rest.trim()).ok())
}
