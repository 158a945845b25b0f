//! Hook registration in the Claude Code settings artifact
//!
//! `settings.json` belongs to the host tool and may carry entries ccnotify
//! knows nothing about. Registration is always a merge into the existing
//! document; the only entries ever touched are the ones pointing at the
//! ccnotify hook script.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::engine::target::HookEvent;
use crate::paths::HOOK_SCRIPT_FILE;

/// Command line registered for the hook script
pub fn hook_command(script: &Path) -> String {
    format!("uv run {}", script.display())
}

/// Read the settings document. `None` covers a missing, unreadable, or
/// unparsable file; the probe maps all three to "nothing registered".
pub fn read_settings(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Events with an entry whose command points at the given script path.
pub fn registered_events(settings: &Value, script: &Path) -> BTreeSet<HookEvent> {
    let script_path = script.display().to_string();
    let Some(hooks) = settings.get("hooks").and_then(Value::as_object) else {
        return BTreeSet::new();
    };

    HookEvent::ALL
        .iter()
        .copied()
        .filter(|event| {
            hooks
                .get(event.as_str())
                .and_then(Value::as_array)
                .is_some_and(|entries| {
                    entries
                        .iter()
                        .any(|entry| entry_commands(entry).any(|cmd| cmd.ends_with(&script_path)))
                })
        })
        .collect()
}

/// Merge hook entries for the given events into the settings document.
///
/// Stale ccnotify entries (e.g. ones still pointing at the legacy script
/// location) are dropped per event before the current entry is appended, so
/// repeated installs converge to exactly one entry per event. Everything
/// else in the document is preserved.
pub fn register(settings: &mut Value, events: &[HookEvent], script: &Path) {
    if !settings.is_object() {
        *settings = Value::Object(Map::new());
    }

    let root = match settings.as_object_mut() {
        Some(root) => root,
        None => return,
    };

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()));
    if !hooks.is_object() {
        *hooks = Value::Object(Map::new());
    }

    let command = hook_command(script);
    if let Some(hooks) = hooks.as_object_mut() {
        for event in events {
            let entries = hooks
                .entry(event.as_str().to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entries.is_array() {
                *entries = Value::Array(Vec::new());
            }

            if let Some(entries) = entries.as_array_mut() {
                entries.retain(|entry| !is_ccnotify_entry(entry));
                entries.push(json!({
                    "matcher": ".*",
                    "hooks": [{"type": "command", "command": command}]
                }));
            }
        }
    }

    root.insert("hooksEnabled".to_string(), Value::Bool(true));
}

/// Merge hook entries into the settings file on disk.
///
/// A present-but-unparsable settings file is an error rather than a
/// rewrite; clobbering the host tool's own configuration is never safe.
pub fn register_into_file(
    path: &Path,
    events: &[HookEvent],
    script: &Path,
) -> std::result::Result<(), String> {
    let mut settings = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|err| format!("existing settings file is not valid JSON: {err}"))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Value::Object(Map::new()),
        Err(err) => return Err(format!("cannot read settings file: {err}")),
    };

    register(&mut settings, events, script);

    let rendered = serde_json::to_string_pretty(&settings)
        .map_err(|err| format!("cannot serialize settings: {err}"))?;
    fs::write(path, rendered + "\n").map_err(|err| format!("cannot write settings file: {err}"))
}

/// Whether an entry's command points at a ccnotify hook script (current or
/// legacy location).
fn is_ccnotify_entry(entry: &Value) -> bool {
    entry_commands(entry).any(|cmd| cmd.trim_end().ends_with(HOOK_SCRIPT_FILE))
}

fn entry_commands(entry: &Value) -> impl Iterator<Item = &str> {
    entry
        .get("hooks")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|hook| hook.get("command").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn script() -> std::path::PathBuf {
        std::path::PathBuf::from("/profile/.claude/ccnotify/ccnotify.py")
    }

    #[test]
    fn test_register_from_empty_document() {
        let mut settings = Value::Object(Map::new());
        register(&mut settings, &HookEvent::ALL, &script());

        assert_eq!(settings["hooksEnabled"], true);
        for event in HookEvent::ALL {
            let entries = settings["hooks"][event.as_str()].as_array().unwrap();
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0]["matcher"], ".*");
            assert_eq!(
                entries[0]["hooks"][0]["command"],
                "uv run /profile/.claude/ccnotify/ccnotify.py"
            );
        }
    }

    #[test]
    fn test_register_preserves_unrelated_entries() {
        let mut settings = json!({
            "model": "opus",
            "hooks": {
                "PreToolUse": [
                    {"matcher": "Bash", "hooks": [{"type": "command", "command": "audit.sh"}]}
                ]
            }
        });

        register(&mut settings, &HookEvent::ALL, &script());

        assert_eq!(settings["model"], "opus");
        let entries = settings["hooks"]["PreToolUse"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["hooks"][0]["command"], "audit.sh");
    }

    #[test]
    fn test_register_replaces_stale_ccnotify_entries() {
        let mut settings = json!({
            "hooks": {
                "Stop": [
                    {"matcher": ".*", "hooks": [{"type": "command",
                        "command": "uv run /profile/.claude/hooks/ccnotify/ccnotify.py"}]}
                ]
            }
        });

        register(&mut settings, &[HookEvent::Stop], &script());

        let entries = settings["hooks"]["Stop"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0]["hooks"][0]["command"],
            "uv run /profile/.claude/ccnotify/ccnotify.py"
        );
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut settings = Value::Object(Map::new());
        register(&mut settings, &HookEvent::ALL, &script());
        let once = settings.clone();
        register(&mut settings, &HookEvent::ALL, &script());

        assert_eq!(settings, once);
    }

    #[test]
    fn test_registered_events_roundtrip() {
        let mut settings = Value::Object(Map::new());
        register(&mut settings, &[HookEvent::Stop, HookEvent::Notification], &script());

        let registered = registered_events(&settings, &script());
        assert!(registered.contains(&HookEvent::Stop));
        assert!(registered.contains(&HookEvent::Notification));
        assert!(!registered.contains(&HookEvent::PreToolUse));
    }

    #[test]
    fn test_registered_events_ignores_foreign_commands() {
        let settings = json!({
            "hooks": {
                "Stop": [
                    {"matcher": ".*", "hooks": [{"type": "command", "command": "other.sh"}]}
                ]
            }
        });

        assert!(registered_events(&settings, &script()).is_empty());
    }

    #[test]
    fn test_register_into_file_creates_and_merges() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");

        register_into_file(&path, &HookEvent::ALL, &script()).unwrap();
        let settings = read_settings(&path).unwrap();
        assert_eq!(registered_events(&settings, &script()).len(), 5);
    }

    #[test]
    fn test_register_into_file_refuses_corrupt_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{ broken").unwrap();

        let result = register_into_file(&path, &HookEvent::ALL, &script());
        assert!(result.is_err());
        // the corrupt file is left untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
    }
}
