//! End-to-end install flows driven through the real binary

mod common;

use common::TestProfile;
use predicates::prelude::*;

#[test]
fn test_fresh_cloud_install_creates_all_artifacts() {
    let profile = TestProfile::new();

    profile
        .cmd()
        .args(["install", "--provider", "elevenlabs", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing install"));

    // hook script with a readable version marker
    assert!(profile.file_exists("ccnotify/ccnotify.py"));
    let script = profile.read_file("ccnotify/ccnotify.py");
    assert!(script.contains(&format!("# ccnotify-version: {}", env!("CARGO_PKG_VERSION"))));

    // configuration for the chosen provider
    let config = profile.read_json("ccnotify/config.json");
    assert_eq!(config["tts"]["provider"], "elevenlabs");
    assert_eq!(config["tts"]["enabled"], true);

    // hook entries for all five events
    let settings = profile.read_json("settings.json");
    assert_eq!(settings["hooksEnabled"], true);
    for event in ["PreToolUse", "PostToolUse", "Stop", "SubagentStop", "Notification"] {
        let entries = settings["hooks"][event].as_array().expect("entries");
        assert_eq!(entries.len(), 1, "one entry for {event}");
    }

    // cloud provider: no model downloads, no models directory
    assert!(!profile.file_exists("ccnotify/models"));
}

#[test]
fn test_second_install_is_a_noop() {
    let profile = TestProfile::new();

    profile
        .cmd()
        .args(["install", "--provider", "elevenlabs", "--non-interactive"])
        .assert()
        .success();

    let config_before = profile.read_file("ccnotify/config.json");
    let settings_before = profile.read_file("settings.json");

    profile
        .cmd()
        .args(["install", "--provider", "elevenlabs", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));

    // no side effects on the second run
    assert_eq!(profile.read_file("ccnotify/config.json"), config_before);
    assert_eq!(profile.read_file("settings.json"), settings_before);
}

#[test]
fn test_non_interactive_without_provider_is_a_planning_error() {
    let profile = TestProfile::new();

    profile
        .cmd()
        .args(["install", "--non-interactive"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("provider"));

    // planning errors leave no side effects
    assert!(!profile.file_exists("ccnotify"));
    assert!(!profile.file_exists("settings.json"));
}

#[test]
fn test_missing_profile_directory_is_an_error_unless_forced() {
    let temp = tempfile::TempDir::new().unwrap();
    let missing = temp.path().join("never-ran-claude");

    let mut cmd = assert_cmd::Command::cargo_bin("ccnotify").unwrap();
    cmd.arg("--profile")
        .arg(&missing)
        .args(["install", "--provider", "none", "--non-interactive"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("profile directory not found"));

    let mut cmd = assert_cmd::Command::cargo_bin("ccnotify").unwrap();
    cmd.arg("--profile")
        .arg(&missing)
        .args(["install", "--provider", "none", "--non-interactive", "--force"])
        .assert()
        .success();
    assert!(missing.join("ccnotify/ccnotify.py").is_file());
}

#[test]
fn test_install_preserves_unrelated_settings_entries() {
    let profile = TestProfile::new();
    profile.write_file(
        "settings.json",
        r#"{
  "model": "opus",
  "permissions": {"allow": ["Bash(ls:*)"]},
  "hooks": {
    "PreToolUse": [
      {"matcher": "Bash", "hooks": [{"type": "command", "command": "audit.sh"}]}
    ]
  }
}"#,
    );

    profile
        .cmd()
        .args(["install", "--provider", "none", "--non-interactive"])
        .assert()
        .success();

    let settings = profile.read_json("settings.json");
    assert_eq!(settings["model"], "opus");
    assert_eq!(settings["permissions"]["allow"][0], "Bash(ls:*)");
    let pre_tool = settings["hooks"]["PreToolUse"].as_array().unwrap();
    assert_eq!(pre_tool.len(), 2);
    assert_eq!(pre_tool[0]["hooks"][0]["command"], "audit.sh");
}

#[test]
fn test_provider_switch_preserves_custom_config_fields() {
    let profile = TestProfile::new();

    profile
        .cmd()
        .args(["install", "--provider", "none", "--non-interactive"])
        .assert()
        .success();

    // the user customizes their config between runs
    let mut config = profile.read_json("ccnotify/config.json");
    config["notifications"]["sound_enabled"] = serde_json::Value::Bool(false);
    config["custom_announcements"] = serde_json::json!({"build_done": "all green"});
    profile.write_file(
        "ccnotify/config.json",
        &serde_json::to_string_pretty(&config).unwrap(),
    );

    profile
        .cmd()
        .args(["install", "--provider", "elevenlabs", "--non-interactive"])
        .assert()
        .success();

    let updated = profile.read_json("ccnotify/config.json");
    assert_eq!(updated["tts"]["provider"], "elevenlabs");
    // user-set fields survive the provider switch verbatim
    assert_eq!(updated["notifications"]["sound_enabled"], false);
    assert_eq!(updated["custom_announcements"]["build_done"], "all green");
}

#[test]
fn test_legacy_layout_is_migrated() {
    let profile = TestProfile::new();
    profile.write_file(
        "hooks/ccnotify/ccnotify.py",
        "#!/usr/bin/env python3\n# ccnotify-version: 0.1.11\nprint('legacy')\n",
    );
    profile.write_file(
        "hooks/ccnotify/config.json",
        r#"{"tts": {"provider": "none", "enabled": false}, "user_note": "keep"}"#,
    );

    profile
        .cmd()
        .args(["install", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy layout"));

    // old tree is gone, artifacts live under the current layout
    assert!(!profile.file_exists("hooks/ccnotify"));
    assert!(profile.file_exists("ccnotify/ccnotify.py"));

    // the migrated config rides along unchanged, user fields intact
    let config = profile.read_json("ccnotify/config.json");
    assert_eq!(config["tts"]["provider"], "none");
    assert_eq!(config["user_note"], "keep");

    // the script was regenerated at the current version
    let script = profile.read_file("ccnotify/ccnotify.py");
    assert!(script.contains(&format!("# ccnotify-version: {}", env!("CARGO_PKG_VERSION"))));

    // hook entries point at the current location
    let settings = profile.read_json("settings.json");
    let stop = settings["hooks"]["Stop"].as_array().unwrap();
    assert!(
        stop[0]["hooks"][0]["command"]
            .as_str()
            .unwrap()
            .contains("/ccnotify/ccnotify.py")
    );
}

#[test]
fn test_corrupt_config_is_rewritten() {
    let profile = TestProfile::new();
    profile.write_file("ccnotify/ccnotify.py", "#!/usr/bin/env python3\n");
    profile.write_file("ccnotify/config.json", "{ this is not json");

    profile
        .cmd()
        .args([
            "install",
            "--provider",
            "none",
            "--non-interactive",
            "--force",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("corrupt configuration"));

    let config = profile.read_json("ccnotify/config.json");
    assert_eq!(config["tts"]["provider"], "none");
}

#[test]
fn test_unreadable_script_version_requires_operator_or_force() {
    let profile = TestProfile::new();
    // an install whose script carries no version marker
    profile.write_file("ccnotify/ccnotify.py", "#!/usr/bin/env python3\n");
    profile.write_file(
        "ccnotify/config.json",
        r#"{"tts": {"provider": "none", "enabled": false}}"#,
    );

    profile
        .cmd()
        .args(["install", "--non-interactive"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("marker"));

    // --force resolves the ambiguity in favor of regenerating
    profile
        .cmd()
        .args(["install", "--non-interactive", "--force"])
        .assert()
        .success();

    let script = profile.read_file("ccnotify/ccnotify.py");
    assert!(script.contains("# ccnotify-version:"));
}
