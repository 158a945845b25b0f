//! Common test utilities for ccnotify integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway Claude profile directory driven through the real binary
pub struct TestProfile {
    /// Temporary directory holding the profile
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the profile root (the `~/.claude` stand-in)
    pub path: PathBuf,
}

impl TestProfile {
    /// Create an empty profile directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("claude-profile");
        std::fs::create_dir_all(&path).expect("Failed to create profile directory");
        Self { temp, path }
    }

    /// A ccnotify command pointed at this profile
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ccnotify").expect("binary builds");
        cmd.arg("--profile").arg(&self.path);
        cmd
    }

    /// Write a file relative to the profile root
    #[allow(dead_code)]
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file relative to the profile root
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Whether a path exists relative to the profile root
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Parse a profile-relative JSON file
    #[allow(dead_code)]
    pub fn read_json(&self, path: &str) -> serde_json::Value {
        serde_json::from_str(&self.read_file(path)).expect("Failed to parse JSON")
    }
}
