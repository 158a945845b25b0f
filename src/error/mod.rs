//! Error types and handling for ccnotify
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! The taxonomy mirrors the reconciliation pipeline: probe anomalies never
//! surface here (the probe degrades unreadable paths to "absent"), planning
//! problems are fatal before any side effect, and execution problems record
//! whether rollback restored everything.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for ccnotify operations
#[derive(Error, Diagnostic, Debug)]
pub enum CcnotifyError {
    // Planning errors: reported before any side effect
    #[error("Cannot plan installation: {reason}")]
    #[diagnostic(
        code(ccnotify::plan::needs_operator),
        help("Re-run interactively, or pass the missing choice explicitly (e.g. --provider)")
    )]
    PlanningFailed { reason: String },

    #[error("Claude profile directory not found: {path}")]
    #[diagnostic(
        code(ccnotify::probe::profile_not_found),
        help(
            "Make sure Claude Code is installed and has been run at least once, or pass --force to create the directory"
        )
    )]
    ProfileNotFound { path: String },

    // Execution errors: at least one action ran and failed
    #[error("Installation failed at '{action}': {reason}; all changes were rolled back")]
    #[diagnostic(
        code(ccnotify::execute::rolled_back),
        help("The previous state was restored. Fix the underlying problem and re-run")
    )]
    ExecutionRolledBack { action: String, reason: String },

    #[error("Installation failed at '{action}': {reason}; rollback could not restore every artifact")]
    #[diagnostic(
        code(ccnotify::execute::partial_rollback),
        help("Manual attention required: restore the artifacts listed above from the quarantine directory")
    )]
    ExecutionPartialRollback { action: String, reason: String },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(ccnotify::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(ccnotify::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(ccnotify::config::not_found),
        help("Run 'ccnotify config --init' or 'ccnotify install' to create one")
    )]
    ConfigNotFound { path: String },

    // Model asset errors
    #[error("Failed to download {name}: {reason}")]
    #[diagnostic(
        code(ccnotify::assets::download_failed),
        help("Check your network connection, then retry with 'ccnotify setup --kokoro'")
    )]
    DownloadFailed { name: String, reason: String },

    #[error("Downloaded {name} failed verification: {reason}")]
    #[diagnostic(code(ccnotify::assets::verification_failed))]
    AssetVerificationFailed { name: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(ccnotify::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(ccnotify::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(ccnotify::fs::io_error))]
    IoError { message: String },
}

impl CcnotifyError {
    /// Process exit code for this error.
    ///
    /// Planning problems, rolled-back failures, and partial rollbacks get
    /// distinct codes so callers can tell "needs operator input" from
    /// "restored" from "needs manual repair".
    pub fn exit_code(&self) -> i32 {
        match self {
            CcnotifyError::PlanningFailed { .. } | CcnotifyError::ProfileNotFound { .. } => 2,
            CcnotifyError::ExecutionRolledBack { .. } => 3,
            CcnotifyError::ExecutionPartialRollback { .. } => 4,
            _ => 1,
        }
    }
}

impl From<std::io::Error> for CcnotifyError {
    fn from(err: std::io::Error) -> Self {
        CcnotifyError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CcnotifyError {
    fn from(err: serde_json::Error) -> Self {
        CcnotifyError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for CcnotifyError {
    fn from(err: inquire::InquireError) -> Self {
        CcnotifyError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CcnotifyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_error_display() {
        let err = CcnotifyError::PlanningFailed {
            reason: "no TTS provider chosen".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot plan installation: no TTS provider chosen"
        );
    }

    #[test]
    fn test_error_code() {
        let err = CcnotifyError::PlanningFailed {
            reason: "x".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("ccnotify::plan::needs_operator".to_string())
        );
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let planning = CcnotifyError::PlanningFailed {
            reason: "x".to_string(),
        };
        let rolled_back = CcnotifyError::ExecutionRolledBack {
            action: "a".to_string(),
            reason: "r".to_string(),
        };
        let partial = CcnotifyError::ExecutionPartialRollback {
            action: "a".to_string(),
            reason: "r".to_string(),
        };
        let generic = CcnotifyError::IoError {
            message: "m".to_string(),
        };

        assert_eq!(planning.exit_code(), 2);
        assert_eq!(rolled_back.exit_code(), 3);
        assert_eq!(partial.exit_code(), 4);
        assert_eq!(generic.exit_code(), 1);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CcnotifyError = io_err.into();
        assert!(matches!(err, CcnotifyError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let err: CcnotifyError = parse_result.unwrap_err().into();
        assert!(matches!(err, CcnotifyError::ConfigParseFailed { .. }));
    }
}
