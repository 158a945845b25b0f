//! Progress bar display for model asset downloads

use indicatif::{ProgressBar, ProgressStyle};

/// Byte-level progress for one asset download
pub struct DownloadProgress {
    pb: ProgressBar,
}

impl DownloadProgress {
    /// Create a progress bar sized to the expected byte count
    pub fn new(name: &str, total_bytes: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("  {msg:<18} [{bar:32.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap()
            .progress_chars("#>-");

        let pb = ProgressBar::new(total_bytes);
        pb.set_style(style);
        pb.set_message(name.to_string());

        Self { pb }
    }

    /// Record bytes written
    pub fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }

    /// Finish, leaving a short note in place of the rate
    pub fn finish_with_message(&self, msg: String) {
        self.pb.finish_with_message(msg);
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}
