//! Kokoro model assets: catalog, integrity checks, and the download collaborator
//!
//! The engine never talks to the network itself; it hands a [`ModelAsset`]
//! and a destination to a [`ModelFetcher`] and treats the result as an
//! ordinary action outcome. Retry and verification live here, inside the
//! collaborator.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use semver::Version;
use sha2::{Digest, Sha256};

use crate::error::{CcnotifyError, Result};
use crate::paths::ASSETS_VERSION_FILE;
use crate::progress::DownloadProgress;

/// Version of the asset bundle this release installs
pub const ASSETS_VERSION: &str = "1.0.0";

/// Download attempts per asset before the action fails
const DOWNLOAD_ATTEMPTS: u32 = 3;

const DOWNLOAD_CHUNK: usize = 64 * 1024;

/// One downloadable model file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAsset {
    pub name: &'static str,
    pub url: &'static str,
    /// Expected size in bytes; the integrity check is a size match
    pub size: u64,
}

const CATALOG: [ModelAsset; 2] = [
    ModelAsset {
        name: "kokoro-v1.0.onnx",
        url: "https://github.com/thewh1teagle/kokoro-onnx/releases/download/model-files-v1.0/kokoro-v1.0.onnx",
        size: 325_532_387,
    },
    ModelAsset {
        name: "voices-v1.0.bin",
        url: "https://github.com/thewh1teagle/kokoro-onnx/releases/download/model-files-v1.0/voices-v1.0.bin",
        size: 28_214_398,
    },
];

/// Every model file the local provider needs
pub fn catalog() -> &'static [ModelAsset] {
    &CATALOG
}

/// Asset bundle version this binary targets
pub fn target_assets_version() -> Version {
    Version::parse(ASSETS_VERSION).unwrap_or_else(|_| Version::new(1, 0, 0))
}

/// What the probe found in a models directory
#[derive(Debug, Clone, Default)]
pub struct AssetState {
    /// Every catalog file present with the expected size
    pub all_present: bool,
    /// Catalog files absent or size-mismatched
    pub missing: Vec<&'static str>,
    /// Installed bundle version, if the marker file parses
    pub version: Option<Version>,
}

/// Inspect a models directory without failing; unreadable entries count as
/// absent.
pub fn probe_assets(models_dir: &Path) -> AssetState {
    let missing: Vec<&'static str> = CATALOG
        .iter()
        .filter(|asset| !is_intact(&models_dir.join(asset.name), asset))
        .map(|asset| asset.name)
        .collect();

    let version = fs::read_to_string(models_dir.join(ASSETS_VERSION_FILE))
        .ok()
        .and_then(|content| Version::parse(content.trim()).ok());

    AssetState {
        all_present: missing.is_empty(),
        missing,
        version,
    }
}

/// Whether a file on disk matches the catalog entry
pub fn is_intact(path: &Path, asset: &ModelAsset) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() == asset.size)
}

/// Catalog files currently present under a models directory
pub fn model_files(models_dir: &Path) -> Vec<PathBuf> {
    CATALOG
        .iter()
        .map(|asset| models_dir.join(asset.name))
        .filter(|path| path.is_file())
        .collect()
}

/// Blocking download capability handed to the executor
pub trait ModelFetcher {
    /// Fetch one asset to `dest`, replacing whatever is there.
    ///
    /// Owns retry and integrity verification; a returned `Ok` means the file
    /// at `dest` is complete and intact. Partial files are removed on
    /// failure.
    fn fetch(&self, asset: &ModelAsset, dest: &Path) -> Result<()>;
}

/// HTTP fetcher streaming to disk with a progress bar
pub struct HttpModelFetcher {
    attempts: u32,
}

impl HttpModelFetcher {
    pub fn new() -> Self {
        Self {
            attempts: DOWNLOAD_ATTEMPTS,
        }
    }

    fn try_fetch(&self, asset: &ModelAsset, dest: &Path) -> Result<String> {
        let mut response = reqwest::blocking::get(asset.url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| CcnotifyError::DownloadFailed {
                name: asset.name.to_string(),
                reason: err.to_string(),
            })?;

        let total = response.content_length().unwrap_or(asset.size);
        let progress = DownloadProgress::new(asset.name, total);

        let file = File::create(dest).map_err(|err| CcnotifyError::FileWriteFailed {
            path: dest.display().to_string(),
            reason: err.to_string(),
        })?;
        let mut writer = BufWriter::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; DOWNLOAD_CHUNK];
        let mut written: u64 = 0;

        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|err| {
                    progress.abandon();
                    CcnotifyError::DownloadFailed {
                        name: asset.name.to_string(),
                        reason: err.to_string(),
                    }
                })?;
            if read == 0 {
                break;
            }

            hasher.update(&buffer[..read]);
            writer
                .write_all(&buffer[..read])
                .map_err(|err| {
                    progress.abandon();
                    CcnotifyError::FileWriteFailed {
                        path: dest.display().to_string(),
                        reason: err.to_string(),
                    }
                })?;
            written += read as u64;
            progress.inc(read as u64);
        }

        writer.flush().map_err(|err| CcnotifyError::FileWriteFailed {
            path: dest.display().to_string(),
            reason: err.to_string(),
        })?;

        if written != asset.size {
            progress.abandon();
            return Err(CcnotifyError::AssetVerificationFailed {
                name: asset.name.to_string(),
                reason: format!("expected {} bytes, got {written}", asset.size),
            });
        }

        let digest = format!("{:x}", hasher.finalize());
        progress.finish_with_message(format!("sha256 {}", &digest[..12.min(digest.len())]));
        Ok(digest)
    }
}

impl Default for HttpModelFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFetcher for HttpModelFetcher {
    fn fetch(&self, asset: &ModelAsset, dest: &Path) -> Result<()> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.try_fetch(asset, dest) {
                Ok(_digest) => return Ok(()),
                Err(err) => {
                    let _ = fs::remove_file(dest);
                    if attempt < self.attempts {
                        eprintln!("  retrying {} ({attempt}/{})", asset.name, self.attempts);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CcnotifyError::DownloadFailed {
            name: asset.name.to_string(),
            reason: "no attempts made".to_string(),
        }))
    }
}

/// Kokoro voice catalog, grouped by language and register
pub fn voices() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        (
            "English (Female)",
            &[
                "af_alloy", "af_aoede", "af_bella", "af_heart", "af_jessica", "af_kore",
                "af_nicole", "af_nova", "af_river", "af_sarah", "af_sky",
            ],
        ),
        (
            "English (Male)",
            &[
                "am_adam", "am_echo", "am_eric", "am_fenrir", "am_liam", "am_michael", "am_onyx",
                "am_puck", "am_santa",
            ],
        ),
        (
            "British English (Female)",
            &["bf_alice", "bf_emma", "bf_isabella", "bf_lily"],
        ),
        (
            "British English (Male)",
            &["bm_daniel", "bm_fable", "bm_george", "bm_lewis"],
        ),
        ("French", &["ff_siwis"]),
        ("Italian", &["if_sara", "im_nicola"]),
        (
            "Japanese",
            &["jf_alpha", "jf_gongitsune", "jf_nezumi", "jf_tebukuro", "jm_kumo"],
        ),
        (
            "Chinese",
            &[
                "zf_xiaobei", "zf_xiaoni", "zf_xiaoxiao", "zf_xiaoyi", "zm_yunjian", "zm_yunxi",
                "zm_yunxia", "zm_yunyang",
            ],
        ),
    ]
}
