//! The `config.json` artifact: schema, validation, and field-preserving merge
//!
//! Rewrites go through [`merged_document`], which fills in whatever the
//! target requires while leaving user-set fields untouched. The engine never
//! replaces the file wholesale when an existing document can be parsed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::target::Provider;
use crate::error::{CcnotifyError, Result};

/// Default ElevenLabs voice (Rachel)
pub const DEFAULT_ELEVENLABS_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default ElevenLabs model
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_flash_v2_5";

/// Default Kokoro voice
pub const DEFAULT_KOKORO_VOICE: &str = "af_sarah";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub tts: TtsSection,

    #[serde(default)]
    pub notifications: NotificationsSection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kokoro: Option<KokoroSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevenlabs: Option<ElevenlabsSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsSection {
    pub provider: Provider,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsSection {
    pub enabled: bool,
    pub sound_enabled: bool,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KokoroSection {
    pub voice: String,
    pub speed: f64,
    pub models_dir: String,
}

impl Default for KokoroSection {
    fn default() -> Self {
        Self {
            voice: DEFAULT_KOKORO_VOICE.to_string(),
            speed: 1.0,
            models_dir: "models".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevenlabsSection {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f64,
    pub similarity_boost: f64,
}

impl Default for ElevenlabsSection {
    fn default() -> Self {
        Self {
            api_key: "your_api_key_here".to_string(),
            voice_id: DEFAULT_ELEVENLABS_VOICE.to_string(),
            model_id: DEFAULT_ELEVENLABS_MODEL.to_string(),
            stability: 0.5,
            similarity_boost: 0.5,
        }
    }
}

/// Default document for a provider choice
pub fn default_config(provider: Provider) -> NotifyConfig {
    NotifyConfig {
        tts: TtsSection {
            provider,
            enabled: provider != Provider::None,
        },
        notifications: NotificationsSection::default(),
        logging: LoggingSection::default(),
        kokoro: provider.is_local().then(KokoroSection::default),
        elevenlabs: (provider == Provider::Elevenlabs).then(ElevenlabsSection::default),
    }
}

/// What the probe found at the config path
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigProbe {
    /// No file, or the path could not be read at all
    Missing,
    /// A file is there but does not pass schema validation
    Corrupt(String),
    /// Parsed and valid, with the configured provider
    Present(Provider),
}

/// Inspect a config file without failing.
///
/// Unreadable paths degrade to `Missing`; a readable file that is not valid
/// JSON, or that fails schema validation, is `Corrupt`.
pub fn probe_file(path: &Path) -> ConfigProbe {
    let Ok(content) = fs::read_to_string(path) else {
        return ConfigProbe::Missing;
    };

    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => return ConfigProbe::Corrupt(format!("not valid JSON: {err}")),
    };

    match validate(&value) {
        Ok(provider) => ConfigProbe::Present(provider),
        Err(reason) => ConfigProbe::Corrupt(reason),
    }
}

/// Schema validation over a parsed document.
///
/// Returns the configured provider, or a reason the document is invalid.
pub fn validate(value: &Value) -> std::result::Result<Provider, String> {
    let root = value
        .as_object()
        .ok_or_else(|| "root is not an object".to_string())?;

    let tts = root
        .get("tts")
        .and_then(Value::as_object)
        .ok_or_else(|| "missing 'tts' section".to_string())?;

    let provider = tts
        .get("provider")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing 'tts.provider'".to_string())?;

    Provider::from_name(provider)
        .ok_or_else(|| format!("unknown provider '{provider}' (expected kokoro, elevenlabs, or none)"))
}

/// Load and validate a config file, failing loudly.
///
/// The probe uses [`probe_file`]; this strict variant backs `config --show`.
pub fn load(path: &Path) -> Result<NotifyConfig> {
    let content = fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            CcnotifyError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            CcnotifyError::FileReadFailed {
                path: path.display().to_string(),
                reason: err.to_string(),
            }
        }
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|err| CcnotifyError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    validate(&value).map_err(|message| CcnotifyError::ConfigInvalid { message })?;

    serde_json::from_value(value).map_err(|err| CcnotifyError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

/// Build the document to write for a provider target.
///
/// Starts from the existing document when one parses, fills in every default
/// the schema requires but the user has not set, then forces the fields the
/// target dictates (`tts.provider`, `tts.enabled`). User-set fields,
/// including ones the schema knows nothing about, survive verbatim.
pub fn merged_document(existing: Option<&Value>, provider: Provider) -> Value {
    let desired = serde_json::to_value(default_config(provider)).unwrap_or_else(|_| Value::Null);

    let mut result = match existing {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    };

    fill_missing(&mut result, &desired);

    if let Some(tts) = result
        .as_object_mut()
        .and_then(|root| root.get_mut("tts"))
        .and_then(Value::as_object_mut)
    {
        tts.insert("provider".to_string(), Value::from(provider.as_str()));
        tts.insert("enabled".to_string(), Value::from(provider != Provider::None));
    }

    result
}

/// Recursively insert keys present in `defaults` but absent in `target`.
/// Existing values are never replaced.
fn fill_missing(target: &mut Value, defaults: &Value) {
    if let (Value::Object(target_obj), Value::Object(default_obj)) = (target, defaults) {
        for (key, default_value) in default_obj {
            match target_obj.get_mut(key) {
                Some(existing) => fill_missing(existing, default_value),
                None => {
                    target_obj.insert(key.clone(), default_value.clone());
                }
            }
        }
    }
}

/// Serialize a document to a config path.
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(document).map_err(|err| CcnotifyError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    fs::write(path, rendered + "\n").map_err(|err| CcnotifyError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_kokoro() {
        let config = default_config(Provider::Kokoro);
        assert_eq!(config.tts.provider, Provider::Kokoro);
        assert!(config.tts.enabled);
        assert_eq!(config.kokoro.unwrap().voice, DEFAULT_KOKORO_VOICE);
        assert!(config.elevenlabs.is_none());
    }

    #[test]
    fn test_default_config_none_disables_tts() {
        let config = default_config(Provider::None);
        assert!(!config.tts.enabled);
        assert!(config.kokoro.is_none());
        assert!(config.elevenlabs.is_none());
    }

    #[test]
    fn test_probe_file_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            probe_file(&temp.path().join("config.json")),
            ConfigProbe::Missing
        );
    }

    #[test]
    fn test_probe_file_corrupt_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(probe_file(&path), ConfigProbe::Corrupt(_)));
    }

    #[test]
    fn test_probe_file_unknown_provider_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"tts": {"provider": "espeak", "enabled": true}}"#).unwrap();

        assert!(matches!(probe_file(&path), ConfigProbe::Corrupt(_)));
    }

    #[test]
    fn test_probe_file_valid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        let document = merged_document(None, Provider::Elevenlabs);
        write_document(&path, &document).unwrap();

        assert_eq!(probe_file(&path), ConfigProbe::Present(Provider::Elevenlabs));
    }

    #[test]
    fn test_merged_document_preserves_user_fields() {
        let existing = json!({
            "tts": {"provider": "kokoro", "enabled": true},
            "kokoro": {"voice": "am_adam", "speed": 1.5, "models_dir": "models"},
            "custom_announcements": {"build_done": "all green"}
        });

        let merged = merged_document(Some(&existing), Provider::Kokoro);

        // user choices survive
        assert_eq!(merged["kokoro"]["voice"], "am_adam");
        assert_eq!(merged["kokoro"]["speed"], 1.5);
        assert_eq!(
            merged["custom_announcements"]["build_done"],
            "all green"
        );
        // missing sections are filled in
        assert_eq!(merged["notifications"]["enabled"], true);
        assert_eq!(merged["logging"]["enabled"], false);
    }

    #[test]
    fn test_merged_document_forces_provider() {
        let existing = json!({
            "tts": {"provider": "none", "enabled": false},
            "notifications": {"enabled": false, "sound_enabled": false}
        });

        let merged = merged_document(Some(&existing), Provider::Elevenlabs);

        assert_eq!(merged["tts"]["provider"], "elevenlabs");
        assert_eq!(merged["tts"]["enabled"], true);
        // unrelated user choice preserved
        assert_eq!(merged["notifications"]["enabled"], false);
        // provider section added with defaults
        assert_eq!(merged["elevenlabs"]["voice_id"], DEFAULT_ELEVENLABS_VOICE);
    }

    #[test]
    fn test_merged_document_from_scratch_is_valid() {
        let merged = merged_document(None, Provider::Kokoro);
        assert_eq!(validate(&merged), Ok(Provider::Kokoro));
    }

    #[test]
    fn test_load_strict_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        assert!(matches!(
            load(&path),
            Err(CcnotifyError::ConfigNotFound { .. })
        ));

        fs::write(&path, "nope").unwrap();
        assert!(matches!(
            load(&path),
            Err(CcnotifyError::ConfigParseFailed { .. })
        ));

        fs::write(&path, "{}").unwrap();
        assert!(matches!(
            load(&path),
            Err(CcnotifyError::ConfigInvalid { .. })
        ));
    }
}
