//! Persisted client-local settings.
//!
//! One small JSON file holding the last-used persona id, read at
//! session start and rewritten on every persona switch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Persona id to resolve first on the next session start.
    #[serde(rename = "lastPersona", default, skip_serializing_if = "Option::is_none")]
    pub last_persona: Option<String>,
}

/// Default state directory: `OPSDECK_STATE_DIR` > `XDG_STATE_HOME` >
/// `$HOME/.local/state/opsdeck`.
pub fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("OPSDECK_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("XDG_STATE_HOME") {
        return Path::new(&dir).join("opsdeck");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".local/state/opsdeck")
}

/// Reads and writes the settings file at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the default state directory.
    pub fn at_default_location() -> Self {
        Self::new(default_state_dir().join("settings.json"))
    }

    /// Load settings; a missing file yields the defaults.
    pub fn load(&self) -> Result<ClientSettings, SettingsError> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ClientSettings::default());
            }
            Err(e) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        Ok(serde_json::from_str(&body)?)
    }

    pub fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, body).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist the last-used persona id, preserving other fields.
    pub fn set_last_persona(&self, persona_id: &str) -> Result<(), SettingsError> {
        let mut settings = self.load()?;
        settings.last_persona = Some(persona_id.to_owned());
        self.save(&settings)
    }
}

// ─── Tests ───────────────────────────────────────────────────────
