//! User settings, loaded once at startup and written on explicit save.
//!
//! Core components never read ambient state: the session and inference
//! client receive a [`Settings`] value, and persistence stays behind the
//! [`SettingsStore`] trait at the boundary.

use crate::error::Result;
use crate::inference::DEFAULT_EXPLAIN_PROMPT;
use std::path::PathBuf;

/// A selectable vision model: OpenRouter identifier plus display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelChoice {
    /// API model identifier
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
}

/// The fixed model list offered in settings.
pub const AI_MODELS: [ModelChoice; 5] = [
    ModelChoice {
        id: "google/gemini-3-flash-preview",
        name: "Gemini 3.0 Flash",
    },
    ModelChoice {
        id: "google/gemini-3-pro-preview",
        name: "Gemini 3.0 Pro",
    },
    ModelChoice {
        id: "google/gemini-2.5-flash",
        name: "Gemini 2.5 Flash",
    },
    ModelChoice {
        id: "google/gemini-2.5-pro",
        name: "Gemini 2.5 Pro",
    },
    ModelChoice {
        id: "google/gemini-2.0-flash-001",
        name: "Gemini 2.0 Flash",
    },
];

/// Default export file-name prefix.
pub const DEFAULT_FILE_NAME_PREFIX: &str = "【共有事項】";

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inference API key
    pub api_key: String,
    /// Chosen model identifier
    pub model: String,
    /// User-editable explain-all prompt
    pub explain_prompt: String,
    /// Export file-name prefix
    pub file_name_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: AI_MODELS[0].id.to_string(),
            explain_prompt: DEFAULT_EXPLAIN_PROMPT.to_string(),
            file_name_prefix: DEFAULT_FILE_NAME_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Flat key/value persistence for settings.
pub trait SettingsStore {
    /// Load settings; a missing store yields defaults.
    fn load(&self) -> Result<Settings>;

    /// Persist settings (explicit "save settings" action).
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// JSON-file-backed settings store.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Create a store at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_vec_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        log::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
