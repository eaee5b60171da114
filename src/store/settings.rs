use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::BlobStore;
use crate::catalog::PassageFormat;
use crate::error::StoreResult;

pub const SETTINGS_KEY: &str = "settings";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub font_family: String,
    pub font_size: u16,
    pub show_wpm: bool,
    pub show_accuracy: bool,
    pub highlight_errors: bool,
    pub sound_effects: bool,
    pub preferred_format: PassageFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            font_family: "monospace".to_string(),
            font_size: 16,
            show_wpm: true,
            show_accuracy: true,
            highlight_errors: true,
            sound_effects: true,
            preferred_format: PassageFormat::CompleteEssay,
        }
    }
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub font_family: Option<String>,
    pub font_size: Option<u16>,
    pub show_wpm: Option<bool>,
    pub show_accuracy: Option<bool>,
    pub highlight_errors: Option<bool>,
    pub sound_effects: Option<bool>,
    pub preferred_format: Option<PassageFormat>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.font_family {
            self.font_family = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
        if let Some(v) = patch.show_wpm {
            self.show_wpm = v;
        }
        if let Some(v) = patch.show_accuracy {
            self.show_accuracy = v;
        }
        if let Some(v) = patch.highlight_errors {
            self.highlight_errors = v;
        }
        if let Some(v) = patch.sound_effects {
            self.sound_effects = v;
        }
        if let Some(v) = patch.preferred_format {
            self.preferred_format = v;
        }
    }
}

pub trait SettingsStore {
    fn get(&self) -> Settings;
    /// Merge `patch` into the stored settings and return the result
    fn set(&mut self, patch: SettingsPatch) -> StoreResult<Settings>;
    fn reset(&mut self) -> StoreResult<Settings>;
}

#[derive(Debug, Clone)]
pub struct BlobSettingsStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> BlobSettingsStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    fn save(&mut self, settings: &Settings) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(settings)?;
        self.blobs.write(SETTINGS_KEY, &json)
    }
}

impl<B: BlobStore> SettingsStore for BlobSettingsStore<B> {
    fn get(&self) -> Settings {
        if let Some(json) = self.blobs.read(SETTINGS_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => return settings,
                Err(e) => warn!(error = %e, "stored settings are unreadable, using defaults"),
            }
        }
        Settings::default()
    }

    fn set(&mut self, patch: SettingsPatch) -> StoreResult<Settings> {
        let mut settings = self.get();
        settings.apply(patch);
        self.save(&settings)?;
        Ok(settings)
    }

    fn reset(&mut self) -> StoreResult<Settings> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}
