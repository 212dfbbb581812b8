//! Game settings and preferences
//!
//! Stored as JSON next to the binary or passed on the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_SUBSTEPS, STARTING_GOLD, STARTING_TICKETS};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fast-forward presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    #[default]
    Normal,
    Fast,
    Turbo,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Normal => "Normal",
            SpeedPreset::Fast => "Fast",
            SpeedPreset::Turbo => "Turbo",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" | "1x" => Some(SpeedPreset::Normal),
            "fast" | "2x" => Some(SpeedPreset::Fast),
            "turbo" | "4x" => Some(SpeedPreset::Turbo),
            _ => None,
        }
    }

    /// Multiplier applied to simulation time
    pub fn multiplier(&self) -> f32 {
        match self {
            SpeedPreset::Normal => 1.0,
            SpeedPreset::Fast => 2.0,
            SpeedPreset::Turbo => 4.0,
        }
    }

    /// Next preset in the 1x -> 2x -> 4x cycle
    pub fn cycle(&self) -> Self {
        match self {
            SpeedPreset::Normal => SpeedPreset::Fast,
            SpeedPreset::Fast => SpeedPreset::Turbo,
            SpeedPreset::Turbo => SpeedPreset::Normal,
        }
    }
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for the run
    pub seed: u64,
    /// Initial fast-forward preset
    pub speed: SpeedPreset,
    /// Start simulating immediately instead of waiting for a play intent
    pub auto_start: bool,
    /// Maximum fixed steps per frame
    pub max_substeps: u32,

    // === Economy ===
    pub starting_gold: u64,
    pub starting_tickets: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5107_defe,
            speed: SpeedPreset::Normal,
            auto_start: true,
            max_substeps: MAX_SUBSTEPS,
            starting_gold: STARTING_GOLD,
            starting_tickets: STARTING_TICKETS,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_presets() {
        assert_eq!(SpeedPreset::from_str("TURBO"), Some(SpeedPreset::Turbo));
        assert_eq!(SpeedPreset::from_str("2x"), Some(SpeedPreset::Fast));
        assert_eq!(SpeedPreset::from_str("warp"), None);
        assert_eq!(SpeedPreset::Normal.cycle().cycle().multiplier(), 4.0);
        assert_eq!(SpeedPreset::Turbo.cycle(), SpeedPreset::Normal);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 42, "speed": "Fast" }"#).unwrap();
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.speed, SpeedPreset::Fast);
        assert_eq!(settings.starting_gold, STARTING_GOLD);
        assert!(settings.auto_start);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Settings::from_json("{ seed: }"), Err(SettingsError::Parse(_))));
        assert!(matches!(
            Settings::load("/definitely/not/here.json"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let settings = Settings {
            seed: 7,
            speed: SpeedPreset::Turbo,
            ..Default::default()
        };
        let parsed = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.speed, SpeedPreset::Turbo);
    }
}
