//! Game settings and preferences
//!
//! Persisted separately from the leaderboard under their own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_IMMUNITY_TICKS;
use crate::error::StorageError;
use crate::platform::Storage;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Chaos ===
    /// Chaos effects trigger during play
    pub chaos_enabled: bool,
    /// Grace period (ticks) after a level start or resume
    pub immunity_ticks: f32,
    /// Fixed RNG seed for reproducible chaos; random when unset
    pub seed: Option<u64>,

    // === Accessibility ===
    /// Reduced motion (halves shake amplitude and zoom excursion)
    pub reduced_motion: bool,
    /// Success/error/chaos flashes and shakes
    pub feedback_effects: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chaos_enabled: true,
            immunity_ticks: DEFAULT_IMMUNITY_TICKS,
            seed: None,

            reduced_motion: false,
            feedback_effects: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "eyesoff_settings";

    /// Multiplier on motion-heavy effects (respects reduced_motion)
    pub fn motion_scale(&self) -> f32 {
        if self.reduced_motion { 0.5 } else { 1.0 }
    }

    /// Immunity window, never negative
    pub fn effective_immunity(&self) -> f32 {
        self.immunity_ticks.max(0.0)
    }

    pub fn try_load(storage: &dyn Storage) -> Result<Option<Self>, StorageError> {
        match storage.get_item(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Load settings, defaults on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match Self::try_load(storage) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from storage");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::error!("Failed to load settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged only
    pub fn save(&self, storage: &dyn Storage) {
        let result = serde_json::to_string(self)
            .map_err(StorageError::from)
            .and_then(|json| storage.set_item(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Failed to save settings: {}", e),
        }
    }
}
