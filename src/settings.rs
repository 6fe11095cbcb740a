//! Game settings and preferences
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Audio preferences and note-scheduler tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Try to open an output channel at all
    pub enabled: bool,
    /// Mute all notes (scheduler calls become no-ops)
    pub muted: bool,
    /// Master volume (0.0 - 1.0), scales note velocity
    pub master_volume: f32,

    // === Scheduler ===
    /// Maximum simultaneously in-flight note executions
    pub max_active_notes: usize,
    /// Velocity of every 8th melody note and of effect notes
    pub velocity_loud: u8,
    /// Velocity of the remaining melody notes
    pub velocity_soft: u8,
    /// Duration of even-cursor melody notes
    pub long_note_ms: u64,
    /// Duration of odd-cursor melody notes
    pub short_note_ms: u64,
    /// Duration of each game-over note
    pub sequence_note_ms: u64,
    /// Spacing between game-over notes
    pub sequence_spacing_ms: u64,
    /// Duration of the power-up note
    pub power_up_note_ms: u64,
    /// How long a reset waits for the worker before abandoning it
    pub reset_grace_ms: u64,
    /// How long shutdown lets queued notes play out
    pub shutdown_grace_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            muted: false,
            master_volume: 1.0,

            max_active_notes: 6,
            velocity_loud: 127,
            velocity_soft: 90,
            long_note_ms: 500,
            short_note_ms: 250,
            sequence_note_ms: 300,
            sequence_spacing_ms: 200,
            power_up_note_ms: 500,
            reset_grace_ms: 1000,
            shutdown_grace_ms: 2000,
        }
    }
}

impl AudioSettings {
    /// Whether notes would be audible at all
    pub fn audible(&self) -> bool {
        self.enabled && !self.muted && self.master_volume > 0.0
    }

    /// Scale a MIDI velocity by the master volume
    pub fn scale_velocity(&self, velocity: u8) -> u8 {
        (velocity as f32 * self.master_volume.clamp(0.0, 1.0)).round() as u8
    }

    pub fn reset_grace(&self) -> Duration {
        Duration::from_millis(self.reset_grace_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub screen_width: i32,
    pub screen_height: i32,
    /// Fixed tick period in milliseconds
    pub tick_ms: u64,

    // === Paddles ===
    /// Number of paddle rows (constant for the whole session)
    pub paddle_rows: usize,
    /// Vertical distance between paddle rows
    pub paddle_spacing: i32,
    /// Pixels per tick the paddles scroll down
    pub paddle_scroll_speed: i32,

    // === Player ===
    /// Length of the power-up speed boost
    pub boost_ms: u64,
    /// Hover time after spawning before gravity applies
    pub spawn_hover_ms: u64,

    // === Power-ups ===
    /// Pixels per tick a power-up falls
    pub power_up_fall_speed: i32,
    /// Chance of a power-up already falling when a session starts
    pub opening_power_up_chance: f64,

    // === Run ===
    /// Fixed RNG seed (random per run when absent)
    pub seed: Option<u64>,

    pub audio: AudioSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            tick_ms: 10,

            paddle_rows: 7,
            paddle_spacing: 100,
            paddle_scroll_speed: 1,

            boost_ms: 5000,
            spawn_hover_ms: 1500,

            power_up_fall_speed: 2,
            opening_power_up_chance: 0.25,

            seed: None,

            audio: AudioSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Settings>(json).map(Settings::validated)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Using default settings ({}: {})", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Clamp values that would break the simulation
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.screen_width <= 0 {
            self.screen_width = defaults.screen_width;
        }
        if self.screen_height <= 0 {
            self.screen_height = defaults.screen_height;
        }
        if self.tick_ms == 0 {
            self.tick_ms = defaults.tick_ms;
        }
        if self.paddle_rows == 0 {
            self.paddle_rows = defaults.paddle_rows;
        }
        if self.paddle_spacing <= 0 {
            self.paddle_spacing = defaults.paddle_spacing;
        }
        self.paddle_scroll_speed = self.paddle_scroll_speed.max(0);
        self.power_up_fall_speed = self.power_up_fall_speed.max(1);
        self.opening_power_up_chance = if self.opening_power_up_chance.is_nan() {
            0.0
        } else {
            self.opening_power_up_chance.clamp(0.0, 1.0)
        };
        self.audio.master_volume = self.audio.master_volume.clamp(0.0, 1.0);
        self.audio.max_active_notes = self.audio.max_active_notes.max(1);
        self
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn boost_duration(&self) -> Duration {
        Duration::from_millis(self.boost_ms)
    }

    pub fn spawn_hover(&self) -> Duration {
        Duration::from_millis(self.spawn_hover_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "screen_width": 640, "audio": { "muted": true } }"#)
            .expect("valid json");
        assert_eq!(settings.screen_width, 640);
        assert_eq!(settings.screen_height, 600);
        assert!(settings.audio.muted);
        assert_eq!(settings.audio.max_active_notes, 6);
        assert_eq!(settings.audio.shutdown_grace(), Duration::from_secs(2));
    }

    #[test]
    fn test_validated_clamps() {
        let settings = Settings::from_json(
            r#"{ "paddle_rows": 0, "opening_power_up_chance": 3.0, "audio": { "master_volume": -1.0, "max_active_notes": 0 } }"#,
        )
        .expect("valid json");
        assert_eq!(settings.paddle_rows, 7);
        assert_eq!(settings.opening_power_up_chance, 1.0);
        assert_eq!(settings.audio.master_volume, 0.0);
        assert_eq!(settings.audio.max_active_notes, 1);
        assert!(!settings.audio.audible());
    }

    #[test]
    fn test_scale_velocity() {
        let mut audio = AudioSettings::default();
        assert_eq!(audio.scale_velocity(127), 127);
        audio.master_volume = 0.5;
        assert_eq!(audio.scale_velocity(90), 45);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load("/definitely/not/here/note-hopper.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("note-hopper-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.seed = Some(42);
        settings.save(&path).expect("writable temp dir");
        let loaded = Settings::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.seed, Some(42));
    }
}
