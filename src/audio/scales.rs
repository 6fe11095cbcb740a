//! Note tables and melody shaping
//!
//! Five scale tiers share the 100-point breakpoints of the difficulty
//! tiers. Scores of 400 and above all use the last scale.

use std::time::Duration;

use crate::AudioSettings;
use crate::sim::tier_index;

const TIER_ONE: [u8; 50] = [
    64, 71, 73, 64, 71, 73, 64, 71, 73, 71, 69, 67, 71, 69, 67, 71, 64, //
    64, 71, 73, 64, 71, 73, 64, 71, 73, 71, 69, 67, 71, 69, 67, 71, 64, //
    64, 71, 73, 64, 71, 73, 64, 71, 73, 71, 69, 67, 71, 69, 67, 71,
];

const TIER_TWO: [u8; 20] = [
    46, 49, 51, 52, 54, 46, 49, 51, 52, 54, 46, 49, 51, 52, 54, 46, 49, 51, 52, 54,
];

const TIER_THREE: [u8; 20] = [
    42, 45, 47, 48, 50, 42, 45, 47, 48, 50, 42, 45, 47, 48, 50, 42, 45, 47, 48, 50,
];

const TIER_FOUR: [u8; 20] = [
    38, 41, 43, 44, 46, 38, 41, 43, 44, 46, 38, 41, 43, 44, 46, 38, 41, 43, 44, 46,
];

const TIER_FIVE: [u8; 20] = [
    34, 37, 39, 40, 42, 34, 37, 39, 40, 42, 34, 37, 39, 40, 42, 34, 37, 39, 40, 42,
];

const SCALES: [&[u8]; 5] = [&TIER_ONE, &TIER_TWO, &TIER_THREE, &TIER_FOUR, &TIER_FIVE];

/// Played when a power-up is collected
pub const POWER_UP_NOTE: u8 = 90;

/// Played one after another on game over
pub const GAME_OVER_NOTES: [u8; 5] = [45, 57, 41, 52, 36];

/// Scale tier for a score (0..=4)
pub fn scale_tier(score: u32) -> usize {
    tier_index(score).min(SCALES.len() - 1)
}

/// Note sequence of a scale tier
pub fn scale(tier: usize) -> &'static [u8] {
    SCALES[tier.min(SCALES.len() - 1)]
}

/// Every 8th note of a scale is accented
pub fn melody_velocity(cursor: usize, settings: &AudioSettings) -> u8 {
    if cursor % 8 == 0 {
        settings.velocity_loud
    } else {
        settings.velocity_soft
    }
}

/// Long and short notes alternate
pub fn melody_duration(cursor: usize, settings: &AudioSettings) -> Duration {
    if cursor % 2 == 0 {
        Duration::from_millis(settings.long_note_ms)
    } else {
        Duration::from_millis(settings.short_note_ms)
    }
}

/// Equal-temperament frequency of a MIDI note (A4 = 69 = 440 Hz)
pub fn midi_to_hz(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}
