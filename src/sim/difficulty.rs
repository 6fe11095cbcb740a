//! Difficulty tiers
//!
//! Score alone picks the tier: paddles narrow and the background darkens at
//! every 100 points, up to the last breakpoint at 500. Score never decreases
//! during a session, so there is no hysteresis to handle.

use serde::{Deserialize, Serialize};

/// Background tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Parameters derived from the current score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTier {
    /// 0-based tier index
    pub index: usize,
    /// Width shared by every paddle
    pub paddle_width: i32,
    /// Background tint for the render target
    pub tint: Rgb,
}

/// Lowest score of each tier
pub const TIER_BREAKPOINTS: [u32; 6] = [0, 100, 200, 300, 400, 500];

const PADDLE_WIDTHS: [i32; 6] = [70, 60, 50, 40, 30, 20];

const TINTS: [Rgb; 6] = [
    Rgb(245, 245, 220), // beige
    Rgb(195, 195, 170),
    Rgb(145, 145, 120),
    Rgb(95, 95, 70),
    Rgb(45, 45, 20),
    Rgb(0, 0, 0),
];

/// Tier index for a score
pub fn tier_index(score: u32) -> usize {
    TIER_BREAKPOINTS
        .iter()
        .rposition(|&start| score >= start)
        .unwrap_or(0)
}

/// Map a score to its difficulty parameters
pub fn tier_for_score(score: u32) -> DifficultyTier {
    let index = tier_index(score);
    DifficultyTier {
        index,
        paddle_width: PADDLE_WIDTHS[index],
        tint: TINTS[index],
    }
}

/// Paddle width for a score
pub fn paddle_width(score: u32) -> i32 {
    tier_for_score(score).paddle_width
}
