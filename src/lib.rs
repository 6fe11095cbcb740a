//! Note Hopper - A bounce-and-climb arcade loop that plays music
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (physics, collisions, difficulty, power-ups)
//! - `audio`: Bounded-concurrency note scheduler running off the game thread
//! - `game`: Game loop controller (input commands, state machine, event dispatch)
//! - `renderer`: Render collaborator interface
//! - `settings`: Data-driven tuning and audio preferences

pub mod audio;
pub mod game;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{AudioEngine, Dispatch};
pub use game::{GameLoop, TickReport, TickSignal};
pub use settings::{AudioSettings, Settings};

/// Game configuration constants
pub mod consts {
    /// Downward acceleration added to the player's vertical velocity every tick
    pub const GRAVITY: f32 = 0.35;
    /// Upward velocity applied on a paddle bounce
    pub const JUMP_STRENGTH: f32 = 7.5;
    /// Horizontal pixels per tick while a direction key is held
    pub const SPEED: i32 = 4;
    /// Horizontal pixels per tick while a power-up boost is active
    pub const BOOSTED_SPEED: i32 = 7;

    /// Entity sizes (pixels)
    pub const PLAYER_SIZE: i32 = 21;
    pub const POWER_UP_SIZE: i32 = 20;
    pub const PADDLE_HEIGHT: i32 = 10;

    /// Real-time delay before a paddle bounce can fire again
    pub const BOUNCE_REARM_MS: u64 = 500;

    /// Score step between power-up spawns
    pub const POWER_UP_INTERVAL: u32 = 75;
    /// Score awarded for collecting a power-up
    pub const POWER_UP_BONUS: u32 = 15;
    /// Score awarded for a paddle bounce
    pub const BOUNCE_SCORE: u32 = 1;
}

/// Pass-through horizontal wrap: leaving one edge re-enters at the other.
///
/// A single step never wraps twice; `x` just past the right edge lands on 0.
#[inline]
pub fn wrap_horizontal(x: i32, screen_width: i32) -> i32 {
    if x < 0 {
        screen_width
    } else if x > screen_width {
        0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_horizontal() {
        assert_eq!(wrap_horizontal(-1, 800), 800);
        assert_eq!(wrap_horizontal(801, 800), 0);
        assert_eq!(wrap_horizontal(0, 800), 0);
        assert_eq!(wrap_horizontal(800, 800), 800);
        assert_eq!(wrap_horizontal(400, 800), 400);
    }
}
