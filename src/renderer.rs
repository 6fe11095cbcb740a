//! Render collaborator
//!
//! The game loop hands each tick's [`Snapshot`] to a [`Renderer`]. Drawing
//! itself lives with the host; the headless binary just logs.

use crate::sim::Snapshot;

/// Consumes one snapshot per tick
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);
}

/// One-line summary of a snapshot
pub fn describe(snapshot: &Snapshot) -> String {
    let tint = snapshot.background_tint;
    format!(
        "{:?} score={} player=({}, {}) paddles={}x{} power_ups={} tint=#{:02x}{:02x}{:02x}",
        snapshot.phase,
        snapshot.player_score,
        snapshot.player_pos.x,
        snapshot.player_pos.y,
        snapshot.paddle_positions.len(),
        snapshot.paddle_width,
        snapshot.power_up_positions.len(),
        tint.0,
        tint.1,
        tint.2,
    )
}

/// Logs every `every`th frame at debug level
#[derive(Debug)]
pub struct LogRenderer {
    every: u64,
    frames: u64,
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for LogRenderer {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &Snapshot) {
        if self.frames % self.every == 0 {
            log::debug!("frame {}: {}", self.frames, describe(snapshot));
        }
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::GameState;
    use std::time::Instant;

    #[test]
    fn test_describe() {
        let settings = Settings {
            opening_power_up_chance: 0.0,
            ..Settings::default()
        };
        let state = GameState::new(&settings, 1, Instant::now());
        let line = describe(&state.snapshot());
        assert!(line.starts_with("Running score=0"));
        assert!(line.contains("paddles=7x70"));
        assert!(line.ends_with("tint=#f5f5dc"));
    }

    #[test]
    fn test_log_renderer_counts_frames() {
        let state = GameState::new(&Settings::default(), 1, Instant::now());
        let mut renderer = LogRenderer::new(0);
        for _ in 0..5 {
            renderer.render(&state.snapshot());
        }
        assert_eq!(renderer.frames(), 5);
    }
}
