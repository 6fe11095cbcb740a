//! Game state and core simulation types
//!
//! Everything the fixed tick mutates lives here. Entities are owned by
//! [`GameState`]; nothing outside the loop holds references across ticks.

use std::time::Instant;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::difficulty::{DifficultyTier, Rgb, tier_for_score};
use super::timers::Deadline;
use crate::Settings;
use crate::consts::*;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks advance the simulation
    Running,
    /// Ticks are skipped (wall-clock cooldowns keep running)
    Paused,
    /// Player fell out; waiting for restart or decline
    GameOver,
    /// Player declined to continue; restart is no longer possible
    Declined,
}

/// Horizontal input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// The falling/bouncing player
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner (pixels)
    pub pos: IVec2,
    /// x: last horizontal step, y: vertical velocity (pixels/tick)
    pub vel: Vec2,
    pub score: u32,
    /// -1, 0 or 1
    pub direction: i32,
    /// Paddle bounces are ignored while this runs
    pub paddle_rearm: Deadline,
    /// Fall speed is zero while this runs
    pub hover: Deadline,
    /// Horizontal boost while this runs
    pub boosted_until: Deadline,
}

impl Player {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, GRAVITY),
            score: 0,
            direction: 0,
            paddle_rearm: Deadline::idle(),
            hover: Deadline::idle(),
            boosted_until: Deadline::idle(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, PLAYER_SIZE)
    }

    /// Debounce gate for paddle bounces
    pub fn can_collide_with_paddle(&self, now: Instant) -> bool {
        !self.paddle_rearm.is_active(now)
    }

    /// Gravity currently applied per tick
    pub fn fall_speed(&self, now: Instant) -> f32 {
        if self.hover.is_active(now) { 0.0 } else { GRAVITY }
    }

    /// Horizontal pixels per tick for a held direction
    pub fn horizontal_speed(&self, now: Instant) -> i32 {
        if self.boosted_until.is_active(now) {
            BOOSTED_SPEED
        } else {
            SPEED
        }
    }

    pub fn apply_gravity(&mut self, now: Instant) {
        self.vel.y += self.fall_speed(now);
    }

    /// Integrate position; vertical motion truncates to whole pixels
    pub fn step(&mut self, now: Instant) {
        let dx = self.direction * self.horizontal_speed(now);
        self.vel.x = dx as f32;
        self.pos.y = (self.pos.y as f32 + self.vel.y) as i32;
        self.pos.x += dx;
    }

    /// Bounce off a paddle and close the gate for the re-arm window
    pub fn bounce(&mut self, now: Instant) {
        self.vel.y = -JUMP_STRENGTH;
        self.score += BOUNCE_SCORE;
        self.paddle_rearm.arm(now, std::time::Duration::from_millis(BOUNCE_REARM_MS));
    }

    /// Collect a power-up: bonus score, speed boost, gate closed
    pub fn collect_power_up(&mut self, now: Instant, boost: std::time::Duration) {
        self.score += POWER_UP_BONUS;
        self.boosted_until.arm(now, boost);
        self.paddle_rearm.arm(now, std::time::Duration::from_millis(BOUNCE_REARM_MS));
    }
}

/// A platform. Its width comes from the current difficulty tier.
#[derive(Debug, Clone)]
pub struct Paddle {
    pub id: u32,
    pub pos: IVec2,
    pub vel: Vec2,
}

impl Paddle {
    pub fn bounds(&self, width: i32) -> Rect {
        Rect::new(self.pos.x, self.pos.y, width, PADDLE_HEIGHT)
    }
}

/// A falling collectible
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub id: u32,
    pub pos: IVec2,
    pub vel: Vec2,
    pub active: bool,
}

impl PowerUp {
    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, POWER_UP_SIZE)
    }

    /// Falls straight down
    pub fn advance(&mut self) {
        self.pos.y += self.vel.y as i32;
    }
}

/// Render-ready, immutable view of one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player_pos: IVec2,
    pub player_score: u32,
    pub paddle_positions: Vec<IVec2>,
    pub paddle_width: i32,
    pub power_up_positions: Vec<IVec2>,
    pub background_tint: Rgb,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter (current session)
    pub time_ticks: u64,
    pub player: Player,
    /// Sorted by id; the count never changes within a session
    pub paddles: Vec<Paddle>,
    pub power_ups: Vec<PowerUp>,
    /// A spawned power-up has not yet been collected or lost
    pub power_up_pending: bool,
    /// Score at the last power-up spawn
    pub last_power_up_score: u32,
    /// Current difficulty parameters
    pub difficulty: DifficultyTier,
    next_id: u32,
}

impl GameState {
    /// Create a running session with the given seed
    pub fn new(settings: &Settings, seed: u64, now: Instant) -> Self {
        let settings = settings.clone().validated();
        let mut state = Self {
            player: Player::new(IVec2::ZERO),
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            time_ticks: 0,
            paddles: Vec::new(),
            power_ups: Vec::new(),
            power_up_pending: false,
            last_power_up_score: 0,
            difficulty: tier_for_score(0),
            next_id: 1,
        };
        state.reset_session(now);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace every entity with a fresh layout. The RNG stream continues.
    pub fn reset_session(&mut self, now: Instant) {
        self.time_ticks = 0;
        self.power_ups.clear();
        self.power_up_pending = false;
        self.last_power_up_score = 0;
        self.difficulty = tier_for_score(0);

        let width = self.settings.screen_width;
        let height = self.settings.screen_height;
        let spawn = IVec2::new(width / 2 - PLAYER_SIZE / 2, height / 3);
        self.player = Player::new(spawn);
        self.player.hover.arm(now, self.settings.spawn_hover());

        self.layout_paddles();

        if self.rng.random_bool(self.settings.opening_power_up_chance) {
            self.spawn_power_up();
        }

        log::info!(
            "Session start: seed={} paddles={} opening_power_up={}",
            self.seed,
            self.paddles.len(),
            self.power_up_pending
        );
    }

    /// Rows of paddles from the bottom up, one directly beneath the player
    fn layout_paddles(&mut self) {
        self.paddles.clear();
        let width = self.difficulty.paddle_width;
        let bottom_row = self.settings.screen_height - 60;
        let spacing = self.settings.paddle_spacing;
        let scroll = self.settings.paddle_scroll_speed as f32;
        let player = self.player.bounds();

        let mut placed_under_player = false;
        for row in 0..self.settings.paddle_rows {
            let y = bottom_row - row as i32 * spacing;
            // The highest row below the player's feet sits right under the spawn
            let x = if !placed_under_player && y >= player.bottom() && y - spacing < player.bottom() {
                placed_under_player = true;
                player.center_x() - width / 2
            } else {
                self.random_paddle_x()
            };
            let id = self.next_entity_id();
            self.paddles.push(Paddle {
                id,
                pos: IVec2::new(x, y),
                vel: Vec2::new(0.0, scroll),
            });
        }
    }

    /// Random paddle x that keeps the widest paddle on screen
    pub fn random_paddle_x(&mut self) -> i32 {
        let max_x = (self.settings.screen_width - tier_for_score(0).paddle_width).max(1);
        self.rng.random_range(0..max_x)
    }

    /// Drop a new power-up at a random x on the top edge
    pub fn spawn_power_up(&mut self) {
        let max_x = (self.settings.screen_width - POWER_UP_SIZE).max(1);
        let x = self.rng.random_range(0..max_x);
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp {
            id,
            pos: IVec2::new(x, 0),
            vel: Vec2::new(0.0, self.settings.power_up_fall_speed as f32),
            active: true,
        });
        self.power_up_pending = true;
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.paddles.sort_by_key(|p| p.id);
        self.power_ups.sort_by_key(|p| p.id);
    }

    /// Render-ready view of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            player_pos: self.player.pos,
            player_score: self.player.score,
            paddle_positions: self.paddles.iter().map(|p| p.pos).collect(),
            paddle_width: self.difficulty.paddle_width,
            power_up_positions: self
                .power_ups
                .iter()
                .filter(|p| p.active)
                .map(|p| p.pos)
                .collect(),
            background_tint: self.difficulty.tint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::intersects;

    fn settings() -> Settings {
        Settings {
            opening_power_up_chance: 0.0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_session() {
        let now = Instant::now();
        let state = GameState::new(&settings(), 7, now);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.paddles.len(), 7);
        assert!(state.power_ups.is_empty());
        assert!(!state.power_up_pending);
        assert_eq!(state.difficulty.paddle_width, 70);
        assert!(state.player.hover.is_active(now));
        assert_eq!(state.player.fall_speed(now), 0.0);
    }

    #[test]
    fn test_first_paddle_beneath_player() {
        let state = GameState::new(&settings(), 3, Instant::now());
        let player = state.player.bounds();
        let width = state.difficulty.paddle_width;
        let below = state
            .paddles
            .iter()
            .filter(|p| p.pos.y >= player.bottom())
            .min_by_key(|p| p.pos.y)
            .expect("a paddle below the spawn");
        // Dropping straight down lands on it
        let mut probe = player;
        probe.pos.y = below.pos.y - PLAYER_SIZE + 1;
        assert!(intersects(&probe, &below.bounds(width)));
    }

    #[test]
    fn test_paddle_rows_evenly_spaced() {
        let state = GameState::new(&settings(), 11, Instant::now());
        let mut ys: Vec<i32> = state.paddles.iter().map(|p| p.pos.y).collect();
        ys.sort();
        for pair in ys.windows(2) {
            assert_eq!(pair[1] - pair[0], state.settings.paddle_spacing);
        }
    }

    #[test]
    fn test_opening_power_up() {
        let settings = Settings {
            opening_power_up_chance: 1.0,
            ..Settings::default()
        };
        let state = GameState::new(&settings, 5, Instant::now());
        assert_eq!(state.power_ups.len(), 1);
        assert!(state.power_up_pending);
        assert_eq!(state.power_ups[0].pos.y, 0);
        // Opening power-ups don't consume a score boundary
        assert_eq!(state.last_power_up_score, 0);
    }

    #[test]
    fn test_player_bounce_and_gate() {
        let now = Instant::now();
        let mut player = Player::new(IVec2::new(0, 0));
        assert!(player.can_collide_with_paddle(now));
        player.bounce(now);
        assert_eq!(player.score, 1);
        assert_eq!(player.vel.y, -JUMP_STRENGTH);
        assert!(!player.can_collide_with_paddle(now + std::time::Duration::from_millis(499)));
        assert!(player.can_collide_with_paddle(now + std::time::Duration::from_millis(500)));
    }

    #[test]
    fn test_boost_expires() {
        let now = Instant::now();
        let mut player = Player::new(IVec2::new(0, 0));
        player.collect_power_up(now, std::time::Duration::from_secs(5));
        assert_eq!(player.score, POWER_UP_BONUS);
        assert_eq!(player.horizontal_speed(now), BOOSTED_SPEED);
        assert_eq!(player.horizontal_speed(now + std::time::Duration::from_secs(5)), SPEED);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let now = Instant::now();
        let a = GameState::new(&settings(), 99, now);
        let b = GameState::new(&settings(), 99, now);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
