//! Fixed timestep simulation tick
//!
//! Advances the session by exactly one tick. The tick period is fixed, so
//! gravity is a per-tick constant and nothing here is scaled by frame time.
//! Real-time cooldowns compare against the `now` passed in by the driver.

use std::time::Instant;

use super::collision::intersects;
use super::difficulty::tier_for_score;
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::wrap_horizontal;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction: -1 left, 0 none, 1 right
    pub direction: i32,
    /// Demo mode - steer automatically, ignoring `direction`
    pub autopilot: bool,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player bounced off a paddle (score after the bounce)
    Bounce { paddle_id: u32, score: u32 },
    /// A power-up appeared on the top edge
    PowerUpSpawned { id: u32, x: i32 },
    /// Player caught a power-up (score after the bonus)
    PowerUpCollected { id: u32, score: u32 },
    /// A power-up fell out of the window
    PowerUpLost { id: u32 },
    /// Score crossed into a new difficulty tier
    TierChanged { tier: usize },
    /// Player fell out of the window
    GameOver { final_score: u32 },
}

/// Advance the game state by one fixed tick
pub fn tick(state: &mut GameState, input: &TickInput, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Paused, game over and declined sessions don't advance
    if state.phase != GamePhase::Running {
        return events;
    }

    let direction = if input.autopilot {
        autopilot_direction(state)
    } else {
        input.direction.signum()
    };

    state.time_ticks += 1;
    state.player.direction = direction;

    // Gravity, then integrate
    state.player.apply_gravity(now);
    state.player.step(now);
    advance_paddles(state);

    // Pass-through wrap at the side edges
    state.player.pos.x = wrap_horizontal(state.player.pos.x, state.settings.screen_width);

    // Paddle bounces, gated by the re-arm deadline
    let width = state.difficulty.paddle_width;
    let player_box = state.player.bounds();
    for paddle in &state.paddles {
        if intersects(&player_box, &paddle.bounds(width)) && state.player.can_collide_with_paddle(now) {
            state.player.bounce(now);
            log::debug!("Bounce off paddle {} -> score {}", paddle.id, state.player.score);
            events.push(GameEvent::Bounce {
                paddle_id: paddle.id,
                score: state.player.score,
            });
        }
    }

    // Fell out of the bottom
    if state.player.pos.y > state.settings.screen_height {
        state.phase = GamePhase::GameOver;
        log::info!("Game over after {} ticks, score {}", state.time_ticks, state.player.score);
        events.push(GameEvent::GameOver {
            final_score: state.player.score,
        });
        return events;
    }

    maybe_spawn_power_up(state, &mut events);
    update_power_ups(state, now, &mut events);

    // Difficulty follows the new score
    let tier = tier_for_score(state.player.score);
    if tier.index != state.difficulty.index {
        log::debug!(
            "Tier {} -> {} (paddle width {})",
            state.difficulty.index,
            tier.index,
            tier.paddle_width
        );
        events.push(GameEvent::TierChanged { tier: tier.index });
    }
    state.difficulty = tier;

    // Ensure deterministic ordering
    state.normalize_order();

    events
}

/// Scroll paddles down; rows that leave the bottom re-enter above the top
fn advance_paddles(state: &mut GameState) {
    let height = state.settings.screen_height;
    let span = state.settings.paddle_rows as i32 * state.settings.paddle_spacing;

    let mut recycled = Vec::new();
    for (idx, paddle) in state.paddles.iter_mut().enumerate() {
        paddle.pos.y += paddle.vel.y as i32;
        if paddle.pos.y > height {
            paddle.pos.y -= span;
            recycled.push(idx);
        }
    }
    for idx in recycled {
        let x = state.random_paddle_x();
        state.paddles[idx].pos.x = x;
    }
}

/// Edge-triggered spawn: once per 75-point boundary, never two pending
fn maybe_spawn_power_up(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let score = state.player.score;
    let crossed = score / POWER_UP_INTERVAL > state.last_power_up_score / POWER_UP_INTERVAL;
    if score == 0 || state.power_up_pending || !crossed {
        return;
    }

    state.spawn_power_up();
    state.last_power_up_score = score;
    if let Some(power_up) = state.power_ups.last() {
        log::debug!("Power-up {} spawned at x={} (score {})", power_up.id, power_up.pos.x, score);
        events.push(GameEvent::PowerUpSpawned {
            id: power_up.id,
            x: power_up.pos.x,
        });
    }
}

/// Move power-ups, then collect or discard them
fn update_power_ups(state: &mut GameState, now: Instant, events: &mut Vec<GameEvent>) {
    let player_box = state.player.bounds();
    let height = state.settings.screen_height;

    let mut collected = Vec::new();
    let mut lost = Vec::new();
    state.power_ups.retain_mut(|power_up| {
        power_up.advance();
        if power_up.active && intersects(&player_box, &power_up.bounds()) {
            power_up.active = false;
            collected.push(power_up.id);
            false
        } else if power_up.pos.y > height {
            lost.push(power_up.id);
            false
        } else {
            true
        }
    });

    for id in collected {
        state.player.collect_power_up(now, state.settings.boost_duration());
        state.power_up_pending = false;
        log::debug!(
            "Power-up {} collected -> score {}, boost {:?}",
            id,
            state.player.score,
            state.player.boosted_until.remaining(now)
        );
        events.push(GameEvent::PowerUpCollected {
            id,
            score: state.player.score,
        });
    }
    for id in lost {
        state.power_up_pending = false;
        log::debug!("Power-up {} lost", id);
        events.push(GameEvent::PowerUpLost { id });
    }
}

/// Demo steering: chase a power-up while rising, else the nearest paddle below
fn autopilot_direction(state: &GameState) -> i32 {
    let player = state.player.bounds();
    let center = player.center_x();
    let width = state.difficulty.paddle_width;

    let chase_power_up = if state.player.vel.y < 0.0 {
        state
            .power_ups
            .iter()
            .filter(|p| p.active)
            .min_by_key(|p| (p.pos.y - player.top()).abs())
            .map(|p| p.bounds().center_x())
    } else {
        None
    };

    let target = chase_power_up.or_else(|| {
        state
            .paddles
            .iter()
            .filter(|p| p.pos.y >= player.bottom())
            .min_by_key(|p| p.pos.y)
            .map(|p| p.bounds(width).center_x())
    });

    match target {
        Some(x) if x > center + SPEED => 1,
        Some(x) if x < center - SPEED => -1,
        _ => 0,
    }
}
