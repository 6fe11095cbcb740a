//! Property tests for the simulation and the note-slot pool

use std::time::{Duration, Instant};

use glam::IVec2;
use proptest::prelude::*;

use note_hopper::Settings;
use note_hopper::audio::NoteSlots;
use note_hopper::consts::*;
use note_hopper::sim::{GameEvent, GamePhase, GameState, TickInput, paddle_width, tick};

fn quiet_state(seed: u64, now: Instant) -> GameState {
    let settings = Settings {
        opening_power_up_chance: 0.0,
        paddle_scroll_speed: 0,
        ..Settings::default()
    };
    let mut state = GameState::new(&settings, seed, now);
    state.player.pos = IVec2::new(300, 300);
    state.player.vel.y = 0.0;
    state.player.hover.arm(now, Duration::from_secs(3600));
    for paddle in &mut state.paddles {
        paddle.pos = IVec2::new(0, -1000);
    }
    state
}

proptest! {
    #[test]
    fn score_moves_in_steps_of_one_or_fifteen(
        seed in any::<u64>(),
        inputs in prop::collection::vec((-1i32..=1, any::<bool>()), 1..1500),
    ) {
        let now = Instant::now();
        let settings = Settings {
            opening_power_up_chance: 1.0,
            ..Settings::default()
        };
        let mut state = GameState::new(&settings, seed, now);

        for (i, (direction, autopilot)) in inputs.into_iter().enumerate() {
            let before = state.player.score;
            let at = now + Duration::from_millis(i as u64 * settings.tick_ms);
            let events = tick(&mut state, &TickInput { direction, autopilot }, at);

            let mut expected = before;
            for event in &events {
                match *event {
                    GameEvent::Bounce { score, .. } => {
                        expected += BOUNCE_SCORE;
                        prop_assert_eq!(score, expected);
                    }
                    GameEvent::PowerUpCollected { score, .. } => {
                        expected += POWER_UP_BONUS;
                        prop_assert_eq!(score, expected);
                    }
                    _ => {}
                }
            }
            prop_assert_eq!(state.player.score, expected);
            prop_assert!(state.player.score >= before);
            prop_assert!(state.power_ups.len() <= 1);

            if state.phase == GamePhase::GameOver {
                break;
            }
        }
    }

    #[test]
    fn paddle_width_never_grows(s1 in 0u32..2_000, delta in 0u32..2_000) {
        prop_assert!(paddle_width(s1) >= paddle_width(s1 + delta));
    }

    #[test]
    fn wrap_happens_within_one_step(x in 0i32..=800, direction in prop::sample::select(vec![-1, 1])) {
        let now = Instant::now();
        let mut state = quiet_state(1, now);
        state.player.pos.x = x;

        tick(&mut state, &TickInput { direction, autopilot: false }, now);

        let moved = x + direction * SPEED;
        let expected = if moved > 800 {
            0
        } else if moved < 0 {
            800
        } else {
            moved
        };
        prop_assert_eq!(state.player.pos.x, expected);
    }

    #[test]
    fn one_power_up_per_75_boundary(
        seed in any::<u64>(),
        steps in prop::collection::vec(prop::sample::select(vec![1u32, 15]), 1..200),
    ) {
        let now = Instant::now();
        let mut state = quiet_state(seed, now);
        let mut spawned = 0u32;

        for (i, step) in steps.iter().enumerate() {
            state.player.score += step;
            let at = now + Duration::from_millis(i as u64 * 10);
            let events = tick(&mut state, &TickInput::default(), at);
            let spawns = events
                .iter()
                .filter(|e| matches!(e, GameEvent::PowerUpSpawned { .. }))
                .count() as u32;
            prop_assert!(spawns <= 1);
            spawned += spawns;

            // Take it away again so the next boundary can spawn
            state.power_ups.clear();
            state.power_up_pending = false;
        }

        prop_assert_eq!(spawned, state.player.score / POWER_UP_INTERVAL);
    }

    #[test]
    fn slot_pool_respects_bound(max in 1usize..8, ops in prop::collection::vec(any::<bool>(), 1..200)) {
        let slots = NoteSlots::new(max);
        let mut held = Vec::new();

        for acquire in ops {
            if acquire {
                match slots.try_acquire() {
                    Some(guard) => held.push(guard),
                    None => prop_assert_eq!(held.len(), max),
                }
            } else {
                held.pop();
            }
            prop_assert!(slots.in_flight() <= max);
            prop_assert_eq!(slots.in_flight(), held.len());
        }
    }
}
