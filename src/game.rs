//! Game loop controller
//!
//! Wraps a [`GameState`] with the session state machine, turns key and
//! menu commands into tick input, and forwards tick events to the audio
//! engine. The host drives it by calling [`GameLoop::on_tick`] once per
//! fixed period with the current time.

use std::time::Instant;

use crate::audio::AudioEngine;
use crate::settings::Settings;
use crate::sim::{Direction, GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSignal {
    /// Keep ticking
    Continue,
    /// Nothing advanced (paused, over or declined)
    Idle,
    /// The player just fell out with this score
    GameOver(u32),
}

/// Output of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub snapshot: Snapshot,
    pub events: Vec<GameEvent>,
    pub signal: TickSignal,
}

/// Session controller borrowing the audio engine for its lifetime
pub struct GameLoop<'a> {
    state: GameState,
    audio: &'a mut AudioEngine,
    held: Option<Direction>,
    autopilot: bool,
    on_game_over: Option<Box<dyn FnMut(u32) + 'a>>,
}

impl<'a> GameLoop<'a> {
    /// Start a running session
    pub fn new(settings: &Settings, seed: u64, audio: &'a mut AudioEngine, now: Instant) -> Self {
        Self {
            state: GameState::new(settings, seed, now),
            audio,
            held: None,
            autopilot: false,
            on_game_over: None,
        }
    }

    /// Called once with the final score whenever a session ends
    pub fn set_on_game_over(&mut self, callback: impl FnMut(u32) + 'a) {
        self.on_game_over = Some(Box::new(callback));
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts that edit the session (and for tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.player.score
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn audio(&self) -> &AudioEngine {
        &*self.audio
    }

    /// Demo mode: steer automatically instead of following held keys
    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.autopilot != enabled {
            log::info!("Autopilot: {}", enabled);
        }
        self.autopilot = enabled;
    }

    pub fn key_down(&mut self, direction: Direction) {
        self.held = Some(direction);
    }

    /// Releasing a key only stops movement it is driving
    pub fn key_up(&mut self, direction: Direction) {
        if self.held == Some(direction) {
            self.held = None;
        }
    }

    /// Resume a paused session
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Running;
            log::info!("Resumed");
        }
    }

    pub fn resume(&mut self) {
        self.start();
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Paused;
            log::info!("Paused");
        }
    }

    /// Fresh layout mid-session. Keeps Running/Paused, revives a finished
    /// session, and does nothing once declined.
    pub fn new_game(&mut self, now: Instant) {
        let phase = match self.state.phase {
            GamePhase::Declined => return,
            GamePhase::GameOver => GamePhase::Running,
            phase => phase,
        };
        self.reset(now);
        self.state.phase = phase;
        log::info!("New game ({:?})", phase);
    }

    /// Start over from Paused or GameOver. Returns whether it happened.
    pub fn restart(&mut self, now: Instant) -> bool {
        match self.state.phase {
            GamePhase::Paused | GamePhase::GameOver => {
                self.reset(now);
                self.state.phase = GamePhase::Running;
                log::info!("Restarted");
                true
            }
            GamePhase::Running | GamePhase::Declined => false,
        }
    }

    /// Leave for good: no restart is possible afterwards
    pub fn terminate(&mut self) {
        if self.state.phase != GamePhase::Declined {
            log::info!("Session declined at score {}", self.state.player.score);
        }
        self.state.phase = GamePhase::Declined;
        self.held = None;
        self.audio.shutdown();
    }

    /// The "quit" answer to the game-over prompt
    pub fn decline(&mut self) {
        self.terminate();
    }

    fn reset(&mut self, now: Instant) {
        self.state.reset_session(now);
        self.held = None;
        self.audio.reset();
    }

    /// Advance one fixed tick and dispatch its events
    pub fn on_tick(&mut self, now: Instant) -> TickReport {
        let input = TickInput {
            direction: self.held.map_or(0, Direction::sign),
            autopilot: self.autopilot,
        };
        let events = tick(&mut self.state, &input, now);

        let mut signal = if events.is_empty() && self.state.phase != GamePhase::Running {
            TickSignal::Idle
        } else {
            TickSignal::Continue
        };

        for event in &events {
            match *event {
                GameEvent::Bounce { score, .. } => {
                    self.audio.request_note(score);
                }
                GameEvent::PowerUpCollected { .. } => {
                    self.audio.play_power_up_sound();
                }
                GameEvent::GameOver { final_score } => {
                    self.audio.play_game_over_sequence();
                    if let Some(callback) = self.on_game_over.as_mut() {
                        callback(final_score);
                    }
                    signal = TickSignal::GameOver(final_score);
                }
                GameEvent::PowerUpSpawned { .. } | GameEvent::PowerUpLost { .. } | GameEvent::TierChanged { .. } => {}
            }
        }

        TickReport {
            snapshot: self.state.snapshot(),
            events,
            signal,
        }
    }
}

/// Farewell text for a player leaving with `final_score`
pub fn encouragement(final_score: u32) -> Option<&'static str> {
    match final_score {
        0..43 => Some(
            "Not quite your game yet. Maybe try something else for a while, and thanks for giving it a go!",
        ),
        43..87 => Some("You held your own. A bit more practice and you'll be climbing in no time."),
        87..175 => Some("You crushed it! Come back for more soon."),
        _ => None,
    }
}
