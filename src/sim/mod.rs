//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, inputs and clock
//! readings, a session replays identically:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No audio, rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Rect, intersects};
pub use difficulty::{DifficultyTier, Rgb, TIER_BREAKPOINTS, paddle_width, tier_for_score, tier_index};
pub use state::{Direction, GamePhase, GameState, Paddle, Player, PowerUp, Snapshot};
pub use tick::{GameEvent, TickInput, tick};
pub use timers::Deadline;
