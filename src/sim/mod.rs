//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, movement in arena units per frame
//! - Every random value comes from the counted `SimRng`
//! - Stable iteration order (by slot / collection index)
//! - No rendering or platform dependencies

pub mod body;
pub mod bot;
pub mod collision;
pub mod player;
pub mod rng;
pub mod state;
pub mod tick;

pub use body::{Body, Burst, Color, Rotator, Team, WHITE};
pub use bot::{Bot, BotSpec, BotView, DoNothingBot, RandomBot};
pub use collision::{Arena, Wall, collide, contains_center, intersects};
pub use player::{DodgeState, PathHistory, PlayerBody};
pub use rng::{RngState, SimRng};
pub use state::{ControlId, GameStage, GameState, GameStateFront, Map};
pub use tick::Game;
