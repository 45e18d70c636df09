//! Bot decision interface
//!
//! Bots are polled once per frame with a read-only view of the state as it
//! was before the frame's update, and answer whether to press their action.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::player::PlayerBody;
use super::state::GameState;

/// What a bot gets to look at
#[derive(Debug, Clone, Copy)]
pub struct BotView<'a> {
    pub state: &'a GameState,
    /// The bot's own player slot
    pub slot: usize,
}

impl<'a> BotView<'a> {
    /// The player this bot controls
    pub fn me(&self) -> Option<&'a PlayerBody> {
        self.state.players.get(self.slot)
    }
}

/// A player controller
pub trait Bot {
    fn name(&self) -> &str;

    /// Return true to attempt this slot's action (orbit toggle or dodge)
    fn decide(&mut self, view: BotView<'_>, time_delta: f32) -> bool;
}

/// Never presses anything
#[derive(Debug, Clone, Default)]
pub struct DoNothingBot;

impl Bot for DoNothingBot {
    fn name(&self) -> &str {
        "DoNothingBot"
    }

    fn decide(&mut self, _view: BotView<'_>, _time_delta: f32) -> bool {
        false
    }
}

/// Presses with a fixed probability each frame, from its own stream so the
/// game's draw count is unaffected.
#[derive(Debug, Clone)]
pub struct RandomBot {
    cutoff: f64,
    name: String,
    rng: Pcg32,
}

impl RandomBot {
    pub fn new(cutoff: f64, seed: u64) -> Self {
        Self {
            cutoff,
            name: format!("RandomBot{cutoff}"),
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, view: BotView<'_>, _time_delta: f32) -> bool {
        if !view.me().is_some_and(|p| p.alive) {
            return false;
        }
        self.rng.random::<f64>() < self.cutoff
    }
}

/// Serializable bot description used by settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotSpec {
    DoNothing,
    Random {
        cutoff: f64,
        /// Private stream seed; defaults to the slot index
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl BotSpec {
    pub fn build(&self, slot: usize) -> Box<dyn Bot> {
        match self {
            BotSpec::DoNothing => Box::new(DoNothingBot),
            BotSpec::Random { cutoff, seed } => {
                Box::new(RandomBot::new(*cutoff, seed.unwrap_or(slot as u64)))
            }
        }
    }
}
