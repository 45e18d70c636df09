//! Game settings
//!
//! Roster, seed and map. Loaded from JSON for headless runs; the
//! defaults give a two-bot exhibition match.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;
use crate::error::SimError;
use crate::sim::{BotSpec, ControlId, Map, Team};

/// One seat at the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub team: Team,
    pub name: String,
    /// Key code for a human player
    #[serde(default)]
    pub key: Option<u32>,
    /// Bot driving this slot; takes precedence over `key`
    #[serde(default)]
    pub bot: Option<BotSpec>,
}

impl PlayerSlot {
    pub fn bot(team: Team, spec: BotSpec) -> Self {
        Self {
            team,
            name: team.as_str().to_string(),
            key: None,
            bot: Some(spec),
        }
    }

    pub fn human(team: Team, key: u32) -> Self {
        Self {
            team,
            name: team.as_str().to_string(),
            key: Some(key),
            bot: None,
        }
    }

    /// Control this slot answers to
    pub fn control(&self, slot: usize) -> ControlId {
        match (&self.bot, self.key) {
            (Some(_), _) | (None, None) => ControlId::Bot(slot),
            (None, Some(key)) => ControlId::Key(key),
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Fixed seed; `None` draws a fresh one
    #[serde(default)]
    pub seed: Option<u64>,
    pub players: Vec<PlayerSlot>,
    #[serde(default)]
    pub map: Map,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seed: None,
            players: vec![
                PlayerSlot::bot(Team::Red, BotSpec::Random { cutoff: 0.02, seed: None }),
                PlayerSlot::bot(Team::Blue, BotSpec::Random { cutoff: 0.02, seed: None }),
            ],
            map: Map::standard(),
        }
    }
}

impl GameSettings {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Self = serde_json::from_str(json).map_err(SimError::Config)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::info!("loaded settings from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Reject rosters the game cannot seat
    pub fn validate(&self) -> Result<(), SimError> {
        if self.players.is_empty() {
            return Err(SimError::Roster("no players".into()));
        }
        if self.players.len() > MAX_PLAYERS {
            return Err(SimError::Roster(format!(
                "{} players, at most {MAX_PLAYERS} supported",
                self.players.len()
            )));
        }
        for (i, slot) in self.players.iter().enumerate() {
            if self.players[..i].iter().any(|s| s.team == slot.team) {
                return Err(SimError::Roster(format!(
                    "team {} taken twice",
                    slot.team.as_str()
                )));
            }
            let control = slot.control(i);
            if self.players[..i]
                .iter()
                .enumerate()
                .any(|(j, s)| s.control(j) == control)
            {
                return Err(SimError::Roster(format!("control {control:?} bound twice")));
            }
        }
        Ok(())
    }
}
