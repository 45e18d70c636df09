//! Snapshot export and import
//!
//! A snapshot is the JSON form of `GameState`. The random stream is stored
//! as its `(seed, draws)` key and rebuilt on import, so a resumed game
//! continues with exactly the draws the exporter would have made.

use crate::error::SimError;
use crate::sim::{GameState, GameStateFront};

/// Serialize the authoritative state
pub fn export_state(state: &GameState) -> Result<String, SimError> {
    serde_json::to_string(state).map_err(SimError::Snapshot)
}

/// Serialize the state plus leaderboard and stage data for a renderer
pub fn export_front_state(front: &GameStateFront) -> Result<String, SimError> {
    serde_json::to_string(front).map_err(SimError::Snapshot)
}

/// Parse a snapshot produced by `export_state`. Presentation fields
/// written by `export_front_state` are ignored.
pub fn import_state(json: &str) -> Result<GameState, SimError> {
    let state: GameState = serde_json::from_str(json).map_err(SimError::Snapshot)?;
    log::debug!(
        "snapshot parsed: {} players, seed {}, draw {}",
        state.players.len(),
        state.seed(),
        state.draw_count()
    );
    Ok(state)
}
