//! Game state and core simulation types
//!
//! Everything needed to persist and resume a game lives in `GameState`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Burst, Color, Rotator, WHITE};
use super::collision::Arena;
use super::player::PlayerBody;
use super::rng::SimRng;
use crate::consts::*;
use crate::leaderboard::PlayerScore;

/// Current stage of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStage {
    /// Opening spiral that places players around the center
    RotatingAroundCenter,
    /// Active play
    Gaming,
    /// Leaderboard animation after a round ends; physics keeps running
    ShowingResults,
    /// Resetting round-scoped state
    RestartRound,
    /// Someone won; loops to a fresh game after a delay
    EndScreen,
}

/// Identifier of an input control (a keyboard key or a bot slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlId {
    Key(u32),
    Bot(usize),
}

/// Rotator placement: `(x fraction, y fraction, radius)` per rotator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub rotators: Vec<(f32, f32, f32)>,
}

impl Map {
    /// Three staggered rows of rotators
    pub fn standard() -> Self {
        let r = ROTATOR_SIZE;
        Self {
            rotators: vec![
                (0.1, 0.2, r),
                (0.3666, 0.2, r),
                (0.6333, 0.2, r),
                (0.9, 0.2, r),
                (0.2333, 0.5, r),
                (0.5, 0.5, r),
                (0.7666, 0.5, r),
                (0.1, 0.8, r),
                (0.3666, 0.8, r),
                (0.6333, 0.8, r),
                (0.9, 0.8, r),
            ],
        }
    }

    pub fn build(&self, arena: &Arena) -> Vec<Rotator> {
        self.rotators
            .iter()
            .map(|&(x, y, radius)| Rotator::new(Vec2::new(x, y) * arena.size(), radius))
            .collect()
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::standard()
    }
}

/// Authoritative, serializable game snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<PlayerBody>,
    /// Free spheres that respawn elsewhere when picked up
    pub active_spheres: Vec<Body>,
    /// Free spheres that do not respawn
    pub inactive_spheres: Vec<Body>,
    pub bursts: Vec<Burst>,
    pub rotators: Vec<Rotator>,
    /// Seconds since the current stage started
    pub timer: f32,
    /// Player slots in elimination order, earliest first
    pub death_order: Vec<usize>,
    /// Random stream; serialized as its (seed, draws) key
    pub rng: SimRng,
}

impl GameState {
    pub fn empty(rng: SimRng) -> Self {
        Self {
            players: Vec::new(),
            active_spheres: Vec::new(),
            inactive_spheres: Vec::new(),
            bursts: Vec::new(),
            rotators: Vec::new(),
            timer: 0.0,
            death_order: Vec::new(),
            rng,
        }
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Random values consumed so far
    #[inline]
    pub fn draw_count(&self) -> u64 {
        self.rng.draws()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = (usize, &PlayerBody)> {
        self.players.iter().enumerate().filter(|(_, p)| p.alive)
    }

    /// Uniform position keeping a body of `radius` inside the arena
    pub fn random_spawn_position(&mut self, radius: f32, arena: &Arena) -> Vec2 {
        let x = self
            .rng
            .draw_uniform(radius as f64, (arena.width - radius) as f64);
        let y = self
            .rng
            .draw_uniform(radius as f64, (arena.height - radius) as f64);
        Vec2::new(x as f32, y as f32)
    }

    pub fn spawn_random_sphere(&mut self, arena: &Arena) {
        let center = self.random_spawn_position(SPHERE_SIZE, arena);
        self.active_spheres
            .push(Body::at_rest(center, SPHERE_SIZE, WHITE));
    }

    pub fn spawn_burst(&mut self, arena: &Arena) {
        let center = self.random_spawn_position(BURST_SIZE, arena);
        log::debug!("burst spawned at ({:.3}, {:.3})", center.x, center.y);
        self.bursts.push(Burst::new(center, BURST_SIZE));
    }
}

/// Snapshot plus presentation data for renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateFront {
    #[serde(flatten)]
    pub state: GameState,
    /// Filled once the first round has been scored
    pub player_scores: Option<Vec<PlayerScore>>,
    pub how_to_win_text: String,
    pub stage: GameStage,
    /// Winner's colour once the game is decided
    pub someone_won: Option<Color>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_map_scales_to_arena() {
        let arena = Arena::default();
        let rotators = Map::standard().build(&arena);
        assert_eq!(rotators.len(), 11);
        let middle = &rotators[5];
        assert_eq!(middle.body.center, Vec2::new(1.0, 0.5));
        assert_eq!(middle.body.radius, ROTATOR_SIZE);
        assert!((middle.core.radius - ROTATOR_SIZE / 20.0).abs() < 1e-7);
    }

    #[test]
    fn test_spawn_positions_stay_inside_and_count_draws() {
        let arena = Arena::default();
        let mut state = GameState::empty(SimRng::new(5));
        for _ in 0..50 {
            state.spawn_random_sphere(&arena);
        }
        assert_eq!(state.draw_count(), 100);
        for s in &state.active_spheres {
            assert!(s.center.x >= SPHERE_SIZE && s.center.x <= arena.width - SPHERE_SIZE);
            assert!(s.center.y >= SPHERE_SIZE && s.center.y <= arena.height - SPHERE_SIZE);
        }
    }

    #[test]
    fn test_state_json_roundtrip_keeps_rng_key() {
        let arena = Arena::default();
        let mut state = GameState::empty(SimRng::new(77));
        state.rotators = Map::standard().build(&arena);
        state.spawn_burst(&arena);
        let json = serde_json::to_string(&state).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.seed(), 77);
        assert_eq!(restored.draw_count(), 2);
        assert_eq!(restored.bursts, state.bursts);
    }
}
