//! Orbits Arena - deterministic simulation core for a local multiplayer arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, physics, collisions, stage machine)
//! - `leaderboard`: Round scoring and leaderboard ordering
//! - `persistence`: Snapshot export/import
//! - `settings`: Player roster, seed and map configuration

pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use leaderboard::PlayerScore;
pub use settings::{GameSettings, PlayerSlot};

use glam::Vec2;

/// Game configuration constants
///
/// Sizes are measured in arena units: the arena is `ARENA_WIDTH` x `ARENA_HEIGHT`.
/// They were derived from a reference screenshot 885 px tall.
pub mod consts {
    const REFERENCE_SCREEN_SIZE: f32 = 885.0;
    const REFERENCE_ROTATOR_SIZE: f32 = 285.0;
    const REFERENCE_PLAYER_SIZE: f32 = 45.0;
    const REFERENCE_SPHERE_SIZE: f32 = 33.0;
    const REFERENCE_BURST_OUTER_SIZE: f32 = 59.0;
    const REFERENCE_BURST_INNER_SIZE: f32 = 41.0;

    /// Arena dimensions (fixed 2:1 aspect ratio)
    pub const ARENA_WIDTH: f32 = 2.0;
    pub const ARENA_HEIGHT: f32 = 1.0;

    /// Body radii
    pub const ROTATOR_SIZE: f32 = REFERENCE_ROTATOR_SIZE / REFERENCE_SCREEN_SIZE / 2.0;
    pub const PLAYER_SIZE: f32 = REFERENCE_PLAYER_SIZE / REFERENCE_SCREEN_SIZE / 2.0;
    pub const SPHERE_SIZE: f32 = REFERENCE_SPHERE_SIZE / REFERENCE_SCREEN_SIZE / 2.0;
    pub const BURST_SIZE: f32 = REFERENCE_BURST_OUTER_SIZE / REFERENCE_SCREEN_SIZE / 2.0;
    pub const BURST_INNER_RATIO: f32 = REFERENCE_BURST_INNER_SIZE / REFERENCE_BURST_OUTER_SIZE;
    /// Rotator core radius as a fraction of the rotator radius
    pub const ROTATOR_CORE_RATIO: f32 = 1.0 / 20.0;

    /// Base player speed (arena units per frame)
    pub const DEFAULT_SPEED: f32 = 2.0 / 400.0;
    /// Speed multiplier while dodging
    pub const DODGE_SPEED: f32 = 1.5;
    /// Trail followers chase their path sample at this multiple of base speed
    pub const TRAIL_SPEED: f32 = 3.0;
    /// Attacking spheres fly at this multiple of the player's velocity
    pub const ATTACK_SPEED: f32 = 2.0;
    /// Damping applied to spent attacking spheres
    pub const SPENT_DAMPING: f32 = 0.98;

    /// Dodge frame counts
    pub const DODGE_FRAMES: u32 = 30;
    pub const DODGE_CYCLE_FRAMES: u32 = 60;
    /// Path samples reserved per trail member
    pub const PATH_SAMPLES_PER_MEMBER: usize = 10;

    /// Burst lifecycle
    pub const BURST_ACTIVE_FRAMES: u32 = 40;
    pub const BURST_IDLE_FRAMES: u32 = 1200;
    /// Burst growth per frame as a fraction of its spawn radius
    pub const BURST_GROWTH: f32 = 1.0 / 5.0;
    /// Seconds between burst spawns are drawn from this range
    pub const BURST_INTERVAL_MIN: f64 = 5.0;
    pub const BURST_INTERVAL_MAX: f64 = 15.0;

    /// Collision overshoot factor for positional correction
    pub const PUSH_OUT_OVERSHOOT: f32 = 1.003;

    /// Free spheres spawned at round start
    pub const STARTING_SPHERES: usize = 10;

    /// Stage durations (seconds)
    pub const ROTATION_DURATION: f32 = 3.0;
    pub const RESULTS_DURATION: f32 = 5.0;
    pub const END_SCREEN_DURATION: f32 = 30.0;
    /// Seconds added to the end-screen timer per action press
    pub const END_SCREEN_SKIP: f32 = 2.0;

    /// Opening spiral parameters
    pub const OPENING_ROTATION_SPEED: f32 = 500.0; // degrees over the whole stage
    pub const OPENING_RADIUS: f32 = 0.15;

    /// Points per opponent needed to win, and required lead
    pub const POINTS_PER_OPPONENT: u32 = 5;
    pub const WINNING_LEAD: u32 = 2;

    /// Maximum player slots (one per team colour)
    pub const MAX_PLAYERS: usize = 12;

    /// Nominal frame duration for headless runs
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Signed angle (radians, [-π, π]) that rotates `from` onto `to`
#[inline]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    from.perp_dot(to).atan2(from.dot(to))
}

/// Step from `from` toward `to` by at most `max_step`, landing exactly on `to`
/// when it is within reach.
#[inline]
pub fn move_towards(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist == 0.0 {
        to
    } else {
        from + delta / dist * max_step
    }
}

/// Rescale `v` to `length`. A zero vector has no direction, so it points along +X.
#[inline]
pub fn with_length(v: Vec2, length: f32) -> Vec2 {
    let dir = v.normalize_or_zero();
    if dir == Vec2::ZERO {
        Vec2::X * length
    } else {
        dir * length
    }
}
