//! Circular bodies: the shared physical record plus the stationary
//! attractor (rotator) and timed absorber (burst) variants.
//!
//! Variants compose a `Body` rather than extend it, so physics code only
//! ever sees `&mut Body` while game rules live on the owning variant.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// RGB colour
pub type Color = [u8; 3];

pub const WHITE: Color = [255, 255, 255];
pub const ROTATOR_COLOR: Color = [51, 51, 51];
pub const CORE_COLOR: Color = [100, 100, 100];

/// Team colours, one per player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Red,
    Green,
    Blue,
    DarkRed,
    DarkGreen,
    Yellow,
    Pink,
    Sky,
    Purple,
    Orange,
    Brown,
    Indigo,
}

impl Team {
    /// All teams in slot order
    pub const ALL: [Team; MAX_PLAYERS] = [
        Team::Red,
        Team::Green,
        Team::Blue,
        Team::DarkRed,
        Team::DarkGreen,
        Team::Yellow,
        Team::Pink,
        Team::Sky,
        Team::Purple,
        Team::Orange,
        Team::Brown,
        Team::Indigo,
    ];

    pub fn color(&self) -> Color {
        match self {
            Team::Red => [255, 90, 40],
            Team::Green => [40, 255, 40],
            Team::Blue => [63, 80, 255],
            Team::DarkRed => [190, 0, 0],
            Team::DarkGreen => [25, 93, 42],
            Team::Yellow => [255, 255, 40],
            Team::Pink => [255, 40, 255],
            Team::Sky => [40, 255, 255],
            Team::Purple => [142, 70, 172],
            Team::Orange => [255, 130, 1],
            Team::Brown => [128, 64, 64],
            Team::Indigo => [70, 0, 148],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Green => "Green",
            Team::Blue => "Blue",
            Team::DarkRed => "Dark red",
            Team::DarkGreen => "Dark green",
            Team::Yellow => "Yellow",
            Team::Pink => "Pink",
            Team::Sky => "Sky",
            Team::Purple => "Purple",
            Team::Orange => "Orange",
            Team::Brown => "Brown",
            Team::Indigo => "Indigo",
        }
    }

    /// Look up a team by its colour
    pub fn from_color(color: Color) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.color() == color)
    }
}

/// A circular physical body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub center: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color,
    pub mass: f32,
    /// Velocity multiplier applied every frame (1.0 = no decay)
    pub damping: f32,
}

impl Body {
    pub fn new(center: Vec2, velocity: Vec2, radius: f32, color: Color) -> Self {
        Self {
            center,
            velocity,
            radius,
            color,
            mass: 1.0,
            damping: 1.0,
        }
    }

    /// A motionless body
    pub fn at_rest(center: Vec2, radius: f32, color: Color) -> Self {
        Self::new(center, Vec2::ZERO, radius, color)
    }

    /// Advance one frame: move by velocity, then decay velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.center += self.velocity;
        self.velocity *= self.damping;
    }
}

/// Stationary attractor a player can latch onto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub body: Body,
    /// Decorative concentric core
    pub core: Body,
}

impl Rotator {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            body: Body::at_rest(center, radius, ROTATOR_COLOR),
            core: Body::at_rest(center, radius * ROTATOR_CORE_RATIO, CORE_COLOR),
        }
    }
}

/// Timed absorber. Spawns idle; the first player to touch it becomes its
/// owner, after which it grows for a fixed number of frames and vacuums
/// everything it overlaps into the owner's trail queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub body: Body,
    pub inner: Body,
    /// Radius gained per active frame
    pub growth: f32,
    pub alive: bool,
    pub active: bool,
    /// Owning player slot once activated
    pub active_player: Option<usize>,
    pub frames_since_activation: u32,
    pub frames_since_spawn: u32,
}

impl Burst {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            body: Body::at_rest(center, radius, WHITE),
            inner: Body::at_rest(center, radius * BURST_INNER_RATIO, CORE_COLOR),
            growth: radius * BURST_GROWTH,
            alive: true,
            active: false,
            active_player: None,
            frames_since_activation: 0,
            frames_since_spawn: 0,
        }
    }

    /// Bind the burst to `owner`. Returns false (and changes nothing) when
    /// it is already active.
    pub fn activate(&mut self, owner: usize) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.active_player = Some(owner);
        true
    }

    /// Whether this burst should absorb objects this frame
    #[inline]
    pub fn is_absorbing(&self) -> bool {
        self.alive && self.active
    }

    /// Advance the lifecycle by one frame
    pub fn advance(&mut self) {
        if !self.alive {
            return;
        }
        self.body.integrate();
        self.inner.center = self.body.center;
        self.frames_since_spawn += 1;

        if self.active {
            self.body.radius += self.growth;
            self.inner.radius += self.growth;
            self.frames_since_activation += 1;
            if self.frames_since_activation >= BURST_ACTIVE_FRAMES {
                self.alive = false;
            }
        } else if self.frames_since_spawn >= BURST_IDLE_FRAMES {
            self.alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_applies_damping_after_move() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.1, WHITE);
        body.damping = 0.5;
        body.integrate();
        assert_eq!(body.center, Vec2::new(1.0, 0.0));
        assert_eq!(body.velocity, Vec2::new(0.5, 0.0));
        body.integrate();
        assert_eq!(body.center, Vec2::new(1.5, 0.0));
    }

    #[test]
    fn test_idle_burst_dies_on_frame_1200() {
        let mut burst = Burst::new(Vec2::new(1.0, 0.5), BURST_SIZE);
        for _ in 0..BURST_IDLE_FRAMES - 1 {
            burst.advance();
        }
        assert!(burst.alive);
        burst.advance();
        assert!(!burst.alive);
        assert_eq!(burst.frames_since_spawn, BURST_IDLE_FRAMES);
    }

    #[test]
    fn test_active_burst_grows_40_frames_then_dies() {
        let mut burst = Burst::new(Vec2::new(1.0, 0.5), BURST_SIZE);
        for _ in 0..100 {
            burst.advance();
        }
        assert!(burst.activate(3));
        assert!(!burst.activate(1), "re-activation is a no-op");
        assert_eq!(burst.active_player, Some(3));

        for _ in 0..BURST_ACTIVE_FRAMES - 1 {
            burst.advance();
        }
        assert!(burst.alive);
        burst.advance();
        assert!(!burst.alive);

        let grown = burst.body.radius;
        let expected = BURST_SIZE + BURST_SIZE * BURST_GROWTH * BURST_ACTIVE_FRAMES as f32;
        assert!((grown - expected).abs() < 1e-5);

        // Dead bursts no longer grow
        burst.advance();
        assert_eq!(burst.body.radius, grown);
    }

    #[test]
    fn test_team_colors_roundtrip() {
        for team in Team::ALL {
            assert_eq!(Team::from_color(team.color()), Some(team));
        }
    }
}
