//! Player-controlled body: free flight, dodging, orbiting rotators, and the
//! trail of captured bodies that chases the player's recent path.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Color, Rotator};
use crate::consts::*;
use crate::{move_towards, rotate, signed_angle, with_length};

/// Movement state derived from `PlayerBody::frames_since_dodge`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DodgeState {
    /// Counter at 0
    CanDodge,
    /// Counter in 1..=30: moving faster, immune to pushes and kills
    Dodging,
    /// Counter in 31..=59
    Cooldown,
}

impl DodgeState {
    pub fn from_frames(frames: u32) -> Self {
        match frames {
            0 => DodgeState::CanDodge,
            f if f <= DODGE_FRAMES => DodgeState::Dodging,
            _ => DodgeState::Cooldown,
        }
    }
}

/// Bounded history of past centers, newest first.
///
/// Capacity follows the trail: `PATH_SAMPLES_PER_MEMBER` samples per trail
/// or queue member plus one block for the player. Shrinking drops the
/// oldest samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathHistory {
    samples: VecDeque<Vec2>,
    capacity: usize,
}

impl PathHistory {
    pub fn new(start: Vec2) -> Self {
        let mut samples = VecDeque::with_capacity(PATH_SAMPLES_PER_MEMBER);
        samples.push_front(start);
        Self {
            samples,
            capacity: PATH_SAMPLES_PER_MEMBER,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample
    pub fn newest(&self) -> Option<Vec2> {
        self.samples.front().copied()
    }

    /// Oldest retained sample
    pub fn oldest(&self) -> Option<Vec2> {
        self.samples.back().copied()
    }

    pub fn push(&mut self, center: Vec2) {
        self.samples.push_front(center);
        self.samples.truncate(self.capacity);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.samples.truncate(self.capacity);
        self.samples.shrink_to(self.capacity);
    }

    /// Forget everything but `center`
    pub fn reset(&mut self, center: Vec2) {
        self.samples.clear();
        self.samples.push_front(center);
    }

    /// Lag target for the trail member at `rank` (1-based), clamped to the
    /// oldest sample
    pub fn sample(&self, rank: usize) -> Vec2 {
        let index = (rank * PATH_SAMPLES_PER_MEMBER).saturating_sub(1);
        self.samples
            .get(index)
            .or_else(|| self.samples.back())
            .copied()
            .unwrap_or(Vec2::ZERO)
    }
}

/// A player's orb and everything it drags along
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    pub body: Body,
    /// Index of the rotator currently orbited
    pub rotating_around: Option<usize>,
    /// Dodge accepted this frame, applied on the next `advance`
    pub dodge_requested: bool,
    pub frames_since_dodge: u32,
    pub path: PathHistory,
    /// Lethal followers, oldest first
    pub trail: Vec<Body>,
    /// Captured bodies still flying to the back of the trail
    pub queue_to_trail: Vec<Body>,
    /// Trail members fired by dodges
    pub attacking_spheres: Vec<Body>,
    pub alive: bool,
    /// Name of the controlling bot; `None` for a human
    pub bot: Option<String>,
}

impl PlayerBody {
    pub fn new(center: Vec2, velocity: Vec2, color: Color) -> Self {
        Self {
            body: Body::new(center, velocity, PLAYER_SIZE, color),
            rotating_around: None,
            dodge_requested: false,
            frames_since_dodge: 0,
            path: PathHistory::new(center),
            trail: Vec::new(),
            queue_to_trail: Vec::new(),
            attacking_spheres: Vec::new(),
            alive: true,
            bot: None,
        }
    }

    pub fn with_bot(mut self, name: impl Into<String>) -> Self {
        self.bot = Some(name.into());
        self
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.body.color
    }

    #[inline]
    pub fn dodge_state(&self) -> DodgeState {
        DodgeState::from_frames(self.frames_since_dodge)
    }

    #[inline]
    pub fn is_dodging(&self) -> bool {
        self.dodge_state() == DodgeState::Dodging
    }

    #[inline]
    pub fn can_dodge(&self) -> bool {
        self.frames_since_dodge == 0
    }

    #[inline]
    pub fn is_orbiting(&self) -> bool {
        self.rotating_around.is_some()
    }

    /// Index of the first rotator whose region contains this player's center
    pub fn rotator_inside(&self, rotators: &[Rotator]) -> Option<usize> {
        rotators
            .iter()
            .position(|r| super::collision::contains_center(&r.body, &self.body))
    }

    fn resize_path(&mut self) {
        let members = 1 + self.trail.len() + self.queue_to_trail.len();
        self.path.set_capacity(members * PATH_SAMPLES_PER_MEMBER);
    }

    /// Take ownership of a captured body; it joins the trail once it
    /// reaches its lag sample.
    pub fn add_to_queue(&mut self, sphere: Body) {
        self.queue_to_trail.push(sphere);
        self.resize_path();
    }

    /// Remove and return the trail member at `index`
    pub fn remove_trail_member(&mut self, index: usize) -> Body {
        let member = self.trail.remove(index);
        self.resize_path();
        member
    }

    /// Remove every trail member matching `pred`, keeping trail order
    pub fn release_trail_where(&mut self, mut pred: impl FnMut(&Body) -> bool) -> Vec<Body> {
        let (released, kept): (Vec<Body>, Vec<Body>) =
            std::mem::take(&mut self.trail).into_iter().partition(|m| pred(m));
        self.trail = kept;
        if !released.is_empty() {
            self.resize_path();
        }
        released
    }

    /// Give up the whole trail (on death)
    pub fn forfeit_trail(&mut self) -> Vec<Body> {
        let trail = std::mem::take(&mut self.trail);
        self.resize_path();
        trail
    }

    /// Try to start a dodge. Only honored from `CanDodge` while not orbiting.
    /// The oldest trail member, if any, is fired straight ahead.
    pub fn request_dodge(&mut self) -> bool {
        if !self.can_dodge() || self.is_orbiting() {
            return false;
        }
        self.dodge_requested = true;
        if !self.trail.is_empty() {
            let mut projectile = self.remove_trail_member(0);
            projectile.velocity = self.body.velocity * ATTACK_SPEED;
            projectile.damping = 1.0;
            self.attacking_spheres.push(projectile);
        }
        true
    }

    /// Advance one frame of movement, then drag the followers and record
    /// the new center.
    pub fn advance(&mut self, rotators: &[Rotator]) {
        if !self.alive {
            return;
        }

        let pivot = self
            .rotating_around
            .and_then(|i| rotators.get(i))
            .map(|r| r.body.center);

        match pivot {
            Some(pivot) => self.orbit(pivot),
            None => {
                self.rotating_around = None;
                self.fly();
            }
        }

        self.advance_followers();
        self.path.push(self.body.center);
    }

    fn fly(&mut self) {
        if self.dodge_requested {
            self.dodge_requested = false;
            self.frames_since_dodge = 1;
        } else if self.frames_since_dodge != 0 {
            self.frames_since_dodge += 1;
            if self.frames_since_dodge >= DODGE_CYCLE_FRAMES {
                self.frames_since_dodge = 0;
            }
        }

        let factor = if self.is_dodging() { DODGE_SPEED } else { 1.0 };
        self.body.center += self.body.velocity * factor;
        self.body.velocity *= self.body.damping;
    }

    /// Circle the pivot at constant linear speed, keeping the rotational
    /// sense the player had when it latched on.
    fn orbit(&mut self, pivot: Vec2) {
        self.dodge_requested = false;
        let to_pivot = pivot - self.body.center;
        let radius = to_pivot.length();
        if radius <= f32::EPSILON {
            self.body.center += self.body.velocity;
            return;
        }

        let heading = signed_angle(to_pivot, self.body.velocity);
        let step = DEFAULT_SPEED / radius;
        let (step, turn) = if heading < 0.0 {
            (step, std::f32::consts::FRAC_PI_2)
        } else {
            (-step, -std::f32::consts::FRAC_PI_2)
        };

        let arm = rotate(-to_pivot, step);
        self.body.center = pivot + arm;
        self.body.velocity = with_length(rotate(arm, turn), DEFAULT_SPEED);
    }

    fn advance_followers(&mut self) {
        let step = DEFAULT_SPEED * TRAIL_SPEED;

        for (i, member) in self.trail.iter_mut().enumerate() {
            let target = self.path.sample(i + 1);
            member.center = move_towards(member.center, target, step);
        }

        let base = self.trail.len();
        let mut arrived = Vec::new();
        for (j, member) in self.queue_to_trail.iter_mut().enumerate() {
            let target = self.path.sample(base + j + 1);
            member.center = move_towards(member.center, target, step);
            if member.center == target {
                arrived.push(j);
            }
        }

        if arrived.is_empty() {
            return;
        }
        let mut joined = Vec::with_capacity(arrived.len());
        for &j in arrived.iter().rev() {
            joined.push(self.queue_to_trail.remove(j));
        }
        for mut member in joined.into_iter().rev() {
            member.color = self.body.color;
            self.trail.push(member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::WHITE;

    fn player_at(x: f32, y: f32) -> PlayerBody {
        PlayerBody::new(Vec2::new(x, y), Vec2::new(DEFAULT_SPEED, 0.0), [255, 90, 40])
    }

    fn sphere_at(x: f32, y: f32) -> Body {
        Body::at_rest(Vec2::new(x, y), SPHERE_SIZE, WHITE)
    }

    #[test]
    fn test_dodge_cadence() {
        let mut player = player_at(0.5, 0.5);
        let mut states = Vec::new();
        for _ in 0..=60 {
            states.push(player.dodge_state());
            player.request_dodge();
            player.advance(&[]);
        }

        assert_eq!(states[0], DodgeState::CanDodge);
        assert!(states[1..=30].iter().all(|s| *s == DodgeState::Dodging));
        assert!(states[31..=59].iter().all(|s| *s == DodgeState::Cooldown));
        assert_eq!(states[60], DodgeState::CanDodge);
    }

    #[test]
    fn test_dodge_moves_faster() {
        let mut plain = player_at(0.5, 0.5);
        let mut dodger = player_at(0.5, 0.5);
        assert!(dodger.request_dodge());
        plain.advance(&[]);
        dodger.advance(&[]);
        let plain_step = plain.body.center.x - 0.5;
        let dodge_step = dodger.body.center.x - 0.5;
        assert!((dodge_step - plain_step * DODGE_SPEED).abs() < 1e-6);
    }

    #[test]
    fn test_dodge_refused_while_cooling_or_orbiting() {
        let mut player = player_at(0.5, 0.5);
        player.frames_since_dodge = 40;
        assert!(!player.request_dodge());

        let mut orbiter = player_at(0.5, 0.5);
        orbiter.rotating_around = Some(0);
        assert!(!orbiter.request_dodge());
    }

    #[test]
    fn test_dodge_fires_oldest_trail_member() {
        let mut player = player_at(0.5, 0.5);
        player.trail.push(sphere_at(0.4, 0.5));
        player.trail.push(sphere_at(0.3, 0.5));
        assert!(player.request_dodge());
        assert_eq!(player.trail.len(), 1);
        assert_eq!(player.attacking_spheres.len(), 1);
        let fired = &player.attacking_spheres[0];
        assert_eq!(fired.center, Vec2::new(0.4, 0.5));
        assert_eq!(fired.velocity, Vec2::new(DEFAULT_SPEED * ATTACK_SPEED, 0.0));
        assert_eq!(fired.damping, 1.0);
    }

    #[test]
    fn test_path_capacity_tracks_trail() {
        let mut player = player_at(0.5, 0.5);
        assert_eq!(player.path.capacity(), PATH_SAMPLES_PER_MEMBER);
        player.add_to_queue(sphere_at(1.0, 0.5));
        player.add_to_queue(sphere_at(1.2, 0.5));
        assert_eq!(player.path.capacity(), 3 * PATH_SAMPLES_PER_MEMBER);

        for _ in 0..100 {
            player.advance(&[]);
        }
        assert_eq!(player.path.len(), player.path.capacity());
    }

    #[test]
    fn test_path_shrink_drops_oldest() {
        let mut path = PathHistory::new(Vec2::ZERO);
        path.set_capacity(5);
        for i in 1..5 {
            path.push(Vec2::new(i as f32, 0.0));
        }
        assert_eq!(path.len(), 5);
        path.set_capacity(2);
        assert_eq!(path.newest(), Some(Vec2::new(4.0, 0.0)));
        assert_eq!(path.oldest(), Some(Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_queue_graduates_on_arrival() {
        let mut player = player_at(0.5, 0.5);
        // Already sitting on the oldest path sample: arrives immediately
        player.add_to_queue(sphere_at(0.5, 0.5));
        player.advance(&[]);
        assert!(player.queue_to_trail.is_empty());
        assert_eq!(player.trail.len(), 1);
        assert_eq!(player.trail[0].color, player.color());

        // Far away: stays queued and closes in at trail speed
        player.add_to_queue(sphere_at(1.5, 0.5));
        player.advance(&[]);
        assert_eq!(player.queue_to_trail.len(), 1);
        let left = player.queue_to_trail[0].center.x;
        assert!((1.5 - left - DEFAULT_SPEED * TRAIL_SPEED).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_keeps_radius_and_speed() {
        let rotators = [Rotator::new(Vec2::new(1.0, 0.5), ROTATOR_SIZE)];
        let mut player = PlayerBody::new(
            Vec2::new(1.1, 0.5),
            Vec2::new(0.0, DEFAULT_SPEED),
            [255, 90, 40],
        );
        player.rotating_around = Some(0);
        for _ in 0..50 {
            player.advance(&rotators);
            let r = player.body.center.distance(rotators[0].body.center);
            assert!((r - 0.1).abs() < 1e-4);
            assert!((player.body.velocity.length() - DEFAULT_SPEED).abs() < 1e-6);
        }
        // Started moving +y from the +x side: counter-clockwise
        assert!(player.body.center.y > 0.5);
    }

    #[test]
    fn test_orbit_with_missing_rotator_falls_back_to_flight() {
        let mut player = player_at(0.5, 0.5);
        player.rotating_around = Some(7);
        player.advance(&[]);
        assert_eq!(player.rotating_around, None);
        assert!((player.body.center.x - (0.5 + DEFAULT_SPEED)).abs() < 1e-6);
    }

    #[test]
    fn test_dead_player_does_not_move() {
        let mut player = player_at(0.5, 0.5);
        player.alive = false;
        player.advance(&[]);
        assert_eq!(player.body.center, Vec2::new(0.5, 0.5));
    }
}
