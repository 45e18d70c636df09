//! Collision detection and response for circular bodies
//!
//! Pure geometry and impulse math: no game rules live here. The arena is an
//! axis-aligned rectangle bounded by four walls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use crate::consts::PUSH_OUT_OVERSHOOT;

/// An infinite axis-aligned boundary line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wall {
    /// Line `x = c`
    Vertical(f32),
    /// Line `y = c`
    Horizontal(f32),
}

impl Wall {
    /// True iff the body's center lies strictly within one radius of the line
    #[inline]
    pub fn intersects(&self, body: &Body) -> bool {
        let (coord, line) = match *self {
            Wall::Vertical(x) => (body.center.x, x),
            Wall::Horizontal(y) => (body.center.y, y),
        };
        line - body.radius < coord && coord < line + body.radius
    }
}

/// The rectangular play area and its four walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub left: Wall,
    pub right: Wall,
    pub top: Wall,
    pub bottom: Wall,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            left: Wall::Vertical(0.0),
            right: Wall::Vertical(width),
            top: Wall::Horizontal(0.0),
            bottom: Wall::Horizontal(height),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Reflect a body off the first wall it touches (top, bottom, left, right)
    /// and place it flush against that wall. Returns whether it bounced.
    pub fn bounce(&self, body: &mut Body) -> bool {
        if self.top.intersects(body) {
            body.velocity.y = -body.velocity.y;
            body.center.y = body.radius;
            return true;
        }
        if self.bottom.intersects(body) {
            body.velocity.y = -body.velocity.y;
            body.center.y = self.height - body.radius;
            return true;
        }
        if self.left.intersects(body) {
            body.velocity.x = -body.velocity.x;
            body.center.x = body.radius;
            return true;
        }
        if self.right.intersects(body) {
            body.velocity.x = -body.velocity.x;
            body.center.x = self.width - body.radius;
            return true;
        }
        false
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(crate::consts::ARENA_WIDTH, crate::consts::ARENA_HEIGHT)
    }
}

/// True iff the two circles touch or overlap
#[inline]
pub fn intersects(a: &Body, b: &Body) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) <= reach * reach
}

/// True iff `inner`'s center lies within `outer`'s radius
#[inline]
pub fn contains_center(outer: &Body, inner: &Body) -> bool {
    outer.center.distance_squared(inner.center) <= outer.radius * outer.radius
}

/// Resolve an overlap between two bodies.
///
/// Both centers are pushed apart along the line joining them by half the
/// penetration depth (with a slight overshoot), then an elastic impulse is
/// exchanged along that line. The separation axis is taken from the
/// pre-correction positions, so `collide(a, b)` and `collide(b, a)` produce
/// identical results. Coincident centers separate along +X.
pub fn collide(a: &mut Body, b: &mut Body) {
    let offset = a.center - b.center;
    let dist = offset.length();
    let axis = if dist > 0.0 && dist.is_finite() {
        offset / dist
    } else {
        log::trace!("coincident bodies at {:?}, separating along +X", a.center);
        Vec2::X
    };

    let push = (a.radius + b.radius - dist) * 0.5 * PUSH_OUT_OVERSHOOT;
    a.center += axis * push;
    b.center -= axis * push;

    // Unit normal from a to b
    let n = -axis;
    let relative = a.velocity - b.velocity;
    let impulse = 2.0 * n.dot(relative) / (a.mass + b.mass);
    a.velocity -= impulse * b.mass * n;
    b.velocity += impulse * a.mass * n;
}

/// Borrow two distinct elements of a slice mutably
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
