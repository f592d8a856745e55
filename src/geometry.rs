//! Distance helpers shared by every effect.
//!
//! Euclidean distance is the only proximity predicate the engine uses.

use glam::Vec2;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Squared distance, for comparisons that don't need the root.
#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    a.distance_squared(b)
}

/// Whether `b` lies within `radius` of `a` (inclusive).
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    radius >= 0.0 && distance_squared(a, b) <= radius * radius
}
