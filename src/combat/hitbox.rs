//! Circle-overlap hit detection.
//!
//! The presentation layer owns positions; it hands the core two circles and
//! asks whether a projectile touched a target before calling the resolver.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub const fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        circles_overlap(self, other)
    }
}

/// `distance(a, b) < a.radius + b.radius`, strict: touching edges do not hit.
/// Compared squared to avoid the sqrt.
pub fn circles_overlap(a: &Circle, b: &Circle) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let reach = a.radius + b.radius;
    if !(reach > 0.0) {
        return false;
    }
    dx * dx + dy * dy < reach * reach
}
