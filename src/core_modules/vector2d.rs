// THEORY:
// The `Vector2d` module is a plain 2-D value type. The detector reports each
// landmark as a normalized position, x,y in [0,1] independent of the source
// image resolution, and control code composes offsets from those positions.
// It is a "dumb" data container with value semantics: `Copy`, operator impls
// instead of mutating methods, and no hidden state.

use std::ops::{Add, Sub};

/// A 2-D vector. For landmark positions both components are normalized image
/// coordinates in [0,1] (origin at the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2d {
    /// The x component.
    pub x: f64,
    /// The y component.
    pub y: f64,
}

impl Vector2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Vector2d {
    type Output = Vector2d;

    fn add(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2d {
    type Output = Vector2d;

    fn sub(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x - other.x, self.y - other.y)
    }
}
