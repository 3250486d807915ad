//! Math types used across the rasterizer.
//!
//! Re-exports [`glam`] so downstream crates agree on one vector and matrix
//! implementation.
//!
//! ```
//! use strata_core::math::{Mat4, Vec2, Vec3};
//!
//! let m = Mat4::from_translation(Vec3::new(10.0, 5.0, 0.0));
//! let p = m.transform_point3(Vec3::new(1.0, 1.0, 0.0));
//! assert_eq!(Vec2::new(p.x, p.y), Vec2::new(11.0, 6.0));
//! ```

pub use glam::*;

/// Cross product of two 2D vectors (z component of the 3D cross product).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Orientation of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The points turn left (positive signed area).
    CounterClockwise,
    /// The points turn right (negative signed area).
    Clockwise,
    /// The points lie on one line.
    Linear,
}

/// Cross products smaller than this are treated as colinear.
pub const ORIENTATION_TOLERANCE: f32 = 0.001;

/// Classify the turn `p0 -> p1 -> p2`.
pub fn orientation(p0: Vec2, p1: Vec2, p2: Vec2) -> Orientation {
    let c = cross(p1 - p0, p2 - p1);
    // NaN lands here as well
    if !(c.abs() > ORIENTATION_TOLERANCE) {
        Orientation::Linear
    } else if c > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(orientation(a, b, Vec2::new(10.0, 10.0)), Orientation::CounterClockwise);
        assert_eq!(orientation(a, b, Vec2::new(10.0, -10.0)), Orientation::Clockwise);
        assert_eq!(orientation(a, b, Vec2::new(20.0, 0.0)), Orientation::Linear);
    }

    #[test]
    fn test_cross_sign() {
        assert_eq!(cross(Vec2::X, Vec2::Y), 1.0);
        assert_eq!(cross(Vec2::Y, Vec2::X), -1.0);
    }
}
