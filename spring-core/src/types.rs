//! Core types for the two-body spring simulation.
//!
//! All units are SI:
//! - Position: meters (m)
//! - Velocity: meters per second (m/s)
//! - Mass: kilograms (kg)
//! - Force: Newtons (N)
//! - Time: seconds (s)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

// =============================================================================
// Vec3 - 3D Vector
// =============================================================================

/// A 3D vector used for positions, velocities and forces.
///
/// Coordinate system:
/// - X: primary axis, along which the two bodies approach each other
/// - Y: vertical (positive upward)
/// - Z: horizontal, perpendicular to the primary axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// World up axis.
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector along the primary axis only.
    pub const fn along_x(x: f64) -> Self {
        Self { x, y: 0.0, z: 0.0 }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length) of the vector
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or zero if magnitude is zero
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag < constants::EPSILON {
            Self::ZERO
        } else {
            *self / mag
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Remove the component along `axis` (which need not be normalized).
    pub fn reject_from(&self, axis: &Self) -> Self {
        let axis_sq = axis.magnitude_squared();
        if axis_sq < constants::EPSILON {
            *self
        } else {
            *self - *axis * (self.dot(axis) / axis_sq)
        }
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// =============================================================================
// Bodies
// =============================================================================

/// Index of one of the two simulated bodies.
///
/// `A` sits on the -X side of the spring, `B` on the +X side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyId {
    A,
    B,
}

impl BodyId {
    pub fn other(self) -> Self {
        match self {
            BodyId::A => BodyId::B,
            BodyId::B => BodyId::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            BodyId::A => 0,
            BodyId::B => 1,
        }
    }
}

/// Role of a body once masses are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRole {
    Light,
    Heavy,
}

/// Kinematic state of a body at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub pos: Vec3,
    pub vel: Vec3,
}

impl BodyState {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Self { pos, vel }
    }

    pub fn at_rest(pos: Vec3) -> Self {
        Self { pos, vel: Vec3::ZERO }
    }

    /// Translational kinetic energy for the given mass.
    pub fn kinetic_energy(&self, mass: f64) -> f64 {
        0.5 * mass * self.vel.magnitude_squared()
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::at_rest(Vec3::ZERO)
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

pub mod constants {
    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-10;

    /// Tolerance for comparisons against accumulated simulation time (s)
    pub const TIME_EPSILON: f64 = 1e-9;

    /// Below this squared speed (m²/s²) a circling body counts as stopped
    pub const STOP_SPEED_SQ: f64 = 1e-3;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a - b, Vec3::new(-3.0, -3.0, -3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(a.dot(&b), 32.0);
    }

    #[test]
    fn test_vec3_cross_product() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let z = x.cross(&Vec3::UP);
        assert!(z.x.abs() < 1e-10);
        assert!(z.y.abs() < 1e-10);
        assert!((z.z - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_vec3_normalized_zero_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let n = Vec3::new(3.0, 4.0, 0.0).normalized();
        assert!((n.magnitude() - 1.0).abs() < 1e-10);
        assert!((n.x - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_reject_from_removes_axis_component() {
        let v = Vec3::new(2.0, 3.0, -1.0);
        let flat = v.reject_from(&Vec3::UP);
        assert_eq!(flat, Vec3::new(2.0, 0.0, -1.0));
    }

    #[test]
    fn test_body_id_other() {
        assert_eq!(BodyId::A.other(), BodyId::B);
        assert_eq!(BodyId::B.other().index(), 0);
    }

    #[test]
    fn test_kinetic_energy() {
        let s = BodyState::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((s.kinetic_energy(2.0) - 25.0).abs() < 1e-12);
    }
}
