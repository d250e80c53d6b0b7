//! Forces acting on the two bodies.
//!
//! Everything here is pure: inputs are the current kinematic quantities and
//! model parameters, the output is a force. Applying the force is left to
//! the phase machine.
//!
//! - **Spring**: Hooke's law along the primary axis, push-apart positive
//! - **Centripetal**: keeps the light body on a circle of fixed radius
//! - **Friction**: constant-magnitude drag opposing the motion
//!
//! ## Circular phase
//!
//! ```text
//!            pivot ●
//!                  ↑  F_c = m |v|² / R
//!                  │
//!      ←───────────●  body, velocity pointing left
//!    F_f           │
//! ```
//!
//! The friction magnitude (the *slowdown coefficient*) is fixed when the
//! turn starts: `c = m |v₀|² / (R π)`. A constant friction of that size
//! removes the initial kinetic energy over an arc of length `πR/2`, so the
//! body comes to rest after roughly a quarter circle.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{constants, Vec3};

// =============================================================================
// Spring
// =============================================================================

/// Linear spring between the two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringModel {
    /// Separation at which the spring starts to push (m)
    pub rest_length: f64,
    /// Spring constant (N/m)
    pub stiffness: f64,
}

impl Default for SpringModel {
    fn default() -> Self {
        Self {
            rest_length: 1.0,
            stiffness: 10.0,
        }
    }
}

impl SpringModel {
    pub fn new(rest_length: f64, stiffness: f64) -> Result<Self> {
        let spring = Self {
            rest_length,
            stiffness,
        };
        spring.validate()?;
        Ok(spring)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rest_length.is_finite() || self.rest_length < 0.0 {
            return Err(Error::config("spring rest_length must be finite and >= 0"));
        }
        if !self.stiffness.is_finite() || self.stiffness < 0.0 {
            return Err(Error::config("spring stiffness must be finite and >= 0"));
        }
        Ok(())
    }

    /// Force for the given separation; see [`spring_force`].
    pub fn force(&self, separation: f64) -> f64 {
        spring_force(separation, self.rest_length, self.stiffness)
    }

    /// True once the bodies are close enough to touch the spring.
    pub fn in_contact(&self, separation: f64) -> bool {
        separation <= self.rest_length
    }
}

/// Hooke's law: `F = k (L - d)`.
///
/// Positive means the spring pushes the bodies apart. The body on the -X
/// side receives `-F`, the body on the +X side `+F`.
pub fn spring_force(separation: f64, spring_length: f64, stiffness: f64) -> f64 {
    stiffness * (spring_length - separation)
}

// =============================================================================
// Circular motion
// =============================================================================

/// How the direction of the centripetal force is derived.
///
/// The two strategies agree while the body moves in the plane orthogonal
/// to `up` at the pivot's height. They diverge as soon as the motion leaves
/// that plane: `CrossUp` stays horizontal and only depends on the velocity,
/// `RadialPivot` points straight at the pivot and therefore picks up a
/// vertical component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentripetalStrategy {
    /// Direction `normalize(v × up)`: a right turn seen from `+up`.
    CrossUp { up: Vec3 },
    /// Direction `-normalize(position - pivot)`: toward a fixed pivot.
    RadialPivot { pivot: Vec3 },
}

impl Default for CentripetalStrategy {
    fn default() -> Self {
        CentripetalStrategy::RadialPivot {
            pivot: Vec3::new(5.0, 0.5, -4.0),
        }
    }
}

impl CentripetalStrategy {
    pub fn validate(&self) -> Result<()> {
        match self {
            CentripetalStrategy::CrossUp { up } => {
                if !up.is_finite() || up.magnitude_squared() < constants::EPSILON {
                    return Err(Error::config("cross_up axis must be finite and non-zero"));
                }
            }
            CentripetalStrategy::RadialPivot { pivot } => {
                if !pivot.is_finite() {
                    return Err(Error::config("radial_pivot pivot must be finite"));
                }
            }
        }
        Ok(())
    }

    /// Axis treated as "up" when computing headings.
    pub fn up_axis(&self) -> Vec3 {
        match self {
            CentripetalStrategy::CrossUp { up } => *up,
            CentripetalStrategy::RadialPivot { .. } => Vec3::UP,
        }
    }

    /// Unit direction of the centripetal force, zero when undefined.
    pub fn direction(&self, position: Vec3, velocity: Vec3) -> Vec3 {
        match self {
            CentripetalStrategy::CrossUp { up } => velocity.cross(up).normalized(),
            CentripetalStrategy::RadialPivot { pivot } => -(position - *pivot).normalized(),
        }
    }
}

/// Centripetal force `m |v|² / R` along the strategy's direction.
pub fn centripetal_force(
    strategy: &CentripetalStrategy,
    position: Vec3,
    velocity: Vec3,
    radius: f64,
    mass: f64,
) -> Vec3 {
    let magnitude = mass * velocity.magnitude_squared() / radius;
    strategy.direction(position, velocity) * magnitude
}

/// Friction of constant magnitude opposing the velocity. Zero at rest.
pub fn friction_force(velocity: Vec3, slowdown_coefficient: f64) -> Vec3 {
    velocity.normalized() * (-slowdown_coefficient)
}

/// Friction magnitude frozen at the start of the turn: `m |v|² / (R π)`.
pub fn slowdown_coefficient(mass: f64, velocity: Vec3, radius: f64) -> f64 {
    mass * velocity.magnitude_squared() / (radius * PI)
}

/// Heading of a body: its velocity flattened onto the plane orthogonal to
/// `up`, normalized. `None` while it has no horizontal motion.
pub fn look_direction(velocity: Vec3, up: Vec3) -> Option<Vec3> {
    let flat = velocity.reject_from(&up);
    if flat.magnitude_squared() < constants::EPSILON {
        None
    } else {
        Some(flat.normalized())
    }
}

// =============================================================================
// Force model
// =============================================================================

/// Bundles the parameters the phase machine needs to compute forces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceModel {
    pub spring: SpringModel,
    pub radius: f64,
    pub strategy: CentripetalStrategy,
}

impl ForceModel {
    pub fn new(spring: SpringModel, radius: f64, strategy: CentripetalStrategy) -> Result<Self> {
        spring.validate()?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::config("radius must be finite and > 0"));
        }
        strategy.validate()?;
        Ok(Self {
            spring,
            radius,
            strategy,
        })
    }

    /// Spring forces for the (-X side, +X side) bodies.
    pub fn spring_pair(&self, separation: f64) -> (Vec3, Vec3) {
        let f = self.spring.force(separation);
        (Vec3::along_x(-f), Vec3::along_x(f))
    }

    /// Net force on a turning body: centripetal plus friction.
    pub fn turning_force(
        &self,
        position: Vec3,
        velocity: Vec3,
        mass: f64,
        slowdown_coefficient: f64,
    ) -> Vec3 {
        centripetal_force(&self.strategy, position, velocity, self.radius, mass)
            + friction_force(velocity, slowdown_coefficient)
    }

    pub fn slowdown_coefficient(&self, mass: f64, velocity: Vec3) -> f64 {
        slowdown_coefficient(mass, velocity, self.radius)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn radial() -> CentripetalStrategy {
        CentripetalStrategy::RadialPivot {
            pivot: Vec3::new(0.0, 0.0, -5.0),
        }
    }

    #[test]
    fn test_spring_force_sign() {
        // Compressed: pushes apart
        assert!((spring_force(1.5, 2.0, 10.0) - 5.0).abs() < 1e-12);
        // At rest length: nothing
        assert_eq!(spring_force(2.0, 2.0, 10.0), 0.0);
        // Stretched: pulls together
        assert!(spring_force(3.0, 2.0, 10.0) < 0.0);
    }

    #[test]
    fn test_spring_pair_equal_and_opposite() {
        let model = ForceModel::new(SpringModel::new(2.0, 10.0).unwrap(), 5.0, radial()).unwrap();
        for d in [0.1, 0.5, 1.0, 1.75, 2.0, 2.5] {
            let (a, b) = model.spring_pair(d);
            assert_eq!(a, -b, "forces must cancel at separation {}", d);
            assert_eq!(a.y, 0.0);
            assert_eq!(a.z, 0.0);
        }
    }

    #[test]
    fn test_spring_model_rejects_negative_stiffness() {
        let err = SpringModel::new(1.0, -1.0).unwrap_err();
        assert!(err.to_string().contains("stiffness"));
        assert!(SpringModel::new(-0.1, 1.0).is_err());
    }

    #[test]
    fn test_force_model_rejects_bad_radius() {
        assert!(ForceModel::new(SpringModel::default(), 0.0, radial()).is_err());
        assert!(ForceModel::new(SpringModel::default(), -2.0, radial()).is_err());
        assert!(ForceModel::new(SpringModel::default(), f64::NAN, radial()).is_err());
    }

    #[test]
    fn test_slowdown_coefficient_value() {
        let c = slowdown_coefficient(1.0, Vec3::new(2.0, 0.0, 0.0), 5.0);
        assert!((c - 4.0 / (5.0 * PI)).abs() < 1e-12);
        assert!((c - 0.2546).abs() < 1e-4);
    }

    #[test]
    fn test_centripetal_magnitude() {
        // m=2, v=3, R=5 => 2*9/5 = 3.6
        let f = centripetal_force(
            &radial(),
            Vec3::ZERO,
            Vec3::new(3.0, 0.0, 0.0),
            5.0,
            2.0,
        );
        assert!((f.magnitude() - 3.6).abs() < 1e-12);
        // Points toward the pivot at -Z
        assert!(f.z < 0.0);
    }

    #[test]
    fn test_cross_up_is_perpendicular_and_horizontal() {
        let strategy = CentripetalStrategy::CrossUp { up: Vec3::UP };
        let v = Vec3::new(-2.0, 0.0, 1.0);
        let dir = strategy.direction(Vec3::ZERO, v);
        assert!(dir.dot(&v).abs() < 1e-12);
        assert!(dir.y.abs() < 1e-12);
        assert!((dir.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_strategies_agree_in_plane() {
        // Body at (0, 0, 0) moving -X, pivot at -Z: both turn toward -Z
        let v = Vec3::new(-1.0, 0.0, 0.0);
        let cross = CentripetalStrategy::CrossUp { up: Vec3::UP }.direction(Vec3::ZERO, v);
        let pivot = radial().direction(Vec3::ZERO, v);
        assert!((cross - pivot).magnitude() < 1e-12);
    }

    #[test]
    fn test_strategies_diverge_off_plane() {
        // Same situation, but the body sits one meter above the pivot plane
        let v = Vec3::new(-1.0, 0.0, 0.0);
        let pos = Vec3::new(0.0, 1.0, 0.0);
        let cross = CentripetalStrategy::CrossUp { up: Vec3::UP }.direction(pos, v);
        let pivot = radial().direction(pos, v);
        assert!(cross.y.abs() < 1e-12);
        assert!(pivot.y < 0.0, "radial direction should tilt toward the pivot");
        assert!((cross - pivot).magnitude() > 1e-3);
    }

    #[test]
    fn test_friction_opposes_motion() {
        let f = friction_force(Vec3::new(0.0, 0.0, 4.0), 0.5);
        assert!((f.z + 0.5).abs() < 1e-12);
        assert_eq!(friction_force(Vec3::ZERO, 0.5), Vec3::ZERO);
    }

    #[test]
    fn test_look_direction() {
        let dir = look_direction(Vec3::new(3.0, 7.0, 4.0), Vec3::UP).unwrap();
        assert!((dir.x - 0.6).abs() < 1e-12);
        assert_eq!(dir.y, 0.0);
        assert!((dir.z - 0.8).abs() < 1e-12);
        assert!(look_direction(Vec3::new(0.0, 2.0, 0.0), Vec3::UP).is_none());
    }
}
