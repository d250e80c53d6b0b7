//! The kinematic backend seam and a reference implementation.
//!
//! The phase machine never integrates anything itself. It reads masses,
//! positions and velocities through [`KinematicState`], and pushes forces
//! (and, for the coupling and stop actions, velocities) back through it. A
//! host normally implements the trait on top of whatever rigid-body engine
//! it runs.
//!
//! [`BodyPair`] is the reference backend used by the runner, the Python
//! bindings and the tests. It integrates with semi-implicit Euler:
//!
//! ```text
//! 1. v_new = v + (F / m) * dt
//! 2. x_new = x + v_new * dt
//! 3. F = 0
//! ```
//!
//! which is what fixed-step game engines do, so runs stay comparable to the
//! engine the scenario came from.

use crate::error::{Error, Result};
use crate::types::{BodyId, BodyState, Vec3};

/// Read/write access to the two bodies of the simulation.
pub trait KinematicState {
    fn mass(&self, body: BodyId) -> f64;

    fn position(&self, body: BodyId) -> Vec3;

    fn velocity(&self, body: BodyId) -> Vec3;

    /// Distance from the body's center to its face along the primary axis.
    /// Point masses have none.
    fn half_extent(&self, _body: BodyId) -> f64 {
        0.0
    }

    /// Add a force for the current step. Forces accumulate until the
    /// backend integrates.
    fn add_force(&mut self, body: BodyId, force: Vec3);

    /// Overwrite a velocity. Only used for the rigid coupling and for
    /// stopping a body.
    fn set_velocity(&mut self, body: BodyId, velocity: Vec3);

    /// Orient the body along `heading`. Backends without orientation can
    /// ignore it.
    fn set_heading(&mut self, _body: BodyId, _heading: Vec3) {}
}

// =============================================================================
// Reference backend
// =============================================================================

/// A rigid body reduced to what the simulation needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub mass: f64,
    pub half_extent: f64,
    pub state: BodyState,
    /// Force accumulated since the last integration
    pub force: Vec3,
    pub heading: Option<Vec3>,
}

impl RigidBody {
    pub fn new(mass: f64, half_extent: f64, state: BodyState) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::config("mass must be finite and > 0"));
        }
        if !half_extent.is_finite() || half_extent < 0.0 {
            return Err(Error::config("half_extent must be finite and >= 0"));
        }
        if !state.pos.is_finite() || !state.vel.is_finite() {
            return Err(Error::config("body state must be finite"));
        }
        Ok(Self {
            mass,
            half_extent,
            state,
            force: Vec3::ZERO,
            heading: None,
        })
    }

    /// A unit cube (half extent 0.5) at rest.
    pub fn cube(mass: f64, pos: Vec3) -> Result<Self> {
        Self::new(mass, 0.5, BodyState::at_rest(pos))
    }

    pub fn momentum(&self) -> Vec3 {
        self.state.vel * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.state.kinetic_energy(self.mass)
    }
}

/// Semi-implicit (symplectic) Euler.
pub struct SemiImplicitEuler;

impl SemiImplicitEuler {
    /// Advance one body state by `dt` under a constant force.
    pub fn step(state: &BodyState, force: Vec3, mass: f64, dt: f64) -> BodyState {
        let vel = state.vel + force * (dt / mass);
        let pos = state.pos + vel * dt;
        BodyState { pos, vel }
    }
}

/// Two rigid bodies stepped together.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPair {
    bodies: [RigidBody; 2],
}

impl BodyPair {
    pub fn new(a: RigidBody, b: RigidBody) -> Self {
        Self { bodies: [a, b] }
    }

    /// The lab scene: a 1 kg cube at the origin and a 2 kg cube 4 m along +X,
    /// both resting on the floor (y = 0.5).
    pub fn lab_default() -> Result<Self> {
        Ok(Self::new(
            RigidBody::cube(1.0, Vec3::new(0.0, 0.5, 0.0))?,
            RigidBody::cube(2.0, Vec3::new(4.0, 0.5, 0.0))?,
        ))
    }

    pub fn body(&self, id: BodyId) -> &RigidBody {
        &self.bodies[id.index()]
    }

    pub fn body_mut(&mut self, id: BodyId) -> &mut RigidBody {
        &mut self.bodies[id.index()]
    }

    /// Integrate both bodies by `dt` and clear the force accumulators.
    pub fn integrate(&mut self, dt: f64) {
        for body in &mut self.bodies {
            body.state = SemiImplicitEuler::step(&body.state, body.force, body.mass, dt);
            body.force = Vec3::ZERO;
        }
    }

    pub fn total_momentum(&self) -> Vec3 {
        self.bodies[0].momentum() + self.bodies[1].momentum()
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(RigidBody::kinetic_energy).sum()
    }
}

impl KinematicState for BodyPair {
    fn mass(&self, body: BodyId) -> f64 {
        self.body(body).mass
    }

    fn position(&self, body: BodyId) -> Vec3 {
        self.body(body).state.pos
    }

    fn velocity(&self, body: BodyId) -> Vec3 {
        self.body(body).state.vel
    }

    fn half_extent(&self, body: BodyId) -> f64 {
        self.body(body).half_extent
    }

    fn add_force(&mut self, body: BodyId, force: Vec3) {
        self.body_mut(body).force += force;
    }

    fn set_velocity(&mut self, body: BodyId, velocity: Vec3) {
        self.body_mut(body).state.vel = velocity;
    }

    fn set_heading(&mut self, body: BodyId, heading: Vec3) {
        self.body_mut(body).heading = Some(heading);
    }
}

// =============================================================================
// Tests
// =============================================================================
