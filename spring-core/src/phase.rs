//! Phase state machine driving the two bodies.
//!
//! ```text
//!  PreContact ──sep ≤ L──▶ Compressing ──sep grows──▶ Locked
//!                                                       │
//!                                         t - t_lock ≥ lock_duration
//!                                                       ▼
//!        Idle ◀──|v|² < ε── Circling ◀──sep > L── Releasing
//! ```
//!
//! Transitions only ever move forward. Entering `Compressing`, `Releasing`
//! and `Circling` falls through: the tick that detects the transition
//! already runs the new phase's action.
//!
//! Maximal compression is detected by comparing against the previous
//! tick's separation. One tick of floating-point noise in an otherwise
//! shrinking separation is therefore enough to lock early. That is a
//! property of discrete detection and is kept as is.

use std::fmt;

use log::{debug, info};

use crate::config::{BoundarySide, SimulationConfig};
use crate::error::{Result, Violation};
use crate::forces::{look_direction, ForceModel};
use crate::integrator::KinematicState;
use crate::types::{constants, BodyId, BodyRole, Vec3};

/// Discrete phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Bodies approach, spring untouched
    PreContact,
    /// Spring pushes the bodies apart while they still close in
    Compressing,
    /// Latched at maximal compression; light body rides with the heavy one
    Locked,
    /// Latch opened, spring pushes until contact is lost
    Releasing,
    /// Light body is driven around a circle
    Circling,
    /// Terminal rest
    Idle,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::PreContact,
        Phase::Compressing,
        Phase::Locked,
        Phase::Releasing,
        Phase::Circling,
        Phase::Idle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::PreContact => "pre_contact",
            Phase::Compressing => "compressing",
            Phase::Locked => "locked",
            Phase::Releasing => "releasing",
            Phase::Circling => "circling",
            Phase::Idle => "idle",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Idle
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which body is light and which is heavy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    pub light: BodyId,
    pub heavy: BodyId,
}

impl Roles {
    /// Lighter body by mass; on a tie body A is the light one.
    pub fn from_masses<K: KinematicState + ?Sized>(bodies: &K) -> Self {
        let light = if bodies.mass(BodyId::B) < bodies.mass(BodyId::A) {
            BodyId::B
        } else {
            BodyId::A
        };
        Self {
            light,
            heavy: light.other(),
        }
    }

    pub fn body(&self, role: BodyRole) -> BodyId {
        match role {
            BodyRole::Light => self.light,
            BodyRole::Heavy => self.heavy,
        }
    }
}

/// Mutable bookkeeping threaded through the transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseContext {
    previous_separation: f64,
    lock_timestamp: Option<f64>,
    slowdown_coefficient: Option<f64>,
    is_turning: bool,
    turn_started: bool,
}

impl Default for PhaseContext {
    fn default() -> Self {
        Self {
            previous_separation: f64::INFINITY,
            lock_timestamp: None,
            slowdown_coefficient: None,
            is_turning: false,
            turn_started: false,
        }
    }
}

impl PhaseContext {
    /// Separation seen on the last compressing tick.
    pub fn previous_separation(&self) -> f64 {
        self.previous_separation
    }

    pub fn lock_timestamp(&self) -> Option<f64> {
        self.lock_timestamp
    }

    pub fn slowdown_coefficient(&self) -> Option<f64> {
        self.slowdown_coefficient
    }

    pub fn is_turning(&self) -> bool {
        self.is_turning
    }
}

/// A phase change, as recorded in the machine's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub time: f64,
    pub from: Phase,
    pub to: Phase,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Phase after the tick
    pub phase: Phase,
    pub separation: f64,
    /// Total force applied this tick, indexed by [`BodyId::index`]
    pub forces: [Vec3; 2],
}

/// Owns the phase and its context; decides transitions and applies forces.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    model: ForceModel,
    lock_duration: f64,
    boundary_x: f64,
    boundary_side: BoundarySide,
    stop_speed_sq: f64,
    roles: Roles,
    phase: Phase,
    ctx: PhaseContext,
    history: Vec<Transition>,
}

impl PhaseMachine {
    /// Build a machine from a validated configuration.
    pub fn new(config: &SimulationConfig, roles: Roles) -> Result<Self> {
        config.validate()?;
        let model = ForceModel::new(config.spring, config.radius, config.centripetal)?;
        Ok(Self {
            model,
            lock_duration: config.lock_duration,
            boundary_x: config.boundary_x,
            boundary_side: config.boundary_side,
            stop_speed_sq: config.stop_speed_sq,
            roles,
            phase: Phase::PreContact,
            ctx: PhaseContext::default(),
            history: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &PhaseContext {
        &self.ctx
    }

    pub fn roles(&self) -> Roles {
        self.roles
    }

    pub fn model(&self) -> &ForceModel {
        &self.model
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Back to `PreContact` with a fresh context.
    pub fn reset(&mut self) {
        self.phase = Phase::PreContact;
        self.ctx = PhaseContext::default();
        self.history.clear();
    }

    /// Gap between the facing sides of the bodies along X.
    pub fn separation<K: KinematicState + ?Sized>(bodies: &K) -> f64 {
        let left = bodies.position(BodyId::A).x + bodies.half_extent(BodyId::A);
        let right = bodies.position(BodyId::B).x - bodies.half_extent(BodyId::B);
        right - left
    }

    /// Run one tick at cumulative time `now`.
    ///
    /// A non-finite body state is reported as a [`Violation`] and nothing
    /// is applied.
    pub fn step<K: KinematicState + ?Sized>(
        &mut self,
        now: f64,
        bodies: &mut K,
    ) -> std::result::Result<StepOutcome, Violation> {
        for id in [BodyId::A, BodyId::B] {
            if !bodies.position(id).is_finite() || !bodies.velocity(id).is_finite() {
                return Err(Violation::NonFiniteState(format!(
                    "body {:?} at {} moving {}",
                    id,
                    bodies.position(id),
                    bodies.velocity(id)
                )));
            }
        }

        let separation = Self::separation(bodies);
        let mut forces = [Vec3::ZERO; 2];

        loop {
            match self.phase {
                Phase::PreContact => {
                    if self.model.spring.in_contact(separation) {
                        self.enter(Phase::Compressing, now, separation);
                        continue;
                    }
                }
                Phase::Compressing => {
                    self.apply_spring(separation, bodies, &mut forces);
                    if separation > self.ctx.previous_separation {
                        self.ctx.lock_timestamp = Some(now);
                        self.enter(Phase::Locked, now, separation);
                    } else {
                        self.ctx.previous_separation = separation;
                    }
                }
                Phase::Locked => {
                    let locked_at = self.ctx.lock_timestamp.unwrap_or(now);
                    if now - locked_at + constants::TIME_EPSILON >= self.lock_duration {
                        self.enter(Phase::Releasing, now, separation);
                        continue;
                    }
                    let carried = bodies.velocity(self.roles.heavy);
                    bodies.set_velocity(self.roles.light, carried);
                }
                Phase::Releasing => {
                    if separation > self.model.spring.rest_length {
                        self.enter(Phase::Circling, now, separation);
                        continue;
                    }
                    self.apply_spring(separation, bodies, &mut forces);
                }
                Phase::Circling => self.circle(now, separation, bodies, &mut forces),
                Phase::Idle => {}
            }
            break;
        }

        Ok(StepOutcome {
            phase: self.phase,
            separation,
            forces,
        })
    }

    fn apply_spring<K: KinematicState + ?Sized>(
        &self,
        separation: f64,
        bodies: &mut K,
        forces: &mut [Vec3; 2],
    ) {
        let (left, right) = self.model.spring_pair(separation);
        bodies.add_force(BodyId::A, left);
        bodies.add_force(BodyId::B, right);
        forces[BodyId::A.index()] += left;
        forces[BodyId::B.index()] += right;
    }

    fn circle<K: KinematicState + ?Sized>(
        &mut self,
        now: f64,
        separation: f64,
        bodies: &mut K,
        forces: &mut [Vec3; 2],
    ) {
        let light = self.roles.light;
        let mass = bodies.mass(light);
        let position = bodies.position(light);
        let velocity = bodies.velocity(light);

        if !self.ctx.turn_started && self.boundary_side.is_met(position.x, self.boundary_x) {
            let coefficient = self.model.slowdown_coefficient(mass, velocity);
            self.ctx.turn_started = true;
            self.ctx.is_turning = true;
            self.ctx.slowdown_coefficient = Some(coefficient);
            info!(
                "turn started at t={:.4}, x={:.4}, slowdown coefficient {:.6}",
                now, position.x, coefficient
            );
        }

        if !self.ctx.is_turning {
            return;
        }

        if velocity.magnitude_squared() < self.stop_speed_sq {
            bodies.set_velocity(light, Vec3::ZERO);
            self.ctx.is_turning = false;
            self.enter(Phase::Idle, now, separation);
            return;
        }

        let coefficient = self.ctx.slowdown_coefficient.unwrap_or(0.0);
        let force = self.model.turning_force(position, velocity, mass, coefficient);
        bodies.add_force(light, force);
        forces[light.index()] += force;

        if let Some(heading) = look_direction(velocity, self.model.strategy.up_axis()) {
            bodies.set_heading(light, heading);
        }
    }

    fn enter(&mut self, to: Phase, now: f64, separation: f64) {
        debug!(
            "phase {} -> {} at t={:.4} (separation {:.4})",
            self.phase, to, now, separation
        );
        self.history.push(Transition {
            time: now,
            from: self.phase,
            to,
        });
        self.phase = to;
    }
}

// =============================================================================
// Tests
// =============================================================================
