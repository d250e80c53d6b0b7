//! # Spring Core
//!
//! Spring coupling, rigid lock and circular slowdown of two bodies on a line.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (Vec3, body ids and states, constants)
//! - `config`: YAML scenario configuration and loader
//! - `forces`: Spring, centripetal and friction force laws
//! - `integrator`: Kinematic backend trait and the semi-implicit Euler reference backend
//! - `phase`: The PreContact → Compressing → Locked → Releasing → Circling → Idle machine
//! - `recorder`: Per-tick time series
//! - `export`: Delimited text export
//! - `simulation`: Main orchestrator
//! - `oscillator`: Single-body harmonic oscillator variant
//! - `collision`: Closed-form 1-D elastic collision for cross-checks

pub mod collision;
pub mod config;
pub mod error;
pub mod export;
pub mod forces;
pub mod integrator;
pub mod oscillator;
pub mod phase;
pub mod recorder;
pub mod simulation;
pub mod types;

pub use config::{ConfigLoader, SimulationConfig};
pub use error::{Error, Result, Violation};
pub use integrator::{BodyPair, KinematicState, RigidBody};
pub use phase::{Phase, PhaseMachine};
pub use simulation::{HostLoop, Simulation};
pub use types::{BodyId, BodyRole, Vec3};
