//! Python bindings for the spring-core simulation.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from spring_physics import Simulation
//!
//! sim = Simulation()
//! while sim.phase() != "idle" and sim.time < 60.0:
//!     sim.step(0.02)
//!     print(sim.phase(), sim.light_velocity().x, sim.separation())
//!
//! sim.export_csv("time_series.csv")
//! ```

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use spring_core::integrator::KinematicState;
use spring_core::phase::PhaseMachine;
use spring_core::{BodyPair, Error as CoreError, HostLoop, SimulationConfig, Vec3 as CoreVec3};

fn to_py_err(err: CoreError) -> PyErr {
    match err {
        CoreError::Io(e) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// 3D vector for positions, velocities, etc.
#[pyclass]
#[derive(Clone, Copy)]
pub struct Vec3 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
    #[pyo3(get, set)]
    pub z: f64,
}

#[pymethods]
impl Vec3 {
    #[new]
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn __repr__(&self) -> String {
        format!("Vec3({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }

    fn magnitude(&self) -> f64 {
        CoreVec3::from(*self).magnitude()
    }

    fn to_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

impl From<CoreVec3> for Vec3 {
    fn from(v: CoreVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3> for CoreVec3 {
    fn from(v: Vec3) -> Self {
        CoreVec3::new(v.x, v.y, v.z)
    }
}

/// The two-body lab scene driven by the phase machine.
///
/// Advancing a step runs the phase machine, then integrates the bodies.
#[pyclass]
pub struct Simulation {
    config: SimulationConfig,
    host: HostLoop,
}

fn fresh_host(config: &SimulationConfig) -> PyResult<HostLoop> {
    let bodies = BodyPair::lab_default().map_err(to_py_err)?;
    HostLoop::new(config.clone(), bodies).map_err(to_py_err)
}

#[pymethods]
impl Simulation {
    /// Create a simulation from an optional YAML scenario string.
    #[new]
    #[pyo3(signature = (config_yaml=None))]
    fn new(config_yaml: Option<&str>) -> PyResult<Self> {
        let config = match config_yaml {
            Some(yaml) => SimulationConfig::from_yaml_str(yaml).map_err(to_py_err)?,
            None => SimulationConfig::default(),
        };
        let host = fresh_host(&config)?;
        Ok(Self { config, host })
    }

    /// Cumulative simulation time in seconds.
    #[getter]
    fn time(&self) -> f64 {
        self.host.simulation.time()
    }

    /// Current phase name in snake_case: "pre_contact", "compressing",
    /// "locked", "releasing", "circling" or "idle".
    fn phase(&self) -> String {
        self.host.simulation.phase().name().to_string()
    }

    fn light_velocity(&self) -> Option<Vec3> {
        let roles = self.host.simulation.roles()?;
        Some(self.host.bodies.velocity(roles.light).into())
    }

    fn heavy_velocity(&self) -> Option<Vec3> {
        let roles = self.host.simulation.roles()?;
        Some(self.host.bodies.velocity(roles.heavy).into())
    }

    fn heavy_position(&self) -> Option<Vec3> {
        let roles = self.host.simulation.roles()?;
        Some(self.host.bodies.position(roles.heavy).into())
    }

    /// Gap between the facing edges of the two bodies along X.
    fn separation(&self) -> f64 {
        PhaseMachine::separation(&self.host.bodies)
    }

    /// Frozen friction coefficient, once the turn has started.
    fn slowdown_coefficient(&self) -> Option<f64> {
        self.host
            .simulation
            .context()
            .and_then(|ctx| ctx.slowdown_coefficient())
    }

    /// Message of the most recent skipped tick, if any.
    fn last_violation(&self) -> Option<String> {
        self.host
            .simulation
            .last_violation()
            .map(|v| v.to_string())
    }

    /// Number of recorded samples.
    fn sample_count(&self) -> usize {
        self.host.simulation.series().len()
    }

    /// Phase changes as (time, from, to).
    fn transitions(&self) -> Vec<(f64, String, String)> {
        self.host
            .simulation
            .transitions()
            .iter()
            .map(|t| (t.time, t.from.name().to_string(), t.to.name().to_string()))
            .collect()
    }

    /// Restart from the initial scene.
    fn reset(&mut self) -> PyResult<()> {
        self.host = fresh_host(&self.config)?;
        Ok(())
    }

    /// Advance by dt seconds. Returns the phase name (as `phase()`) after the tick.
    fn step(&mut self, dt: f64) -> String {
        self.host.step(dt).name().to_string()
    }

    /// Run multiple steps at once (more efficient).
    fn step_n(&mut self, dt: f64, steps: usize) -> String {
        for _ in 0..steps {
            self.host.step(dt);
        }
        self.phase()
    }

    /// Step until Idle or `max_steps`. Returns the number of steps taken.
    #[pyo3(signature = (dt, max_steps=100_000))]
    fn run_until_idle(&mut self, dt: f64, max_steps: usize) -> usize {
        self.host.run_until_idle(dt, max_steps)
    }

    /// Write the recorded series as CSV. Returns the number of rows.
    fn export_csv(&self, path: &str) -> PyResult<usize> {
        self.host
            .simulation
            .shutdown_to_file(path)
            .map_err(to_py_err)
    }

    /// Get current state as dict for easy inspection.
    fn state_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        let dict = PyDict::new(py);
        dict.set_item("time", self.time())?;
        dict.set_item("phase", self.phase())?;
        dict.set_item("separation", self.separation())?;
        if let Some(v) = self.light_velocity() {
            dict.set_item("light_vx", v.x)?;
        }
        if let Some(v) = self.heavy_velocity() {
            dict.set_item("heavy_vx", v.x)?;
        }
        if let Some(p) = self.heavy_position() {
            dict.set_item("heavy_x", p.x)?;
            dict.set_item("heavy_y", p.y)?;
            dict.set_item("heavy_z", p.z)?;
        }
        dict.set_item("slowdown_coefficient", self.slowdown_coefficient())?;
        Ok(dict.into_any().unbind())
    }
}

/// Python module definition.
#[pymodule]
fn spring_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Vec3>()?;
    m.add_class::<Simulation>()?;
    Ok(())
}
