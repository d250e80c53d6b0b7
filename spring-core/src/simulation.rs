//! Main orchestrator.
//!
//! A host drives a run through three calls:
//!
//! ```text
//! initialize(bodies)          once, assigns initial velocities
//! advance(dt, bodies)         once per fixed tick
//! shutdown(writer)            once, exports the recorded series
//! ```
//!
//! Between `advance` calls the host integrates its own bodies. [`HostLoop`]
//! does exactly that with the reference [`BodyPair`] backend.

use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::config::SimulationConfig;
use crate::error::{Error, Result, Violation};
use crate::export::CsvExporter;
use crate::integrator::{BodyPair, KinematicState};
use crate::phase::{Phase, PhaseContext, PhaseMachine, Roles, Transition};
use crate::recorder::{Sample, TimeSeries, TimeSeriesRecorder};
use crate::types::BodyId;

pub struct Simulation {
    config: SimulationConfig,
    exporter: CsvExporter,
    machine: Option<PhaseMachine>,
    recorder: TimeSeriesRecorder,
    time: f64,
    ticks: u64,
    last_violation: Option<Violation>,
    violation_count: u64,
}

impl Simulation {
    /// Validate the configuration. Nothing runs until [`initialize`].
    ///
    /// [`initialize`]: Simulation::initialize
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let exporter = CsvExporter::new(config.header())?;
        Ok(Self {
            config,
            exporter,
            machine: None,
            recorder: TimeSeriesRecorder::new(),
            time: 0.0,
            ticks: 0,
            last_violation: None,
            violation_count: 0,
        })
    }

    /// Check the bodies, decide roles, assign initial velocities and start
    /// from `PreContact` with an empty series. Calling it again restarts.
    pub fn initialize<K: KinematicState + ?Sized>(&mut self, bodies: &mut K) -> Result<()> {
        for id in [BodyId::A, BodyId::B] {
            let mass = bodies.mass(id);
            if !mass.is_finite() || mass <= 0.0 {
                return Err(Error::config(format!(
                    "mass of body {:?} must be finite and > 0, got {}",
                    id, mass
                )));
            }
        }

        let roles = Roles::from_masses(bodies);
        let machine = PhaseMachine::new(&self.config, roles)?;

        bodies.set_velocity(BodyId::A, self.config.initial_velocities[0]);
        bodies.set_velocity(BodyId::B, self.config.initial_velocities[1]);

        info!(
            "initialized: light body {:?} ({} kg), heavy body {:?} ({} kg), separation {:.4}",
            roles.light,
            bodies.mass(roles.light),
            roles.heavy,
            bodies.mass(roles.heavy),
            PhaseMachine::separation(bodies)
        );

        self.machine = Some(machine);
        self.recorder = TimeSeriesRecorder::new();
        self.time = 0.0;
        self.ticks = 0;
        self.last_violation = None;
        self.violation_count = 0;
        Ok(())
    }

    /// Run one tick of length `dt`.
    ///
    /// Never fails: a bad `dt`, a call before `initialize` or a non-finite
    /// body state is logged, remembered as the last violation, and the tick
    /// does nothing.
    pub fn advance<K: KinematicState + ?Sized>(&mut self, dt: f64, bodies: &mut K) -> Phase {
        if !dt.is_finite() || dt <= 0.0 {
            return self.reject(Violation::InvalidTimeStep(dt));
        }
        let Some(machine) = self.machine.as_mut() else {
            return self.reject(Violation::NotInitialized);
        };

        let now = self.time + dt;
        match machine.step(now, bodies) {
            Ok(outcome) => {
                let roles = machine.roles();
                let tracked = roles.body(self.config.tracked_body);
                self.recorder.record(Sample::new(
                    now,
                    bodies.velocity(roles.light).x,
                    bodies.velocity(roles.heavy).x,
                    bodies.position(tracked),
                ));
                self.time = now;
                self.ticks += 1;
                outcome.phase
            }
            Err(violation) => self.reject(violation),
        }
    }

    fn reject(&mut self, violation: Violation) -> Phase {
        warn!("tick skipped at t={:.4}: {}", self.time, violation);
        self.last_violation = Some(violation);
        self.violation_count += 1;
        self.phase()
    }

    /// Export the series to `writer`. The series is left intact.
    pub fn shutdown<W: Write>(&self, writer: &mut W) -> Result<usize> {
        info!("{}", self.summary());
        self.exporter.write(writer, self.recorder.series())
    }

    /// Same as [`shutdown`](Simulation::shutdown), into a created (or truncated) file.
    pub fn shutdown_to_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        info!("{}", self.summary());
        self.exporter.write_file(path, self.recorder.series())
    }

    /// One-line run summary, logged on shutdown.
    pub fn summary(&self) -> String {
        format!(
            "shutdown after {} ticks ({:.4} s) in phase {}, {} samples, {} skipped",
            self.ticks,
            self.time,
            self.phase(),
            self.recorder.len(),
            self.violation_count
        )
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.machine
            .as_ref()
            .map(PhaseMachine::phase)
            .unwrap_or(Phase::PreContact)
    }

    pub fn context(&self) -> Option<&PhaseContext> {
        self.machine.as_ref().map(PhaseMachine::context)
    }

    pub fn roles(&self) -> Option<Roles> {
        self.machine.as_ref().map(PhaseMachine::roles)
    }

    pub fn transitions(&self) -> &[Transition] {
        self.machine
            .as_ref()
            .map(PhaseMachine::history)
            .unwrap_or(&[])
    }

    pub fn series(&self) -> &TimeSeries {
        self.recorder.series()
    }

    /// Cumulative time of all accepted ticks (s).
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_violation(&self) -> Option<&Violation> {
        self.last_violation.as_ref()
    }

    pub fn violation_count(&self) -> u64 {
        self.violation_count
    }
}

// =============================================================================
// Host loop
// =============================================================================

/// A simulation bound to the reference backend: advance, then integrate.
pub struct HostLoop {
    pub simulation: Simulation,
    pub bodies: BodyPair,
}

impl HostLoop {
    pub fn new(config: SimulationConfig, mut bodies: BodyPair) -> Result<Self> {
        let mut simulation = Simulation::new(config)?;
        simulation.initialize(&mut bodies)?;
        Ok(Self { simulation, bodies })
    }

    pub fn step(&mut self, dt: f64) -> Phase {
        let phase = self.simulation.advance(dt, &mut self.bodies);
        if dt.is_finite() && dt > 0.0 {
            self.bodies.integrate(dt);
        }
        phase
    }

    /// Step until `Idle` or `max_steps`. Returns the number of steps taken.
    pub fn run_until_idle(&mut self, dt: f64, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && !self.simulation.phase().is_terminal() {
            self.step(dt);
            steps += 1;
        }
        steps
    }
}

// =============================================================================
// Tests
// =============================================================================
