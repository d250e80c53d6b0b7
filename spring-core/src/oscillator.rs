//! Single-body harmonic oscillator.
//!
//! ```text
//!        zone_to              zone_from
//!  ---------|=====================|-----------> X
//!           |   F = -k * x        |  <-- kick (first tick)
//! ```
//!
//! The body gets a one-shot kick on the first tick. While it sits strictly
//! inside the spring zone a restoring force pulls it back towards
//! `zone_from`. Outside the zone it coasts.
//!
//! Each tick records `{t, x, v, a}` with the state as seen before that tick's
//! integration and `a` the force applied during it divided by the mass.

use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Violation};
use crate::export::CsvExporter;
use crate::integrator::SemiImplicitEuler;
use crate::recorder::{Row, TimeSeries, TimeSeriesRecorder};
use crate::types::{BodyState, Vec3};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorConfig {
    /// kg
    pub mass: f64,
    /// N/m
    pub stiffness: f64,
    /// Force along X applied on the first tick only (N)
    pub kick: f64,
    /// Spring anchor; the zone's +X edge (m)
    pub zone_from: f64,
    /// Zone's -X edge (m)
    pub zone_to: f64,
    pub initial_position: Vec3,
    pub labels: Vec<String>,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 1.0,
            kick: -50.0,
            zone_from: 0.0,
            zone_to: -3.5,
            initial_position: Vec3::ZERO,
            labels: ["t", "x", "v", "a"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl OscillatorConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::config(format!("mass must be > 0, got {}", self.mass)));
        }
        let values = [self.stiffness, self.kick, self.zone_from, self.zone_to];
        if values.iter().any(|v| !v.is_finite()) || !self.initial_position.is_finite() {
            return Err(Error::config("oscillator parameters must be finite"));
        }
        if self.zone_to >= self.zone_from {
            return Err(Error::config(format!(
                "zone_to ({}) must lie below zone_from ({})",
                self.zone_to, self.zone_from
            )));
        }
        if self.labels.len() != 4 {
            return Err(Error::config(format!(
                "oscillator export needs 4 labels, got {}",
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn in_zone(&self, x: f64) -> bool {
        x < self.zone_from && x > self.zone_to
    }
}

/// One oscillator observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorSample {
    pub t: f64,
    pub x: f64,
    pub v: f64,
    pub a: f64,
}

impl Row for OscillatorSample {
    fn fields(&self) -> Vec<f64> {
        vec![self.t, self.x, self.v, self.a]
    }
}

pub struct Oscillator {
    config: OscillatorConfig,
    exporter: CsvExporter,
    state: BodyState,
    kicked: bool,
    in_zone: bool,
    time: f64,
    recorder: TimeSeriesRecorder<OscillatorSample>,
    last_violation: Option<Violation>,
}

impl Oscillator {
    pub fn new(config: OscillatorConfig) -> Result<Self> {
        config.validate()?;
        let exporter = CsvExporter::new(config.labels.iter().cloned())?;
        info!(
            "oscillator: m={} kg, k={} N/m, zone ({}, {})",
            config.mass, config.stiffness, config.zone_to, config.zone_from
        );
        let state = BodyState::at_rest(config.initial_position);
        Ok(Self {
            config,
            exporter,
            state,
            kicked: false,
            in_zone: false,
            time: 0.0,
            recorder: TimeSeriesRecorder::new(),
            last_violation: None,
        })
    }

    /// Force along X for the coming tick.
    fn force(&mut self) -> f64 {
        let mut force = 0.0;
        if !self.kicked {
            force = self.config.kick;
            self.kicked = true;
        }

        let x = self.state.pos.x;
        let inside = self.config.in_zone(x);
        if inside != self.in_zone {
            debug!(
                "t={:.4}: {} spring zone at x={:.4}",
                self.time,
                if inside { "entered" } else { "left" },
                x
            );
            self.in_zone = inside;
        }
        if inside {
            // Spring anchored at zone_from
            force += -self.config.stiffness * (x - self.config.zone_from);
        }
        force
    }

    /// Run one tick of length `dt`. A bad `dt` is logged and ignored.
    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            let violation = Violation::InvalidTimeStep(dt);
            warn!("oscillator tick skipped: {}", violation);
            self.last_violation = Some(violation);
            return;
        }

        let force = self.force();
        self.time += dt;
        self.recorder.record(OscillatorSample {
            t: self.time,
            x: self.state.pos.x,
            v: self.state.vel.x,
            a: force / self.config.mass,
        });
        self.state = SemiImplicitEuler::step(&self.state, Vec3::along_x(force), self.config.mass, dt);
    }

    pub fn run(&mut self, dt: f64, steps: usize) {
        for _ in 0..steps {
            self.step(dt);
        }
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn series(&self) -> &TimeSeries<OscillatorSample> {
        self.recorder.series()
    }

    pub fn last_violation(&self) -> Option<&Violation> {
        self.last_violation.as_ref()
    }

    pub fn shutdown<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.exporter.write(writer, self.recorder.series())
    }

    pub fn shutdown_to_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.exporter.write_file(path, self.recorder.series())
    }
}

// =============================================================================
// Tests
// =============================================================================
