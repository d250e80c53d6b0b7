//! Simulation configuration and YAML scenario loading.
//!
//! A scenario is a YAML file holding a [`SimulationConfig`]. Every field has
//! a default, so a file only needs to list what it changes:
//!
//! ```text
//! scenarios/
//! ├── lab_default.yaml
//! ├── stiff_spring.yaml
//! └── ...
//! ```
//!
//! ```yaml
//! spring:
//!   rest_length: 2.0
//!   stiffness: 10.0
//! lock_duration: 4.0
//! centripetal: !cross_up
//!   up: { x: 0.0, y: 1.0, z: 0.0 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forces::{CentripetalStrategy, SpringModel};
use crate::types::{constants, BodyRole, Vec3};

/// Which side of `boundary_x` starts the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySide {
    /// Turn once the light body's x is at or below the boundary.
    Below,
    /// Turn once the light body's x is at or above the boundary.
    Above,
}

impl BoundarySide {
    pub fn is_met(self, x: f64, boundary_x: f64) -> bool {
        match self {
            BoundarySide::Below => x <= boundary_x,
            BoundarySide::Above => x >= boundary_x,
        }
    }
}

/// Complete configuration of a two-body run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub spring: SpringModel,

    /// How long the bodies stay latched at maximal compression (s)
    pub lock_duration: f64,

    /// Radius of the circular path driven after release (m)
    pub radius: f64,

    /// Velocities assigned on initialize, indexed by body (A, B)
    pub initial_velocities: [Vec3; 2],

    /// X coordinate at which the light body starts turning
    pub boundary_x: f64,
    pub boundary_side: BoundarySide,

    /// Direction of the centripetal force
    pub centripetal: CentripetalStrategy,

    /// Squared speed under which a turning body is stopped (m²/s²)
    pub stop_speed_sq: f64,

    /// Body whose position fills the x, y, z sample columns
    pub tracked_body: BodyRole,

    /// Column labels after `t`: v1, v2, x, y, z
    pub labels: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spring: SpringModel::default(),
            lock_duration: 4.0,
            radius: 5.0,
            initial_velocities: [Vec3::along_x(3.0), Vec3::ZERO],
            boundary_x: 5.0,
            boundary_side: BoundarySide::Below,
            centripetal: CentripetalStrategy::default(),
            stop_speed_sq: constants::STOP_SPEED_SQ,
            tracked_body: BodyRole::Heavy,
            labels: default_labels(),
        }
    }
}

pub fn default_labels() -> Vec<String> {
    ["v_light", "v_heavy", "x_heavy", "y_heavy", "z_heavy"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl SimulationConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: SimulationConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject anything the phase machine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.spring.validate()?;
        if !self.lock_duration.is_finite() || self.lock_duration < 0.0 {
            return Err(Error::config("lock_duration must be finite and >= 0"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::config("radius must be finite and > 0"));
        }
        if !self.initial_velocities.iter().all(Vec3::is_finite) {
            return Err(Error::config("initial velocities must be finite"));
        }
        if !self.boundary_x.is_finite() {
            return Err(Error::config("boundary_x must be finite"));
        }
        if !self.stop_speed_sq.is_finite() || self.stop_speed_sq <= 0.0 {
            return Err(Error::config("stop_speed_sq must be finite and > 0"));
        }
        self.centripetal.validate()?;
        if self.labels.len() != 5 {
            return Err(Error::config(format!(
                "expected 5 column labels (v1, v2, x, y, z), got {}",
                self.labels.len()
            )));
        }
        if self.labels.iter().any(|l| l.contains(',') || l.contains('\n')) {
            return Err(Error::config("column labels must not contain ',' or newlines"));
        }
        Ok(())
    }

    /// Full CSV header, `t` first.
    pub fn header(&self) -> Vec<String> {
        std::iter::once("t".to_string())
            .chain(self.labels.iter().cloned())
            .collect()
    }
}

// =============================================================================
// Scenario loader
// =============================================================================

/// Loads named scenarios from a base directory.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load `<base>/<name>.yaml`.
    ///
    /// # Example
    /// ```ignore
    /// let loader = ConfigLoader::new("scenarios");
    /// let config = loader.load("lab_default")?;
    /// ```
    pub fn load(&self, name: &str) -> Result<SimulationConfig> {
        let path = self.base_path.join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(Error::NotFound(name.to_string()));
        }
        SimulationConfig::from_file(&path)
    }

    /// Names of all scenarios in the base directory, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("spring-core-config-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = SimulationConfig::from_yaml_str(
            "spring:\n  rest_length: 2.0\n  stiffness: 10.0\nlock_duration: 1.5\n",
        )
        .unwrap();
        assert_eq!(config.spring.rest_length, 2.0);
        assert_eq!(config.lock_duration, 1.5);
        assert_eq!(config.radius, 5.0);
        assert_eq!(config.labels.len(), 5);
    }

    #[test]
    fn test_strategy_from_yaml() {
        let config = SimulationConfig::from_yaml_str(
            "centripetal: !cross_up\n  up: { x: 0.0, y: 1.0, z: 0.0 }\n",
        )
        .unwrap();
        assert_eq!(config.centripetal, CentripetalStrategy::CrossUp { up: Vec3::UP });
    }

    #[test]
    fn test_negative_radius_rejected() {
        let err = SimulationConfig::from_yaml_str("radius: -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_negative_stiffness_rejected() {
        let mut config = SimulationConfig::default();
        config.spring.stiffness = -3.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stiffness"));
    }

    #[test]
    fn test_wrong_label_count_rejected() {
        let mut config = SimulationConfig::default();
        config.labels.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = SimulationConfig::from_yaml_str("spring: [1, 2").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_yaml_round_trip_keeps_values() {
        let mut config = SimulationConfig::default();
        config.boundary_side = BoundarySide::Above;
        let text = config.to_yaml_string().unwrap();
        let back = SimulationConfig::from_yaml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_header_starts_with_time() {
        let header = SimulationConfig::default().header();
        assert_eq!(header[0], "t");
        assert_eq!(header.len(), 6);
    }

    #[test]
    fn test_boundary_side() {
        assert!(BoundarySide::Below.is_met(4.0, 5.0));
        assert!(BoundarySide::Below.is_met(5.0, 5.0));
        assert!(!BoundarySide::Below.is_met(5.1, 5.0));
        assert!(BoundarySide::Above.is_met(5.1, 5.0));
    }

    #[test]
    fn test_loader_reads_and_lists() {
        let dir = scratch_dir("loader");
        fs::write(dir.join("stiff.yaml"), "spring:\n  rest_length: 1.0\n  stiffness: 500.0\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let loader = ConfigLoader::new(&dir);
        let config = loader.load("stiff").unwrap();
        assert_eq!(config.spring.stiffness, 500.0);

        let names = loader.list().unwrap();
        assert_eq!(names, vec!["stiff".to_string()]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_loader_not_found() {
        let loader = ConfigLoader::new(scratch_dir("missing"));
        match loader.load("nope") {
            Err(Error::NotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
