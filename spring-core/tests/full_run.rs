use std::fs;
use std::path::PathBuf;

use spring_core::collision::elastic_1d;
use spring_core::oscillator::{Oscillator, OscillatorConfig};
use spring_core::phase::Phase;
use spring_core::{BodyPair, ConfigLoader, HostLoop, SimulationConfig};

const DT: f64 = 0.02;
const MAX_STEPS: usize = 50_000;

fn scenarios() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../scenarios")
}

fn lab_run(config: SimulationConfig) -> HostLoop {
    let mut host = HostLoop::new(config, BodyPair::lab_default().unwrap()).unwrap();
    host.run_until_idle(DT, MAX_STEPS);
    host
}

fn transition_time(host: &HostLoop, to: Phase) -> f64 {
    host.simulation
        .transitions()
        .iter()
        .find(|t| t.to == to)
        .map(|t| t.time)
        .unwrap_or_else(|| panic!("never entered {}", to))
}

#[test]
fn test_default_run_visits_every_phase_in_order() {
    let host = lab_run(SimulationConfig::default());
    let sim = &host.simulation;

    assert_eq!(sim.phase(), Phase::Idle, "run should come to rest");
    // Name handed to the Python bindings
    assert_eq!(sim.phase().name(), "idle");
    let visited: Vec<Phase> = sim.transitions().iter().map(|t| t.to).collect();
    assert_eq!(
        visited,
        vec![
            Phase::Compressing,
            Phase::Locked,
            Phase::Releasing,
            Phase::Circling,
            Phase::Idle
        ]
    );
    for pair in sim.transitions().windows(2) {
        assert!(pair[0].time <= pair[1].time);
        assert!(pair[0].to < pair[1].to);
    }
}

#[test]
fn test_lock_lasts_lock_duration() {
    let host = lab_run(SimulationConfig::default());
    let locked = transition_time(&host, Phase::Locked);
    let released = transition_time(&host, Phase::Releasing);
    assert!(
        ((released - locked) - 4.0).abs() < DT * 0.5,
        "locked for {} s",
        released - locked
    );
}

#[test]
fn test_locked_bodies_share_velocity() {
    let host = lab_run(SimulationConfig::default());
    let locked = transition_time(&host, Phase::Locked);
    let released = transition_time(&host, Phase::Releasing);

    let during: Vec<_> = host
        .simulation
        .series()
        .iter()
        .filter(|s| s.t > locked + 1e-9 && s.t < released - 1e-9)
        .collect();
    assert!(!during.is_empty());
    for s in during {
        assert_eq!(s.v1, s.v2, "velocities differ at t={}", s.t);
    }
}

#[test]
fn test_momentum_conserved_until_lock() {
    let host = lab_run(SimulationConfig::default());
    let locked = transition_time(&host, Phase::Locked);
    // 1 kg at 3 m/s, 2 kg at rest
    for s in host.simulation.series().iter().filter(|s| s.t <= locked) {
        let p = 1.0 * s.v1 + 2.0 * s.v2;
        assert!((p - 3.0).abs() < 1e-9, "momentum {} at t={}", p, s.t);
    }
}

#[test]
fn test_release_is_close_to_elastic_exchange() {
    let host = lab_run(SimulationConfig::default());
    let circling = transition_time(&host, Phase::Circling);
    let sample = host
        .simulation
        .series()
        .iter()
        .find(|s| (s.t - circling).abs() < 1e-9)
        .unwrap();

    let (u1, u2) = elastic_1d(1.0, 2.0, 3.0, 0.0).unwrap();
    assert!((sample.v1 - u1).abs() < 0.5, "light left at {}", sample.v1);
    assert!((sample.v2 - u2).abs() < 0.5, "heavy left at {}", sample.v2);
}

#[test]
fn test_turn_freezes_positive_coefficient_and_stops_light_body() {
    let host = lab_run(SimulationConfig::default());
    let ctx = host.simulation.context().unwrap();
    let c = ctx.slowdown_coefficient().expect("turn should have started");
    assert!(c > 0.0);
    assert!(!ctx.is_turning());

    let light = host.simulation.roles().unwrap().light;
    assert_eq!(host.bodies.body(light).state.vel.magnitude(), 0.0);
}

#[test]
fn test_export_is_idempotent() {
    let host = lab_run(SimulationConfig::default());
    let dir = std::env::temp_dir().join(format!("spring-core-full-run-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let first = dir.join("a.csv");
    let second = dir.join("b.csv");

    let rows = host.simulation.shutdown_to_file(&first).unwrap();
    host.simulation.shutdown_to_file(&second).unwrap();

    let a = fs::read(&first).unwrap();
    let b = fs::read(&second).unwrap();
    assert_eq!(a, b);
    assert_eq!(rows, host.simulation.series().len());
    let text = String::from_utf8(a).unwrap();
    assert_eq!(text.lines().count(), rows + 1);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_bundled_scenarios_load() {
    let loader = ConfigLoader::new(scenarios());
    assert_eq!(
        loader.list().unwrap(),
        vec!["cross_up", "lab_default", "stiff_spring"]
    );
    assert_eq!(loader.load("lab_default").unwrap(), SimulationConfig::default());
    assert_eq!(loader.load("stiff_spring").unwrap().spring.stiffness, 500.0);
    assert!(loader.load("missing").is_err());
}

#[test]
fn test_cross_up_scenario_tracks_light_body() {
    let config = ConfigLoader::new(scenarios()).load("cross_up").unwrap();
    assert_eq!(config.header()[3], "x_light");

    let host = lab_run(config);
    assert_eq!(host.simulation.phase(), Phase::Idle);

    let light = host.simulation.roles().unwrap().light;
    let last = host.simulation.series().last().unwrap();
    let pos = host.bodies.body(light).state.pos;
    // Last sample is taken before the final integration, which the stopped body no longer moves through
    assert_eq!((last.x, last.y, last.z), (pos.x, pos.y, pos.z));
}

#[test]
fn test_oscillator_from_bundled_config() {
    let text = fs::read_to_string(scenarios().join("oscillator/lab02.yaml")).unwrap();
    let config = OscillatorConfig::from_yaml_str(&text).unwrap();
    assert_eq!(config, OscillatorConfig::default());

    let mut osc = Oscillator::new(config).unwrap();
    osc.run(DT, 500);
    assert_eq!(osc.series().len(), 500);
    let mut out = Vec::new();
    osc.shutdown(&mut out).unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("t,x,v,a\n"));
}
