use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use spring_core::oscillator::{Oscillator, OscillatorConfig};
use spring_core::{BodyPair, HostLoop, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "spring-run", version, about = "Run the spring/lock/circle scenario and write a CSV time series")]
struct Opts {
    /// Scenario YAML (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fixed time step (s)
    #[arg(long, default_value_t = 0.02)]
    dt: f64,
    /// Number of ticks to run
    #[arg(long, default_value_t = 1000, conflicts_with = "until_idle")]
    steps: usize,
    /// Run until the phase machine reaches Idle
    #[arg(long)]
    until_idle: bool,
    /// Tick cap for --until-idle
    #[arg(long, default_value_t = 100_000)]
    max_steps: usize,
    /// Output CSV path
    #[arg(long, default_value = "time_series.csv")]
    out: PathBuf,
    /// Run the single-body harmonic oscillator instead
    #[arg(long)]
    oscillator: bool,
}

fn read(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn run() -> Result<()> {
    let opts = Opts::parse();
    if opts.oscillator {
        run_oscillator(&opts)
    } else {
        run_scenario(&opts)
    }
}

fn run_scenario(opts: &Opts) -> Result<()> {
    let config = match &opts.config {
        Some(path) => SimulationConfig::from_yaml_str(&read(path)?)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let bodies = BodyPair::lab_default()?;
    let mut host = HostLoop::new(config, bodies).context("initializing simulation")?;

    let steps = if opts.until_idle {
        host.run_until_idle(opts.dt, opts.max_steps)
    } else {
        for _ in 0..opts.steps {
            host.step(opts.dt);
        }
        opts.steps
    };

    let sim = &host.simulation;
    info!(
        "ran {} ticks, t={:.4} s, final phase {}, {} transitions",
        steps,
        sim.time(),
        sim.phase(),
        sim.transitions().len()
    );
    if opts.until_idle && !sim.phase().is_terminal() {
        log::warn!("tick cap {} reached before Idle", opts.max_steps);
    }

    sim.shutdown_to_file(&opts.out)
        .with_context(|| format!("writing {}", opts.out.display()))?;
    println!("wrote {} samples to {}", sim.series().len(), opts.out.display());
    Ok(())
}

fn run_oscillator(opts: &Opts) -> Result<()> {
    let config = match &opts.config {
        Some(path) => OscillatorConfig::from_yaml_str(&read(path)?)
            .with_context(|| format!("loading oscillator config {}", path.display()))?,
        None => OscillatorConfig::default(),
    };
    let mut osc = Oscillator::new(config)?;
    osc.run(opts.dt, opts.steps);
    osc.shutdown_to_file(&opts.out)
        .with_context(|| format!("writing {}", opts.out.display()))?;
    println!("wrote {} samples to {}", osc.series().len(), opts.out.display());
    Ok(())
}
