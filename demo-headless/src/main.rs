//! Headless configuration generator
//!
//! Thermalizes a lattice, then prints one line of measurements per decorrelated
//! configuration.

use clap::Parser;
use qcd_sim_core::{ActionKind, Lattice, LatticeConfig, Result, UpdateMethod};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Quenched lattice QCD with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "qcd-headless")]
#[command(about = "Generate SU(3) gauge configurations and measure Wilson loops", long_about = None)]
struct Args {
    /// Spatial edge length
    #[arg(short = 'L', long, default_value_t = 8)]
    edge_length: usize,

    /// Temporal extent (defaults to the edge length)
    #[arg(short = 'T', long)]
    temporal_extent: Option<usize>,

    /// Gauge coupling
    #[arg(short, long, default_value_t = 5.5)]
    beta: f64,

    /// Sweeps between configurations
    #[arg(short = 'c', long, default_value_t = 50)]
    n_correlations: usize,

    /// Number of configurations to generate
    #[arg(short, long, default_value_t = 10)]
    n_configurations: usize,

    /// Metropolis proposal spread
    #[arg(short, long, default_value_t = 0.24)]
    epsilon: f64,

    /// Lattice spacing
    #[arg(short = 'a', long, default_value_t = 0.25)]
    spacing: f64,

    /// Stout smearing weight
    #[arg(long, default_value_t = 0.3)]
    rho: f64,

    /// Tadpole factor
    #[arg(long, default_value_t = 1.0)]
    u0: f64,

    /// Action tag (0 = Wilson, 1 = rectangle, 2 = twisted rectangle)
    #[arg(long, default_value_t = 0)]
    action: i32,

    /// Use the pseudo-heatbath instead of Metropolis
    #[arg(long)]
    heatbath: bool,

    /// Use the sequential sweep instead of the domain-decomposed one
    #[arg(long)]
    sequential: bool,

    /// Block edge length of the domain-decomposed sweep
    #[arg(long, default_value_t = 2)]
    block_size: usize,

    /// Master seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Start from unit links instead of random ones
    #[arg(long)]
    cold: bool,

    /// Spatial extent of the measured Wilson loop
    #[arg(short, long, default_value_t = 2)]
    r: isize,

    /// Temporal extent of the measured Wilson loop
    #[arg(short, long, default_value_t = 2)]
    t: isize,

    /// Smearing iterations before measuring Wilson loops
    #[arg(long, default_value_t = 0)]
    n_smears: usize,

    /// Also solve a point-source propagator with this quark mass
    #[arg(short = 'm', long)]
    propagator_mass: Option<f64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> Result<LatticeConfig> {
    let mut config = LatticeConfig::default()
        .with_edge_length(args.edge_length)
        .with_beta(args.beta)
        .with_n_correlations(args.n_correlations)
        .with_n_configurations(args.n_configurations)
        .with_epsilon(args.epsilon)
        .with_spacing(args.spacing)
        .with_rho(args.rho)
        .with_u0(args.u0)
        .with_action(ActionKind::try_from(args.action)?)
        .with_parallel(!args.sequential)
        .with_block_size(args.block_size)
        .with_seed(args.seed);
    if let Some(temporal) = args.temporal_extent {
        config = config.with_temporal_extent(temporal);
    }
    if args.heatbath {
        config = config.with_update_method(UpdateMethod::Heatbath);
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    let n_configurations = config.n_configurations;
    let mut lattice = if args.cold {
        Lattice::cold(config)?
    } else {
        Lattice::new(config)?
    };

    let start = Instant::now();
    lattice.thermalize()?;
    info!(elapsed_s = start.elapsed().as_secs_f64(), "Thermalized");

    let loop_label = format!("W({},{})", args.r, args.t);
    println!(
        "{:>6} {:>12} {:>12} {:>12} {:>12}",
        "config", "plaquette", "rectangle", loop_label, "|polyakov|"
    );
    for index in 0..n_configurations {
        lattice.next_configuration()?;
        let plaquette = lattice.compute_average_plaquette();
        let rectangle = lattice.compute_average_rectangle();
        let wilson = lattice.compute_average_wilson_loop(args.r, args.t, args.n_smears)?;
        let polyakov = lattice.compute_average_polyakov_loop().norm();
        println!("{index:>6} {plaquette:>12.6} {rectangle:>12.6} {wilson:>12.6} {polyakov:>12.6}");
    }

    let stats = lattice.stats();
    info!(
        sweeps = lattice.n_updates(),
        acceptance = stats.acceptance_rate(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "Generation complete"
    );

    if let Some(mass) = args.propagator_mass {
        let propagator = lattice.propagator(mass, &[0, 0, 0, 0], 0, 0)?;
        println!("propagator norm (m = {mass}): {:.6e}", propagator.norm());
    }
    Ok(())
}
