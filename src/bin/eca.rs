//! ECA command-line entry point
//!
//! Loads a JSON parameter record, runs one analysis and writes the result
//! table as CSV.
//!
//! ```bash
//! # Single trajectory waveform
//! eca run --config params.json --output waveform.csv
//!
//! # S bifurcation diagram at the record's Q
//! eca bifurcation --config params.json --output bif.csv
//!
//! # (Q, S) regime map, recording over t ∈ [500, 800] by default
//! eca region --output region.csv --start 0.2 --stop 0.69
//!
//! # Same map with a longer transient
//! eca region --output region.csv --s-t 700 --e-t 1000
//!
//! # Attraction basin with 200 random hidden-state settings
//! eca basin --output basin.csv --random 200 --seed 1
//!
//! # LUT listing for the HDL toolchain
//! eca lut --output lut.txt
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eca_switch::{
    write_verilog, BasinSweep, BifurcationPoint, BifurcationSweep, CancelToken, ClockScan,
    EcaConfig, InitialGrid, Kernel, Lut, NuisanceGrid, ParamRange, Protocol, RegionRow,
    RegionSweep,
};

/// Ergodic cellular automaton analysis of the bistable switch
#[derive(Parser, Debug)]
#[command(name = "eca")]
#[command(author, version, about = "ECA surrogate of a two-variable bistable switch")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Single trajectory, decimated (t, X, Y) waveform
    Run(RunArgs),

    /// S sweep against a grid of initial conditions
    Bifurcation(BifurcationArgs),

    /// (Q, S) regime map
    Region(RegionArgs),

    /// Attraction basin at the record's (Q, S)
    Basin(BasinArgs),

    /// Dump the Fin/Gin tables as HDL assignments
    Lut(CommonArgs),

    /// Region maps over (Tx, Ty) scored against a reference map
    ClockScan(ClockScanArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON parameter record (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Lattice rotation in degrees, overrides the record
    #[arg(long)]
    deg: Option<f64>,
}

/// Recording window overrides; each sweep has its own default
#[derive(Args, Debug)]
struct WindowArgs {
    /// Start of the recorded window (end of transient), time units
    #[arg(long = "s-t")]
    s_t: Option<f64>,

    /// End of the recorded window, time units
    #[arg(long = "e-t")]
    e_t: Option<f64>,
}

impl WindowArgs {
    /// `None` when neither bound was given
    fn protocol(&self, config: &EcaConfig, default: (f64, f64)) -> Option<Protocol> {
        if self.s_t.is_none() && self.e_t.is_none() {
            return None;
        }
        let s_t = self.s_t.unwrap_or(default.0);
        let e_t = self.e_t.unwrap_or(default.1);
        Some(config.window(s_t, e_t))
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct BifurcationArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    window: WindowArgs,

    #[arg(long, default_value = "0.0")]
    s_start: f64,

    #[arg(long, default_value = "0.80")]
    s_stop: f64,

    #[arg(long, default_value = "0.01")]
    s_step: f64,

    /// Initial-condition spacing in lattice units
    #[arg(long, default_value = "2")]
    ic_step: u32,
}

#[derive(Args, Debug)]
struct RegionArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    window: WindowArgs,

    /// First S and Q value
    #[arg(long, default_value = "0.20")]
    start: f64,

    /// Last S and Q value
    #[arg(long, default_value = "0.69")]
    stop: f64,

    #[arg(long, default_value = "0.01")]
    step: f64,

    #[arg(long, default_value = "8")]
    ic_step: u32,
}

#[derive(Args, Debug)]
struct BasinArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    window: WindowArgs,

    #[arg(long, default_value = "2")]
    ic_step: u32,

    /// Draw this many random hidden-state settings instead of the standard grid
    #[arg(long)]
    random: Option<usize>,

    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Args, Debug)]
struct ClockScanArgs {
    #[command(flatten)]
    region: RegionArgs,

    /// Reference region CSV (Q, S, ..., state)
    #[arg(short, long)]
    reference: PathBuf,
}

#[derive(Serialize)]
struct WaveformRow {
    t: f64,
    #[serde(rename = "X")]
    x: u32,
    #[serde(rename = "Y")]
    y: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let cancel = CancelToken::new();

    match cli.command {
        Commands::Run(args) => {
            let config = load_config(&args.common)?;
            let lut = Lut::for_config(&config)?;
            let kernel = Kernel::from_config(&lut, &config)?;
            let traj = kernel.run_trajectory(config.initial_state())?;
            info!(samples = traj.len(), outcome = ?traj.outcome, "trajectory finished");

            let rows: Vec<WaveformRow> = traj
                .t
                .iter()
                .zip(traj.x.iter().zip(traj.y.iter()))
                .map(|(&t, (&x, &y))| WaveformRow { t, x, y })
                .collect();
            write_rows(args.common.output.as_deref(), &rows)?;
        }
        Commands::Bifurcation(args) => {
            let config = load_config(&args.common)?;
            let initial = InitialGrid::stepped(config.n.saturating_sub(1), args.ic_step);
            let window = args.window.protocol(&config, (config.s_t, config.e_t));
            let mut sweep = BifurcationSweep::new(config)
                .with_s_range(ParamRange::new(args.s_start, args.s_stop, args.s_step))
                .with_initial(initial);
            if let Some(protocol) = window {
                sweep = sweep.with_protocol(protocol);
            }
            let rows = sweep.run(&cancel)?;
            write_rows(args.common.output.as_deref(), &rows)?;
        }
        Commands::Region(args) => {
            let mut sweep = region_sweep(&args)?;
            if let Some(protocol) = args.window.protocol(&sweep.config, RegionSweep::WINDOW) {
                sweep = sweep.with_protocol(protocol);
            }
            let rows = sweep.run(&cancel)?;
            write_rows(args.common.output.as_deref(), &rows)?;
        }
        Commands::Basin(args) => {
            let config = load_config(&args.common)?;
            let nuisance = match args.random {
                Some(count) => NuisanceGrid::random(count, config.m, args.seed)?,
                None => NuisanceGrid::standard(),
            };
            let initial = InitialGrid::stepped(config.n, args.ic_step);
            let window = args.window.protocol(&config, BasinSweep::WINDOW);
            let mut sweep = BasinSweep::new(config)
                .with_initial(initial)
                .with_nuisance(nuisance);
            if let Some(protocol) = window {
                sweep = sweep.with_protocol(protocol);
            }
            let rows = sweep.run(&cancel)?;
            write_rows(args.common.output.as_deref(), &rows)?;
        }
        Commands::Lut(args) => {
            let config = load_config(&args)?;
            let lut = Lut::for_config(&config)?;
            info!(saturated = lut.saturated_cells(), "LUT built");
            match args.output.as_deref() {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_verilog(&lut, io::BufWriter::new(file))?;
                }
                None => write_verilog(&lut, io::stdout().lock())?,
            }
        }
        Commands::ClockScan(args) => {
            let sweep = region_sweep(&args.region)?;
            let reference = load_reference(&args.reference)?;
            let window = args.region.window.protocol(&sweep.config, ClockScan::WINDOW);
            let mut scan = ClockScan::new(sweep, reference);
            if let Some(protocol) = window {
                scan = scan.with_protocol(protocol);
            }
            let rows = scan.run(&cancel)?;
            write_rows(args.region.common.output.as_deref(), &rows)?;
        }
    }

    Ok(())
}

fn load_config(args: &CommonArgs) -> anyhow::Result<EcaConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            EcaConfig::from_json_reader(BufReader::new(file))
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => EcaConfig::default(),
    };
    if args.deg.is_some() {
        config.deg = args.deg;
    }
    config.validate()?;
    Ok(config)
}

fn region_sweep(args: &RegionArgs) -> anyhow::Result<RegionSweep> {
    let config = load_config(&args.common)?;
    let range = ParamRange::new(args.start, args.stop, args.step);
    let initial = InitialGrid::stepped(config.n, args.ic_step);
    Ok(RegionSweep::new(config)
        .with_ranges(range, range)
        .with_initial(initial))
}

fn load_reference(path: &Path) -> anyhow::Result<Vec<(BifurcationPoint, u8)>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let mut cells = Vec::new();
    for row in rdr.deserialize() {
        let row: RegionRow = row?;
        cells.push((row.point(), row.state));
    }
    Ok(cells)
}

fn write_rows<T: Serialize>(path: Option<&Path>, rows: &[T]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let mut wtr = csv::Writer::from_path(path)
                .with_context(|| format!("creating {}", path.display()))?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
            info!(rows = rows.len(), path = %path.display(), "results saved");
        }
        None => {
            let mut wtr = csv::Writer::from_writer(io::stdout().lock());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}
