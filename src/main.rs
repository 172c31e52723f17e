// SPLITTERCTL -- DEMO/DIAGNOSTIC HARNESS FOR THE ADAPTIVE SPLITTER
//
// THE CORE IS A PURE LIBRARY (src/lib.rs); THIS BINARY DRIVES IT
// AGAINST A SYNTHETIC WORKLOAD FOR MANUAL INSPECTION AND SANITY-CHECKS
// A CONFIGURATION BEFORE IT IS WIRED INTO A REAL CACHE ENGINE.

mod demo;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use netcas_splitter::{BandwidthOracle, Splitter, SplitterConfig, SystemClock};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "splitterctl")]
#[command(about = "Adaptive RDMA-cache / backend request splitter -- demo and diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Option<SubCmd>,
}

#[derive(Subcommand)]
enum SubCmd {
    /// Drive the splitter against a synthetic four-phase workload
    /// (`--ticks`, `--requests`, `--miss-every`) and print per-tick
    /// telemetry plus a final summary.
    Simulate(SimulateArgs),

    /// Validate the default configuration's hysteresis and pattern bounds.
    Check,
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Number of monitor ticks to run (each phase gets ticks/4).
    #[arg(long, default_value_t = 160)]
    ticks: u64,

    /// Requests dispatched per tick.
    #[arg(long, default_value_t = 32)]
    requests: u64,

    /// Mark every Kth request a cache miss (0 disables forced misses).
    #[arg(long, default_value_t = 11)]
    miss_every: u64,

    /// Enables per-tick debug transition logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    ctrlc::set_handler(move || {
        SHUTDOWN.store(true, Ordering::SeqCst);
    })?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(SubCmd::Simulate(SimulateArgs {
        ticks: 160,
        requests: 32,
        miss_every: 11,
        debug: false,
    })) {
        SubCmd::Simulate(args) => run_simulate(args),
        SubCmd::Check => run_check(),
    }
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
    let config = SplitterConfig::default();
    let oracle: Arc<dyn BandwidthOracle> =
        Arc::new(demo::sample_oracle(config.io_depth, config.numjobs));
    let clock = Arc::new(SystemClock::new());
    let splitter = Splitter::init(config, oracle, clock);
    if args.debug {
        splitter.set_debug(1);
    }

    let engine = demo::PhasedEngine::new(args.ticks, args.miss_every);
    let req = demo::DemoRequest;

    tracing::info!(ticks = args.ticks, "starting simulation");
    for tick in 0..args.ticks {
        if SHUTDOWN.load(Ordering::SeqCst) {
            tracing::warn!(tick, "interrupted");
            break;
        }
        engine.advance_phase(tick);
        for _ in 0..args.requests {
            splitter.should_send_to_backend(&req, &engine);
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    println!(
        "final mode={:?} ratio={}/{} (cache share {:.1}%)",
        splitter.mode(),
        splitter.ratio(),
        config.scale,
        100.0 * splitter.ratio() as f64 / config.scale as f64
    );
    Ok(())
}

fn run_check() -> Result<()> {
    let config = SplitterConfig::default();
    match config.validate() {
        Ok(()) => {
            println!(
                "configuration ok: window={} pattern_max={} scale={}",
                config.window_size, config.pattern_max, config.scale
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("configuration invalid: {e}");
            std::process::exit(1);
        }
    }
}
