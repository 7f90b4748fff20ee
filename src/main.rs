// Entry point: runs the sweeps against the external sketch program and saves charts.
use std::error::Error;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sketchsweep::cli::Args;
use sketchsweep::config::HarnessConfig;
use sketchsweep::executor::ProcessRunner;
use sketchsweep::harness::{Harness, Stages};

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("sketchsweep failed: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    // RUST_LOG wins over -v/-q.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = HarnessConfig::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);

    let harness = Harness::new(config, ProcessRunner)?;
    let report = harness.run(Stages {
        phi: !args.skip_phi,
        memory: !args.skip_memory,
    })?;

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    for chart in &report.charts {
        println!("Saved {}", chart.display());
    }
    Ok(())
}
