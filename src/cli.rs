use std::path::PathBuf;

use clap::Parser;

use crate::config::HarnessConfig;
use crate::parser::ParseLevel;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML (defaults reproduce the reference experiment)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// External sketch program (overrides config)
    #[arg(long, value_name = "PATH")]
    pub program: Option<PathBuf>,

    /// Directory for chart PNGs (overrides config)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Worker threads for phi sweeps (memory sweeps always run serially)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Only require the accuracy labels; skip stream/count timings
    #[arg(long, default_value_t = false)]
    pub baseline: bool,

    /// Skip the phi sensitivity sweep
    #[arg(long, default_value_t = false)]
    pub skip_phi: bool,

    /// Skip the memory (rebuild) sweep
    #[arg(long, default_value_t = false)]
    pub skip_memory: bool,

    /// Print collected records as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub dump_json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Folds command-line overrides into a loaded config.
    pub fn apply(&self, cfg: &mut HarnessConfig) {
        if let Some(program) = &self.program {
            cfg.program.path = program.clone();
        }
        if let Some(dir) = &self.out_dir {
            cfg.output.dir = dir.clone();
        }
        if let Some(jobs) = self.jobs {
            cfg.phi_sweep.jobs = jobs;
        }
        if self.baseline {
            cfg.parser.level = ParseLevel::Baseline;
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
