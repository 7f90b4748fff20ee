//! Parameter sweeps over the external sketch program.
//!
//! A sweep runs the program once per grid point and keeps only runs that
//! exited cleanly and printed every metric. Failures are logged and skipped;
//! nothing below the harness level aborts more than the sweep it occurs in.

use std::path::PathBuf;
use std::thread;

use crossbeam_channel::unbounded;
use tracing::{debug, error, info, warn};

use crate::executor::{self, CommandRunner};
use crate::parser::OutputParser;
use crate::record::{RunRecord, SweepResultSet};
use crate::sketch::SketchKind;

/// `count` phi values `start, start + step, ...`, rounded to shed float noise
/// so they print as `0.003` rather than `0.0030000000000000005`.
pub fn phi_grid(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| round_phi(start + step * i as f64))
        .collect()
}

fn round_phi(phi: f64) -> f64 {
    (phi * 1e9).round() / 1e9
}

/// Fixed parameters of a memory sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPlan {
    pub n_items: u64,
    pub phi: f64,
    pub skip_on_build_failure: bool,
}

pub struct SweepController<R> {
    runner: R,
    parser: OutputParser,
    program: PathBuf,
    build_command: Vec<String>,
}

impl<R: CommandRunner> SweepController<R> {
    pub fn new(
        runner: R,
        parser: OutputParser,
        program: impl Into<PathBuf>,
        build_command: Vec<String>,
    ) -> Self {
        Self {
            runner,
            parser,
            program: program.into(),
            build_command,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs one variant over `phis` with the stream size fixed.
    pub fn phi_sweep(&self, sketch_id: &str, phis: &[f64], n_items: u64) -> SweepResultSet {
        let mut results = SweepResultSet::new();
        let sketch = match sketch_id.parse::<SketchKind>() {
            Ok(sketch) => sketch,
            Err(err) => {
                error!(%err, "aborting phi sweep");
                return results;
            }
        };

        info!(%sketch, points = phis.len(), n_items, "phi sweep");
        for &phi in phis {
            if let Some(record) = self.measure(sketch, phi, n_items, None) {
                results.push(record);
            }
        }
        log_summary("phi", sketch, phis.len(), results.len());
        results
    }

    /// Runs the phi sweep for each variant in turn. An unknown variant only
    /// drops its own sweep.
    pub fn phi_sweeps(&self, sketch_ids: &[String], phis: &[f64], n_items: u64) -> SweepResultSet {
        let mut all = SweepResultSet::new();
        for id in sketch_ids {
            all.extend(self.phi_sweep(id, phis, n_items));
        }
        all
    }

    /// Rebuilds the program for each budget and measures it.
    ///
    /// Strictly sequential: every step replaces the binary the next
    /// measurement runs.
    pub fn memory_sweep(&self, sketch_id: &str, budgets: &[u32], plan: &MemoryPlan) -> SweepResultSet {
        let mut results = SweepResultSet::new();
        let sketch = match sketch_id.parse::<SketchKind>() {
            Ok(sketch) => sketch,
            Err(err) => {
                error!(%err, "aborting memory sweep");
                return results;
            }
        };

        info!(%sketch, points = budgets.len(), phi = plan.phi, "memory sweep");
        for &budget in budgets {
            let define = sketch.build_define(budget);
            let build = executor::rebuild(&self.build_command, &self.program, &define);
            if let Err(failure) = self.runner.run(&build) {
                if plan.skip_on_build_failure {
                    warn!(%sketch, budget, %failure, "rebuild failed, skipping grid point");
                    continue;
                }
                warn!(%sketch, budget, %failure, "rebuild failed, measuring previous binary");
            }
            if let Some(record) = self.measure(sketch, plan.phi, plan.n_items, Some(budget)) {
                results.push(record);
            }
        }
        log_summary("memory", sketch, budgets.len(), results.len());
        results
    }

    fn measure(&self, sketch: SketchKind, phi: f64, n_items: u64, buckets: Option<u32>) -> Option<RunRecord> {
        let invocation = executor::measurement(&self.program, n_items, phi, sketch.id());
        let stdout = match self.runner.run(&invocation) {
            Ok(stdout) => stdout,
            Err(failure) => {
                warn!(%sketch, phi, ?buckets, %failure, "run failed");
                return None;
            }
        };
        match self.parser.parse(&stdout) {
            Ok(metrics) => {
                debug!(
                    %sketch,
                    phi,
                    precision = metrics.precision,
                    recall = metrics.recall,
                    sketch_size = metrics.sketch_size,
                    "parsed run"
                );
                Some(RunRecord::new(sketch, phi, buckets, metrics))
            }
            Err(err) => {
                warn!(%sketch, phi, ?buckets, %err, "dropping run");
                None
            }
        }
    }
}

impl<R: CommandRunner + Sync> SweepController<R> {
    /// Phi sweep spread over `jobs` worker threads.
    ///
    /// Phi runs never rebuild the program, so they can overlap. Results come
    /// back in `phis` order regardless of completion order.
    pub fn phi_sweep_parallel(
        &self,
        sketch_id: &str,
        phis: &[f64],
        n_items: u64,
        jobs: usize,
    ) -> SweepResultSet {
        if jobs <= 1 || phis.len() <= 1 {
            return self.phi_sweep(sketch_id, phis, n_items);
        }
        let sketch = match sketch_id.parse::<SketchKind>() {
            Ok(sketch) => sketch,
            Err(err) => {
                error!(%err, "aborting phi sweep");
                return SweepResultSet::new();
            }
        };

        info!(%sketch, points = phis.len(), n_items, jobs, "phi sweep (parallel)");
        let (job_tx, job_rx) = unbounded::<(usize, f64)>();
        let (result_tx, result_rx) = unbounded::<(usize, Option<RunRecord>)>();
        for (idx, &phi) in phis.iter().enumerate() {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send((idx, phi));
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..jobs.min(phis.len()) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (idx, phi) in job_rx.iter() {
                        let record = self.measure(sketch, phi, n_items, None);
                        if result_tx.send((idx, record)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        let mut slots: Vec<Option<RunRecord>> = vec![None; phis.len()];
        for (idx, record) in result_rx.iter() {
            slots[idx] = record;
        }
        let results: SweepResultSet = slots.into_iter().flatten().collect();
        log_summary("phi", sketch, phis.len(), results.len());
        results
    }

    pub fn phi_sweeps_parallel(
        &self,
        sketch_ids: &[String],
        phis: &[f64],
        n_items: u64,
        jobs: usize,
    ) -> SweepResultSet {
        let mut all = SweepResultSet::new();
        for id in sketch_ids {
            all.extend(self.phi_sweep_parallel(id, phis, n_items, jobs));
        }
        all
    }
}

fn log_summary(kind: &str, sketch: SketchKind, points: usize, ok: usize) {
    info!(
        sweep = kind,
        %sketch,
        succeeded = ok,
        failed = points - ok,
        "sweep finished"
    );
}
