//! End-to-end experiment: phi sweeps, memory sweeps, then charts.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, HarnessConfig};
use crate::executor::CommandRunner;
use crate::parser::OutputParser;
use crate::plot::{ChartRenderer, ChartSpec, PlotError};
use crate::record::SweepResultSet;
use crate::sweep::{MemoryPlan, SweepController, phi_grid};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}

/// Which halves of the experiment to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub phi: bool,
    pub memory: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            phi: true,
            memory: true,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub phi_results: SweepResultSet,
    pub memory_results: SweepResultSet,
    #[serde(skip)]
    pub charts: Vec<PathBuf>,
}

pub struct Harness<R> {
    config: HarnessConfig,
    controller: SweepController<R>,
    renderer: ChartRenderer,
}

impl<R: CommandRunner + Sync> Harness<R> {
    pub fn new(config: HarnessConfig, runner: R) -> Result<Self, HarnessError> {
        config.validate()?;
        let controller = SweepController::new(
            runner,
            OutputParser::new(config.parser.level),
            config.program.path.clone(),
            config.program.build_command.clone(),
        );
        let renderer = ChartRenderer::new(
            config.output.dir.clone(),
            (config.output.width, config.output.height),
        );
        Ok(Self {
            config,
            controller,
            renderer,
        })
    }

    pub fn controller(&self) -> &SweepController<R> {
        &self.controller
    }

    pub fn run(&self, stages: Stages) -> Result<Report, HarnessError> {
        let mut report = Report::default();
        if stages.phi {
            report.phi_results = self.run_phi();
            report
                .charts
                .push(self.renderer.render(&report.phi_results, &ChartSpec::phi_sensitivity())?);
        }
        if stages.memory {
            report.memory_results = self.run_memory();
            report.charts.extend(self.render_memory(&report.memory_results)?);
        }
        info!(
            phi_records = report.phi_results.len(),
            memory_records = report.memory_results.len(),
            charts = report.charts.len(),
            "experiment finished"
        );
        Ok(report)
    }

    pub fn run_phi(&self) -> SweepResultSet {
        let cfg = &self.config.phi_sweep;
        let phis = phi_grid(cfg.start, cfg.step, cfg.count);
        self.controller
            .phi_sweeps_parallel(&cfg.variants, &phis, cfg.n_items, cfg.jobs)
    }

    pub fn run_memory(&self) -> SweepResultSet {
        let cfg = &self.config.memory_sweep;
        let plan = MemoryPlan {
            n_items: cfg.n_items,
            phi: cfg.phi,
            skip_on_build_failure: cfg.skip_on_build_failure,
        };
        let mut results = SweepResultSet::new();
        for run in &cfg.runs {
            results.extend(self.controller.memory_sweep(&run.sketch, &run.budgets, &plan));
        }
        results
    }

    /// Accuracy-vs-size chart, plus the two timing charts when the records
    /// carry timings.
    fn render_memory(&self, results: &SweepResultSet) -> Result<Vec<PathBuf>, HarnessError> {
        let mut charts = vec![self.renderer.render(results, &ChartSpec::memory_analysis())?];

        // The exact count pass does not depend on the sketch, so any record's
        // count time serves as the baseline.
        let baseline = results.iter().find_map(|r| r.timings()).map(|t| t.count_time);
        match baseline {
            Some(count_time) => {
                charts.push(
                    self.renderer
                        .render(results, &ChartSpec::time_analysis(count_time))?,
                );
                charts.push(self.renderer.render(results, &ChartSpec::update_time())?);
            }
            None if !results.is_empty() => {
                warn!("memory results carry no timings, skipping time charts");
            }
            None => {}
        }
        Ok(charts)
    }
}
