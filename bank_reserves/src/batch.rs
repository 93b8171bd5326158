//! Parameter sweeps over independent runs.
//!
//! Every combination of the sweep axes, times the iteration count, gets its
//! own [`SimulationRun`] with fresh people, grid, bank and RNG. Runs share no
//! mutable state, so they execute in parallel with one run per rayon worker.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ConfigError, ExportError};
use crate::export::{step_values, Dataset, RUN_COLUMNS, STEP_COLUMNS};
use crate::metrics::MetricsRow;
use crate::run::SimulationRun;

/// Candidate values for each swept parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParameters {
    pub init_people: Vec<usize>,
    pub rich_threshold: Vec<i64>,
    pub reserve_percent: Vec<u32>,
}

impl Default for SweepParameters {
    fn default() -> Self {
        SweepParameters {
            init_people: vec![25, 100, 150, 200],
            rich_threshold: vec![5, 10, 15, 20],
            reserve_percent: vec![0, 50, 100],
        }
    }
}

impl SweepParameters {
    pub fn combinations(&self) -> usize {
        self.init_people.len() * self.rich_threshold.len() * self.reserve_percent.len()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.init_people.is_empty() {
            return Err(ConfigError::EmptyAxis("init_people"));
        }
        if self.rich_threshold.is_empty() {
            return Err(ConfigError::EmptyAxis("rich_threshold"));
        }
        if self.reserve_percent.is_empty() {
            return Err(ConfigError::EmptyAxis("reserve_percent"));
        }
        Ok(())
    }
}

/// Identity and parameters of one run in a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSpec {
    pub run_id: u64,
    pub iteration: usize,
    pub init_people: usize,
    pub rich_threshold: i64,
    pub reserve_percent: u32,
    pub seed: u64,
}

impl RunSpec {
    fn config(&self, base: &Config) -> Config {
        Config {
            init_people: self.init_people,
            rich_threshold: self.rich_threshold,
            reserve_percent: self.reserve_percent,
            seed: self.seed,
            ..base.clone()
        }
    }
}

/// A run's trajectory. `completed` is false when the run stopped early;
/// the rows collected before that point are kept.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub spec: RunSpec,
    pub trajectory: Vec<MetricsRow>,
    pub completed: bool,
}

pub struct BatchRunner {
    base: Config,
    params: SweepParameters,
    iterations: usize,
    max_steps: Option<u64>,
    base_seed: u64,
    next_run_id: u64,
    parallel: bool,
}

impl BatchRunner {
    /// Validate the sweep up front: every axis non-empty, at least one
    /// iteration, and every combination a valid configuration.
    pub fn new(
        base: Config,
        params: SweepParameters,
        iterations: usize,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        if iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        for &init_people in &params.init_people {
            for &rich_threshold in &params.rich_threshold {
                for &reserve_percent in &params.reserve_percent {
                    Config {
                        init_people,
                        rich_threshold,
                        reserve_percent,
                        ..base.clone()
                    }
                    .validate()?;
                }
            }
        }
        let base_seed = base.seed;
        Ok(BatchRunner {
            base,
            params,
            iterations,
            max_steps: None,
            base_seed,
            next_run_id: 1,
            parallel: true,
        })
    }

    /// Cap every run at `max_steps`, cutting runs whose `run_time` is longer.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn total_runs(&self) -> usize {
        self.params.combinations() * self.iterations
    }

    /// Assign run ids in sweep order: `init_people`, then `rich_threshold`,
    /// then `reserve_percent`, then iteration.
    pub fn plan(&mut self) -> Vec<RunSpec> {
        let mut specs = Vec::with_capacity(self.total_runs());
        for &init_people in &self.params.init_people {
            for &rich_threshold in &self.params.rich_threshold {
                for &reserve_percent in &self.params.reserve_percent {
                    for iteration in 0..self.iterations {
                        let run_id = self.next_run_id;
                        self.next_run_id += 1;
                        specs.push(RunSpec {
                            run_id,
                            iteration,
                            init_people,
                            rich_threshold,
                            reserve_percent,
                            seed: self.base_seed.wrapping_add(run_id),
                        });
                    }
                }
            }
        }
        specs
    }

    /// Execute every planned run and gather the outcomes in run-id order.
    pub fn run_all(&mut self) -> BatchResult {
        let specs = self.plan();
        info!(
            runs = specs.len(),
            iterations = self.iterations,
            parallel = self.parallel,
            "batch started"
        );

        let base = &self.base;
        let max_steps = self.max_steps;
        let runs: Vec<RunOutcome> = if self.parallel {
            specs
                .par_iter()
                .map(|spec| execute(base, spec, max_steps))
                .collect()
        } else {
            specs
                .iter()
                .map(|spec| execute(base, spec, max_steps))
                .collect()
        };

        let partial = runs.iter().filter(|r| !r.completed).count();
        info!(runs = runs.len(), partial, "batch finished");
        BatchResult { runs }
    }
}

/// Run one sweep member as far as it gets.
fn execute(base: &Config, spec: &RunSpec, max_steps: Option<u64>) -> RunOutcome {
    let config = spec.config(base);
    let limit = max_steps.map_or(config.run_time, |cap| cap.min(config.run_time));

    let mut run = match SimulationRun::new(config) {
        Ok(run) => run,
        Err(err) => {
            warn!(run = spec.run_id, error = %err, "run could not start");
            return RunOutcome {
                spec: *spec,
                trajectory: Vec::new(),
                completed: false,
            };
        }
    };

    if let Err(err) = run.run(limit) {
        warn!(run = spec.run_id, step = run.current_step(), error = %err, "run aborted");
    }
    let completed = run.current_step() >= run.config().run_time;
    if !completed {
        warn!(
            run = spec.run_id,
            steps = run.current_step(),
            "run did not finish; keeping partial trajectory"
        );
    }
    RunOutcome {
        spec: *spec,
        trajectory: run.into_trajectory(),
        completed,
    }
}

/// All outcomes of one [`BatchRunner::run_all`] call.
#[derive(Clone, Debug)]
pub struct BatchResult {
    pub runs: Vec<RunOutcome>,
}

impl BatchResult {
    pub fn total_rows(&self) -> usize {
        self.runs.iter().map(|r| r.trajectory.len()).sum()
    }

    /// Every run's rows, tagged with run id and parameters, ordered by run id
    /// then step.
    pub fn to_dataset(&self) -> Dataset {
        let mut data = Dataset::new(STEP_COLUMNS.iter().chain(RUN_COLUMNS.iter()).copied());
        let mut runs: Vec<&RunOutcome> = self.runs.iter().collect();
        runs.sort_by_key(|r| r.spec.run_id);
        for outcome in runs {
            let spec = &outcome.spec;
            let tags = [
                spec.run_id as i64,
                spec.init_people as i64,
                spec.rich_threshold,
                i64::from(spec.reserve_percent),
            ];
            for row in &outcome.trajectory {
                let mut values = step_values(row).to_vec();
                values.extend_from_slice(&tags);
                data.rows_mut().push(values);
            }
        }
        data
    }

    /// Write the combined sweep table. Fails loudly if `Step` is missing.
    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        self.to_dataset().write_csv(path, &["Step"])
    }
}
