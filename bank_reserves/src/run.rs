//! A single simulation run: `Created → Running → Finished`.

use krabmaga::engine::schedule::Schedule;
use krabmaga::engine::state::State;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ConfigError, SimulationError};
use crate::export::{Dataset, CHECKPOINT_FILE_PREFIX};
use crate::metrics::MetricsRow;
use crate::state::BankReservesState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Created,
    Running,
    Finished,
}

pub struct SimulationRun {
    state: BankReservesState,
    schedule: Schedule,
    phase: RunPhase,
}

impl SimulationRun {
    /// New run seeded from `config.seed`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = config.seed;
        Self::with_seed(config, seed)
    }

    pub fn with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        let mut state = BankReservesState::new(config, seed)?;
        let mut schedule = Schedule::new();
        state.init(&mut schedule);
        Ok(SimulationRun {
            state,
            schedule,
            phase: RunPhase::Created,
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// False once the step budget is spent or the run was stopped.
    pub fn is_running(&self) -> bool {
        self.phase != RunPhase::Finished
    }

    pub fn current_step(&self) -> u64 {
        self.state.step
    }

    pub fn state(&self) -> &BankReservesState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn trajectory(&self) -> &[MetricsRow] {
        self.state.metrics.trajectory()
    }

    pub fn into_trajectory(self) -> Vec<MetricsRow> {
        self.state.metrics.into_trajectory()
    }

    /// Finish the run at the current step boundary.
    pub fn stop(&mut self) {
        if self.phase != RunPhase::Finished {
            info!(step = self.state.step, "run stopped");
            self.phase = RunPhase::Finished;
        }
    }

    /// Collect metrics, activate every person once, advance the counter.
    /// A no-op once the run is finished.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        if self.phase == RunPhase::Finished {
            return Ok(());
        }
        if self.state.step >= self.state.config.run_time {
            self.phase = RunPhase::Finished;
            return Ok(());
        }
        if self.phase == RunPhase::Created {
            info!(
                seed = self.state.seed(),
                people = self.state.people.len(),
                reserve_percent = self.state.config.reserve_percent,
                run_time = self.state.config.run_time,
                "run started"
            );
            self.phase = RunPhase::Running;
        }

        self.schedule.step(&mut self.state);

        if self.state.step >= self.state.config.run_time {
            self.phase = RunPhase::Finished;
            info!(
                steps = self.state.step,
                money = self.state.total_money(),
                loans = self.state.total_loans(),
                "run finished"
            );
        }
        self.write_checkpoint()
    }

    /// Step up to `n` times; returns how many steps actually ran.
    pub fn run(&mut self, n: u64) -> Result<u64, SimulationError> {
        let start = self.state.step;
        for _ in 0..n {
            if !self.is_running() {
                break;
            }
            self.step()?;
        }
        Ok(self.state.step - start)
    }

    pub fn run_to_end(&mut self) -> Result<u64, SimulationError> {
        let remaining = self.state.config.run_time.saturating_sub(self.state.step);
        let ran = self.run(remaining)?;
        self.phase = RunPhase::Finished;
        Ok(ran)
    }

    fn write_checkpoint(&self) -> Result<(), SimulationError> {
        let config = &self.state.config;
        let Some(dir) = config.checkpoint_dir.as_ref() else {
            return Ok(());
        };
        if !config.checkpoints.contains(&self.state.step) {
            return Ok(());
        }
        let path = dir.join(format!("{CHECKPOINT_FILE_PREFIX}{}.csv", self.state.step));
        Dataset::from_trajectory(self.trajectory()).write_csv(&path, &[])?;
        debug!(step = self.state.step, path = %path.display(), "checkpoint written");
        Ok(())
    }
}
