/*!
# `bank_reserves` — Bank Reserves agent-based model

A population of people wanders a toroidal grid, trades with whoever shares
its cell, parks surplus cash with a single bank and borrows when short. The
bank lends only what its fractional-reserve policy allows.

The engine uses [krABMaga](https://github.com/krABMaga/krABMaga) (krabmaga)
for the step loop. Each step collects population metrics, then activates
every person exactly once in a freshly shuffled order drawn from the run's
seeded RNG, so a seed fully determines a trajectory.

## Quick start

```rust
use bank_reserves::{Config, SimulationRun};

let config = Config {
    init_people: 2,
    run_time: 5,
    ..Config::default()
};
let mut run = SimulationRun::new(config).unwrap();
run.run_to_end().unwrap();
assert_eq!(run.trajectory().len(), 5);
```

Parameter sweeps go through [`BatchRunner`], which runs every combination in
parallel and concatenates the trajectories into one [`Dataset`].

With the `python` feature the crate also builds as a Python extension
exposing `run_simulation` and `run_sweep`.
*/

pub mod agents;
pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod metrics;
#[cfg(feature = "python")]
mod python;
pub mod run;
pub mod scheduler;
pub mod state;

pub use agents::{Bank, Person, WealthClass};
pub use batch::{BatchResult, BatchRunner, RunOutcome, RunSpec, SweepParameters};
pub use config::Config;
pub use error::{ConfigError, ExportError, LoanDenied, SimulationError};
pub use export::Dataset;
pub use grid::{Position, SpatialGrid};
pub use metrics::{AgentExtractor, AgentRecord, MetricsCollector, MetricsRow};
pub use run::{RunPhase, SimulationRun};
pub use state::BankReservesState;
