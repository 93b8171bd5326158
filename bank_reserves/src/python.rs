use std::collections::HashMap;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::batch::{BatchRunner, SweepParameters};
use crate::config::Config;
use crate::metrics::MetricsRow;
use crate::run::SimulationRun;

// ─────────────────────────────────────────────────────────────────────────────
// Python-visible step record
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate statistics for a single step of one run.
///
/// All fields are read-only from Python.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct StepRecord {
    pub run: u64,
    pub init_people: usize,
    pub rich_threshold: i64,
    pub reserve_percent: u32,
    pub step: u64,
    pub rich: usize,
    pub poor: usize,
    pub middle_class: usize,
    pub savings: i64,
    pub wallets: i64,
    pub money: i64,
    pub loans: i64,
}

impl StepRecord {
    fn new(run: u64, config: &Config, row: &MetricsRow) -> Self {
        StepRecord {
            run,
            init_people: config.init_people,
            rich_threshold: config.rich_threshold,
            reserve_percent: config.reserve_percent,
            step: row.step,
            rich: row.rich,
            poor: row.poor,
            middle_class: row.middle,
            savings: row.savings,
            wallets: row.wallets,
            money: row.money,
            loans: row.loans,
        }
    }
}

#[pymethods]
impl StepRecord {
    fn __repr__(&self) -> String {
        format!(
            "StepRecord(run={}, step={}, money={}, loans={})",
            self.run, self.step, self.money, self.loans
        )
    }

    /// Convert to a plain Python dict keyed by the CSV column names.
    fn to_dict(&self) -> HashMap<String, i64> {
        let mut m = HashMap::new();
        m.insert("Run".to_string(), self.run as i64);
        m.insert("init_people".to_string(), self.init_people as i64);
        m.insert("rich_threshold".to_string(), self.rich_threshold);
        m.insert("reserve_percent".to_string(), i64::from(self.reserve_percent));
        m.insert("Step".to_string(), self.step as i64);
        m.insert("Rich".to_string(), self.rich as i64);
        m.insert("Poor".to_string(), self.poor as i64);
        m.insert("Middle Class".to_string(), self.middle_class as i64);
        m.insert("Savings".to_string(), self.savings);
        m.insert("Wallets".to_string(), self.wallets);
        m.insert("Money".to_string(), self.money);
        m.insert("Loans".to_string(), self.loans);
        m
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Run one simulation and return its per-step statistics.
#[pyfunction]
#[pyo3(signature = (
    height=20,
    width=20,
    init_people=2,
    rich_threshold=10,
    reserve_percent=50,
    run_time=1000,
    seed=42,
))]
fn run_simulation(
    height: u32,
    width: u32,
    init_people: usize,
    rich_threshold: i64,
    reserve_percent: u32,
    run_time: u64,
    seed: u64,
) -> PyResult<Vec<StepRecord>> {
    let config = Config {
        height,
        width,
        init_people,
        rich_threshold,
        reserve_percent,
        run_time,
        seed,
        ..Config::default()
    };
    let mut run = SimulationRun::new(config).map_err(|e| PyValueError::new_err(e.to_string()))?;
    run.run_to_end()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

    let config = run.config().clone();
    Ok(run
        .trajectory()
        .iter()
        .map(|row| StepRecord::new(1, &config, row))
        .collect())
}

/// Run the default parameter sweep and return every run's rows.
#[pyfunction]
#[pyo3(signature = (iterations=1, run_time=1000, seed=42))]
fn run_sweep(iterations: usize, run_time: u64, seed: u64) -> PyResult<Vec<StepRecord>> {
    let base = Config {
        run_time,
        seed,
        ..Config::default()
    };
    let mut runner = BatchRunner::new(base.clone(), SweepParameters::default(), iterations)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let result = runner.run_all();

    let mut records = Vec::with_capacity(result.total_rows());
    for outcome in &result.runs {
        let spec = &outcome.spec;
        let config = Config {
            init_people: spec.init_people,
            rich_threshold: spec.rich_threshold,
            reserve_percent: spec.reserve_percent,
            ..base.clone()
        };
        records.extend(
            outcome
                .trajectory
                .iter()
                .map(|row| StepRecord::new(spec.run_id, &config, row)),
        );
    }
    Ok(records)
}

// ─────────────────────────────────────────────────────────────────────────────
// Module definition
// ─────────────────────────────────────────────────────────────────────────────

/// Bank Reserves agent-based model.
#[pymodule]
fn bank_reserves(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<StepRecord>()?;
    m.add_function(wrap_pyfunction!(run_simulation, m)?)?;
    m.add_function(wrap_pyfunction!(run_sweep, m)?)?;
    Ok(())
}
