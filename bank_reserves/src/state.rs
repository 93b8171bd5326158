use std::any::Any;

use krabmaga::engine::{schedule::Schedule, state::State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agents::{Bank, Person};
use crate::config::Config;
use crate::error::ConfigError;
use crate::grid::SpatialGrid;
use crate::metrics::MetricsCollector;
use crate::scheduler::RandomActivation;

// ─────────────────────────────────────────────────────────────────────────────
// Bank Reserves state (implements krabmaga State)
// ─────────────────────────────────────────────────────────────────────────────

/// Everything one run owns: people, grid, bank, RNG and metrics.
///
/// The krabmaga `Schedule` only holds the [`RandomActivation`] proxy; all
/// mutable data lives here.
pub struct BankReservesState {
    // Agent data
    pub people: Vec<Person>,
    pub grid: SpatialGrid,
    pub bank: Bank,

    // Configuration
    pub config: Config,

    // Random number generator
    pub rng: StdRng,

    // Observation
    pub metrics: MetricsCollector,
    pub step: u64,
    pub last_order: Vec<usize>,
    pub loan_denials: u64,

    seed: u64,
}

impl BankReservesState {
    /// Validate `config` and place the initial population.
    pub fn new(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = SpatialGrid::new(config.width as usize, config.height as usize);
        let people = Self::create_people(&config, &mut grid, &mut rng);
        let metrics = MetricsCollector::new(config.rich_threshold, config.debt_threshold);

        Ok(BankReservesState {
            people,
            grid,
            bank: Bank::new(config.reserve_percent),
            config,
            rng,
            metrics,
            step: 0,
            last_order: Vec::new(),
            loan_denials: 0,
            seed,
        })
    }

    fn create_people(config: &Config, grid: &mut SpatialGrid, rng: &mut StdRng) -> Vec<Person> {
        let mut people = Vec::with_capacity(config.init_people);
        for id in 0..config.init_people {
            let x = rng.gen_range(0..config.width) as i64;
            let y = rng.gen_range(0..config.height) as i64;
            let pos = grid.place(id, x, y);
            people.push(Person::new(id, pos, config.initial_wallet));
        }
        people
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn total_wallets(&self) -> i64 {
        self.people.iter().map(|p| p.wallet).sum()
    }

    pub fn total_savings(&self) -> i64 {
        self.people.iter().map(|p| p.savings).sum()
    }

    pub fn total_loans(&self) -> i64 {
        self.people.iter().map(|p| p.loans).sum()
    }

    /// Wallets plus savings.
    pub fn total_money(&self) -> i64 {
        self.total_wallets() + self.total_savings()
    }

    /// Initial money plus net lending. Equals [`Self::total_money`] whenever
    /// the books balance.
    pub fn expected_money(&self) -> i64 {
        self.config.initial_money() + self.bank.loans_issued() - self.bank.loans_repaid()
    }

    /// True when every person's recorded position matches the grid and the
    /// bank's totals match the people's balances.
    pub fn is_consistent(&self) -> bool {
        let positions_match = self.people.iter().all(|p| {
            self.grid.position_of(p.id) == Some(p.pos)
                && self.grid.cell_contents(p.pos).contains(&p.id)
        });
        positions_match
            && self.grid.agent_count() == self.people.len()
            && self.bank.total_deposits() == self.total_savings()
            && self.bank.total_loans() == self.total_loans()
    }
}

impl State for BankReservesState {
    /// Schedule the activation proxy when the simulation starts.
    fn init(&mut self, schedule: &mut Schedule) {
        schedule.schedule_repeating(Box::new(RandomActivation), 0.0, 0);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_state_mut(&mut self) -> &mut dyn State {
        self
    }

    fn as_state(&self) -> &dyn State {
        self
    }

    fn reset(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut grid = SpatialGrid::new(self.config.width as usize, self.config.height as usize);
        self.people = Self::create_people(&self.config, &mut grid, &mut rng);
        self.grid = grid;
        self.bank = Bank::new(self.config.reserve_percent);
        self.rng = rng;
        self.metrics =
            MetricsCollector::new(self.config.rich_threshold, self.config.debt_threshold);
        self.step = 0;
        self.last_order.clear();
        self.loan_denials = 0;
    }

    /// Metrics describe the state at the start of the step, before anyone acts.
    fn before_step(&mut self, _schedule: &mut Schedule) {
        self.metrics.collect(self.step, &self.people);
    }

    fn after_step(&mut self, _schedule: &mut Schedule) {
        self.step += 1;
    }

    fn update(&mut self, _step: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_population_is_placed_and_funded() {
        let config = Config {
            init_people: 30,
            initial_wallet: 7,
            ..Config::default()
        };
        let state = BankReservesState::new(config, 1).unwrap();
        assert_eq!(state.people.len(), 30);
        assert!(state.people.iter().all(|p| p.wallet == 7 && p.savings == 0));
        assert_eq!(state.total_money(), 210);
        assert!(state.is_consistent());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            reserve_percent: 150,
            ..Config::default()
        };
        assert!(BankReservesState::new(config, 1).is_err());
    }

    #[test]
    fn reset_restores_the_seeded_start() {
        let mut state = BankReservesState::new(Config::default(), 9).unwrap();
        let start = state.people.clone();
        state.people[0].wallet = 0;
        state.step = 12;
        state.reset();
        assert_eq!(state.people, start);
        assert_eq!(state.step, 0);
        assert!(state.metrics.trajectory().is_empty());
    }
}
