use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Construction-time parameters for one Bank Reserves simulation run.
///
/// Default values follow the NetLogo Bank Reserves model where it defines
/// them. Fields missing from a JSON document fall back to these defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Grid
    pub height: u32,
    pub width: u32,

    // Population
    pub init_people: usize,
    pub initial_wallet: i64,

    // Classification
    pub rich_threshold: i64,
    pub debt_threshold: i64,

    // Bank
    pub reserve_percent: u32,

    // Person behaviour
    pub move_probability: f64,
    pub trade_probability: f64,
    pub large_trade: i64,
    pub small_trade: i64,
    pub wallet_target: i64,
    pub wallet_floor: i64,
    pub borrow_limit: i64,

    // Run control
    pub run_time: u64,
    pub seed: u64,

    // Snapshot export
    pub checkpoints: Vec<u64>,
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            height: 20,
            width: 20,

            init_people: 2,
            initial_wallet: 10,

            rich_threshold: 10,
            debt_threshold: 10,

            reserve_percent: 50,

            move_probability: 1.0,
            trade_probability: 0.5,
            large_trade: 5,
            small_trade: 2,
            wallet_target: 5,
            wallet_floor: 2,
            borrow_limit: 20,

            run_time: 1000,
            seed: 42,

            checkpoints: vec![100, 500, 1000],
            checkpoint_dir: None,
        }
    }
}

impl Config {
    /// Parse a JSON document, filling unspecified fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject parameter sets that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::InvalidGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.init_people == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.reserve_percent > 100 {
            return Err(ConfigError::ReservePercentOutOfRange(self.reserve_percent));
        }
        for (name, p) in [
            ("move_probability", self.move_probability),
            ("trade_probability", self.trade_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::InvalidProbability { name, value: p });
            }
        }
        for (name, value) in [
            ("initial_wallet", self.initial_wallet),
            ("rich_threshold", self.rich_threshold),
            ("debt_threshold", self.debt_threshold),
            ("wallet_floor", self.wallet_floor),
            ("borrow_limit", self.borrow_limit),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeAmount { name, value });
            }
        }
        for (name, value) in [
            ("large_trade", self.large_trade),
            ("small_trade", self.small_trade),
        ] {
            if value <= 0 {
                return Err(ConfigError::NonPositiveTrade { name, value });
            }
        }
        if self.wallet_floor > self.wallet_target {
            return Err(ConfigError::InvertedWalletPolicy {
                floor: self.wallet_floor,
                target: self.wallet_target,
            });
        }
        self.check_money_supply()
    }

    /// Loans add at most `borrow_limit` per person on top of the initial
    /// wallets, and reserve arithmetic multiplies deposits by up to 100.
    fn check_money_supply(&self) -> Result<(), ConfigError> {
        let supply = i64::try_from(self.init_people).ok().and_then(|people| {
            self.initial_wallet
                .checked_add(self.borrow_limit)?
                .checked_mul(people)
        });
        match supply {
            Some(total) if total <= i64::MAX / 100 => Ok(()),
            _ => Err(ConfigError::MoneyOverflow {
                people: self.init_people,
                per_person: self.initial_wallet.saturating_add(self.borrow_limit),
            }),
        }
    }

    /// Money in circulation at step 0.
    pub fn initial_money(&self) -> i64 {
        self.initial_wallet * self.init_people as i64
    }
}
