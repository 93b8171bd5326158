//! Per-step aggregation of population statistics.
//!
//! [`MetricsCollector::collect`] is a pure linear scan over the people: it
//! reads balances and never mutates them. Model-level aggregates go into a
//! [`MetricsRow`]; agent-level values come from a registry of named
//! [`AgentExtractor`]s.

use std::collections::BTreeMap;

use crate::agents::{Person, WealthClass};

/// Maps a person to one reported value.
pub type AgentExtractor = fn(&Person) -> f64;

fn wealth(person: &Person) -> f64 {
    person.wealth() as f64
}

/// Model-level aggregates for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsRow {
    pub step: u64,
    pub rich: usize,
    pub poor: usize,
    pub middle: usize,
    pub savings: i64,
    pub wallets: i64,
    pub money: i64,
    pub loans: i64,
}

impl MetricsRow {
    pub fn population(&self) -> usize {
        self.rich + self.poor + self.middle
    }
}

/// Agent-level values for one person at one step, in reporter-name order.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentRecord {
    pub step: u64,
    pub agent_id: usize,
    pub values: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct MetricsCollector {
    rich_threshold: i64,
    debt_threshold: i64,
    reporters: BTreeMap<String, AgentExtractor>,
    rows: Vec<MetricsRow>,
    agent_records: Vec<AgentRecord>,
}

impl MetricsCollector {
    /// Collector with the default `Wealth` agent reporter.
    pub fn new(rich_threshold: i64, debt_threshold: i64) -> Self {
        let mut reporters: BTreeMap<String, AgentExtractor> = BTreeMap::new();
        reporters.insert("Wealth".to_string(), wealth);
        MetricsCollector {
            rich_threshold,
            debt_threshold,
            reporters,
            rows: Vec::new(),
            agent_records: Vec::new(),
        }
    }

    /// Add or replace an agent reporter. Applies to later collections only.
    pub fn register_agent_reporter(&mut self, name: impl Into<String>, extractor: AgentExtractor) {
        self.reporters.insert(name.into(), extractor);
    }

    pub fn agent_reporter_names(&self) -> Vec<&str> {
        self.reporters.keys().map(String::as_str).collect()
    }

    /// Aggregate the current population and append the row for `step`.
    pub fn collect(&mut self, step: u64, people: &[Person]) -> MetricsRow {
        let mut row = MetricsRow {
            step,
            ..MetricsRow::default()
        };
        for person in people {
            match person.classify(self.rich_threshold, self.debt_threshold) {
                WealthClass::Rich => row.rich += 1,
                WealthClass::Poor => row.poor += 1,
                WealthClass::MiddleClass => row.middle += 1,
            }
            row.savings += person.savings;
            row.wallets += person.wallet;
            row.loans += person.loans;

            self.agent_records.push(AgentRecord {
                step,
                agent_id: person.id,
                values: self.reporters.values().map(|f| f(person)).collect(),
            });
        }
        row.money = row.wallets + row.savings;
        self.rows.push(row);
        row
    }

    /// Rows collected so far, one per step, in step order.
    pub fn trajectory(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn agent_records(&self) -> &[AgentRecord] {
        &self.agent_records
    }

    /// Values of one agent reporter for every person at `step`.
    pub fn agent_values(&self, name: &str, step: u64) -> Option<Vec<(usize, f64)>> {
        let column = self.reporters.keys().position(|k| k == name)?;
        Some(
            self.agent_records
                .iter()
                .filter(|r| r.step == step)
                .filter_map(|r| r.values.get(column).map(|&v| (r.agent_id, v)))
                .collect(),
        )
    }

    pub fn into_trajectory(self) -> Vec<MetricsRow> {
        self.rows
    }
}
