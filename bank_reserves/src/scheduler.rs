use std::fmt;

use krabmaga::engine::{agent::Agent, state::State};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::agents;
use crate::state::BankReservesState;

/// A fresh uniformly random permutation of `0..n`.
pub fn activation_order<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

// ─────────────────────────────────────────────────────────────────────────────
// krabmaga Agent proxy for random activation
// ─────────────────────────────────────────────────────────────────────────────

/// Proxy agent that activates the whole population once per step.
///
/// krabmaga steps this single proxy; the proxy shuffles the people with the
/// run's own RNG and activates each of them sequentially in that order, so
/// no person systematically acts first and a fixed seed reproduces the run.
#[derive(Clone)]
pub struct RandomActivation;

impl fmt::Display for RandomActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomActivation")
    }
}

impl Agent for RandomActivation {
    fn step(&mut self, state: &mut dyn State) {
        let state = state
            .as_any_mut()
            .downcast_mut::<BankReservesState>()
            .expect("state should be BankReservesState");

        let order = activation_order(state.people.len(), &mut state.rng);
        for &id in &order {
            agents::activate(state, id);
        }
        state.last_order = order;
    }
}
