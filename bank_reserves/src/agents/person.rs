use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::grid::{Position, MOORE_OFFSETS};
use crate::state::BankReservesState;

// ─────────────────────────────────────────────────────────────────────────────
// Data stored in BankReservesState::people
// ─────────────────────────────────────────────────────────────────────────────

/// Population category used by the metrics collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WealthClass {
    Rich,
    MiddleClass,
    Poor,
}

/// All mutable state for a single person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub id: usize,
    pub pos: Position,
    pub wallet: i64,
    pub savings: i64,
    pub loans: i64,
}

impl Person {
    pub fn new(id: usize, pos: Position, wallet: i64) -> Self {
        Person {
            id,
            pos,
            wallet,
            savings: 0,
            loans: 0,
        }
    }

    pub fn wealth(&self) -> i64 {
        self.wallet + self.savings - self.loans
    }

    /// Debt is checked before savings, so a heavily indebted saver counts as
    /// poor and every person lands in exactly one class.
    pub fn classify(&self, rich_threshold: i64, debt_threshold: i64) -> WealthClass {
        if self.loans > debt_threshold {
            WealthClass::Poor
        } else if self.savings > rich_threshold {
            WealthClass::Rich
        } else {
            WealthClass::MiddleClass
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Activation
// ─────────────────────────────────────────────────────────────────────────────

/// Run one activation of person `id`: move, trade, balance the books, then
/// borrow or repay.
pub fn activate(state: &mut BankReservesState, id: usize) {
    random_move(state, id);
    do_business(state, id);
    balance_books(state, id);
    settle_loans(state, id);
}

fn random_move(state: &mut BankReservesState, id: usize) {
    if !state.rng.gen_bool(state.config.move_probability) {
        return;
    }
    let (dx, dy) = MOORE_OFFSETS[state.rng.gen_range(0..MOORE_OFFSETS.len())];
    if let Some(pos) = state.grid.move_by(id, dx, dy) {
        state.people[id].pos = pos;
    }
}

/// Pay a random cellmate a small or large amount. Both parties need cash.
fn do_business(state: &mut BankReservesState, id: usize) {
    let peers = state.grid.neighbors_at(state.people[id].pos, id);
    let Some(&peer) = peers.choose(&mut state.rng) else {
        return;
    };
    if !state.rng.gen_bool(state.config.trade_probability) {
        return;
    }
    let size = if state.rng.gen_bool(0.5) {
        state.config.large_trade
    } else {
        state.config.small_trade
    };

    let payer_wallet = state.people[id].wallet;
    if payer_wallet == 0 || state.people[peer].wallet == 0 {
        return;
    }
    let amount = size.min(payer_wallet);
    state.people[id].wallet -= amount;
    state.people[peer].wallet += amount;
}

/// Park surplus cash in savings, or top the wallet back up to the floor.
fn balance_books(state: &mut BankReservesState, id: usize) {
    let target = state.config.wallet_target;
    let floor = state.config.wallet_floor;
    let person = &mut state.people[id];
    let bank = &mut state.bank;

    if person.wallet > target {
        let surplus = person.wallet - target;
        bank.accept_deposit(person, surplus);
    } else if person.wallet < floor && person.savings > 0 {
        let shortfall = floor - person.wallet;
        bank.withdraw(person, shortfall);
    }
}

/// Borrow when still short of cash, otherwise pay debt out of savings.
fn settle_loans(state: &mut BankReservesState, id: usize) {
    let floor = state.config.wallet_floor;
    let borrow_limit = state.config.borrow_limit;
    let person = &mut state.people[id];
    let bank = &mut state.bank;

    if person.wallet < floor && person.loans < borrow_limit {
        let amount = (floor - person.wallet).min(borrow_limit - person.loans);
        if let Err(denied) = bank.request_loan(person, amount) {
            debug!(
                person = id,
                requested = denied.requested,
                lendable = denied.lendable,
                "loan denied"
            );
            state.loan_denials += 1;
        }
    } else if person.loans > 0 && person.savings > 0 {
        let amount = person.loans.min(person.savings);
        let withdrawn = bank.withdraw(person, amount);
        bank.repay(person, withdrawn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// Two people sharing cell (3, 3), each starting with `initial_wallet`.
    fn pair(config: Config) -> BankReservesState {
        let mut state = BankReservesState::new(
            Config {
                init_people: 2,
                move_probability: 0.0,
                trade_probability: 1.0,
                ..config
            },
            7,
        )
        .unwrap();
        for id in 0..2 {
            state.people[id].pos = state.grid.place(id, 3, 3);
        }
        state
    }

    fn deposit(state: &mut BankReservesState, id: usize, amount: i64) {
        let BankReservesState { people, bank, .. } = state;
        bank.accept_deposit(&mut people[id], amount);
    }

    #[test]
    fn trade_moves_a_small_or_large_amount() {
        let mut state = pair(Config::default());
        do_business(&mut state, 0);
        let paid = 10 - state.people[0].wallet;
        assert!(paid == 5 || paid == 2, "paid {paid}");
        assert_eq!(state.people[1].wallet, 10 + paid);
    }

    #[test]
    fn trade_is_clamped_to_the_payer_wallet() {
        let mut state = pair(Config::default());
        state.people[0].wallet = 1;
        state.people[1].wallet = 4;
        do_business(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[1].wallet), (0, 5));
    }

    #[test]
    fn no_trade_when_either_wallet_is_empty() {
        let mut state = pair(Config::default());
        state.people[1].wallet = 0;
        do_business(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[1].wallet), (10, 0));

        state.people[0].wallet = 0;
        state.people[1].wallet = 10;
        do_business(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[1].wallet), (0, 10));
    }

    #[test]
    fn no_trade_without_a_cellmate() {
        let mut state = pair(Config::default());
        state.people[1].pos = state.grid.place(1, 9, 9);
        do_business(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[1].wallet), (10, 10));
    }

    #[test]
    fn only_the_surplus_above_target_is_deposited() {
        let mut state = pair(Config::default());
        state.people[0].wallet = 9;
        balance_books(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[0].savings), (5, 4));
        assert_eq!(state.bank.total_deposits(), 4);
    }

    #[test]
    fn withdrawal_tops_the_wallet_up_to_the_floor() {
        let mut state = pair(Config::default());
        deposit(&mut state, 0, 10);
        balance_books(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[0].savings), (2, 8));
        assert_eq!(state.bank.total_deposits(), 8);
    }

    #[test]
    fn loan_covers_the_gap_to_the_floor() {
        let mut state = pair(Config {
            reserve_percent: 0,
            ..Config::default()
        });
        deposit(&mut state, 1, 10);
        state.people[1].wallet += state.people[0].wallet;
        state.people[0].wallet = 0;

        settle_loans(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[0].loans), (2, 2));
        assert_eq!(state.bank.total_loans(), 2);
        assert_eq!(state.loan_denials, 0);
    }

    #[test]
    fn loan_is_capped_by_the_borrow_limit() {
        let mut state = pair(Config {
            reserve_percent: 0,
            borrow_limit: 3,
            ..Config::default()
        });
        deposit(&mut state, 1, 10);
        state.people[1].wallet += state.people[0].wallet;
        state.people[0].wallet = 0;

        settle_loans(&mut state, 0);
        state.people[1].wallet += state.people[0].wallet;
        state.people[0].wallet = 0;
        settle_loans(&mut state, 0);

        assert_eq!((state.people[0].wallet, state.people[0].loans), (1, 3));
        settle_loans(&mut state, 0);
        assert_eq!(state.people[0].loans, 3);
    }

    #[test]
    fn denied_loan_is_counted_and_changes_nothing() {
        let mut state = pair(Config {
            reserve_percent: 100,
            ..Config::default()
        });
        deposit(&mut state, 1, 10);
        state.people[0].wallet = 0;

        settle_loans(&mut state, 0);
        assert_eq!((state.people[0].wallet, state.people[0].loans), (0, 0));
        assert_eq!(state.loan_denials, 1);
        assert_eq!(state.bank.loans_issued(), 0);
    }

    #[test]
    fn debt_is_repaid_out_of_savings() {
        let mut state = pair(Config {
            reserve_percent: 0,
            ..Config::default()
        });
        deposit(&mut state, 1, 10);
        {
            let BankReservesState { people, bank, .. } = &mut state;
            bank.request_loan(&mut people[0], 4).unwrap();
        }
        deposit(&mut state, 0, 11);
        assert_eq!((state.people[0].wallet, state.people[0].savings), (3, 11));

        settle_loans(&mut state, 0);
        let p = &state.people[0];
        assert_eq!((p.wallet, p.savings, p.loans), (3, 7, 0));
        assert_eq!(state.bank.loans_repaid(), 4);
        assert_eq!(state.bank.total_loans(), 0);
        assert!(state.is_consistent());
    }

    #[test]
    fn wealth_nets_loans_against_holdings() {
        let p = Person {
            id: 0,
            pos: (0, 0),
            wallet: 3,
            savings: 12,
            loans: 5,
        };
        assert_eq!(p.wealth(), 10);
    }

    #[test]
    fn debt_takes_precedence_over_savings() {
        let p = Person {
            id: 0,
            pos: (0, 0),
            wallet: 0,
            savings: 50,
            loans: 11,
        };
        assert_eq!(p.classify(10, 10), WealthClass::Poor);
    }

    #[test]
    fn classification_boundaries() {
        let mut p = Person::new(0, (0, 0), 0);
        p.savings = 10;
        p.loans = 10;
        assert_eq!(p.classify(10, 10), WealthClass::MiddleClass);
        p.savings = 11;
        assert_eq!(p.classify(10, 10), WealthClass::Rich);
        p.loans = 11;
        assert_eq!(p.classify(10, 10), WealthClass::Poor);
    }
}
