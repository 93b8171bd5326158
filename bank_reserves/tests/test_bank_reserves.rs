//! Reserve-ratio constraint under arbitrary sequences of bank transactions.

use bank_reserves::{Bank, Person};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Borrow(usize, i64),
    Repay(usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0_usize..4, 0_i64..30).prop_map(|(p, a)| Op::Deposit(p, a)),
        (0_usize..4, 0_i64..30).prop_map(|(p, a)| Op::Withdraw(p, a)),
        (0_usize..4, 1_i64..30).prop_map(|(p, a)| Op::Borrow(p, a)),
        (0_usize..4, 0_i64..30).prop_map(|(p, a)| Op::Repay(p, a)),
    ]
}

#[test]
fn lendable_accounts_for_reserves_and_outstanding_loans() {
    let mut bank = Bank::new(20);
    let mut saver = Person::new(0, (0, 0), 100);
    let mut borrower = Person::new(1, (0, 0), 0);

    bank.accept_deposit(&mut saver, 100);
    assert_eq!(bank.reserves(), 20);
    assert_eq!(bank.lendable(), 80);

    bank.request_loan(&mut borrower, 30).unwrap();
    assert_eq!(bank.lendable(), 50);
    assert_eq!(bank.cash_on_hand(), 70);
}

#[test]
fn denied_loan_is_not_fatal_and_later_loans_still_work() {
    let mut bank = Bank::new(50);
    let mut saver = Person::new(0, (0, 0), 40);
    let mut borrower = Person::new(1, (0, 0), 0);
    bank.accept_deposit(&mut saver, 40);

    assert!(bank.request_loan(&mut borrower, 25).is_err());
    assert!(bank.request_loan(&mut borrower, 20).is_ok());
    assert_eq!(borrower.loans, 20);
}

proptest! {
    #[test]
    fn no_loan_breaches_the_reserve_ratio(
        reserve_percent in 0_u32..=100,
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let mut bank = Bank::new(reserve_percent);
        let mut people: Vec<Person> = (0..4).map(|id| Person::new(id, (0, 0), 25)).collect();
        let initial: i64 = 100;

        for op in ops {
            match op {
                Op::Deposit(p, a) => {
                    bank.accept_deposit(&mut people[p], a);
                }
                Op::Withdraw(p, a) => {
                    bank.withdraw(&mut people[p], a);
                }
                Op::Borrow(p, a) => {
                    let lendable = bank.lendable();
                    let before = people[p].clone();
                    match bank.request_loan(&mut people[p], a) {
                        Ok(()) => {
                            prop_assert!(lendable >= a);
                            prop_assert!(bank.cash_on_hand() >= bank.reserves());
                        }
                        Err(denied) => {
                            prop_assert_eq!(denied.requested, a);
                            prop_assert_eq!(&people[p], &before);
                        }
                    }
                }
                Op::Repay(p, a) => {
                    bank.repay(&mut people[p], a);
                }
            }

            let savings: i64 = people.iter().map(|p| p.savings).sum();
            let loans: i64 = people.iter().map(|p| p.loans).sum();
            let money: i64 = people.iter().map(|p| p.wallet + p.savings).sum();
            prop_assert_eq!(bank.total_deposits(), savings);
            prop_assert_eq!(bank.total_loans(), loans);
            prop_assert_eq!(money, initial + bank.loans_issued() - bank.loans_repaid());
            prop_assert!(people.iter().all(|p| p.wallet >= 0 && p.savings >= 0 && p.loans >= 0));
        }
    }
}
