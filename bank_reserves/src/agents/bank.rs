use crate::agents::Person;
use crate::error::LoanDenied;

// ─────────────────────────────────────────────────────────────────────────────
// Bank ledger
// ─────────────────────────────────────────────────────────────────────────────

/// The single bank of a run.
///
/// Every transaction goes through one of the methods below, which move money
/// between the bank's books and the person's balances in the same call.
#[derive(Clone, Debug)]
pub struct Bank {
    reserve_percent: u32,
    deposits: i64,
    loans: i64,
    loans_issued: i64,
    loans_repaid: i64,
}

impl Bank {
    pub fn new(reserve_percent: u32) -> Self {
        Bank {
            reserve_percent,
            deposits: 0,
            loans: 0,
            loans_issued: 0,
            loans_repaid: 0,
        }
    }

    // ─── Balance sheet ──────────────────────────────────────────────────────

    pub fn reserve_percent(&self) -> u32 {
        self.reserve_percent
    }

    pub fn total_deposits(&self) -> i64 {
        self.deposits
    }

    pub fn total_loans(&self) -> i64 {
        self.loans
    }

    /// Cumulative amount ever lent out.
    pub fn loans_issued(&self) -> i64 {
        self.loans_issued
    }

    /// Cumulative amount ever paid back.
    pub fn loans_repaid(&self) -> i64 {
        self.loans_repaid
    }

    /// Deposits that must be held back, rounded up.
    pub fn reserves(&self) -> i64 {
        let required = i128::from(self.deposits.max(0)) * i128::from(self.reserve_percent);
        ((required + 99) / 100) as i64
    }

    /// Deposits not currently lent out.
    pub fn cash_on_hand(&self) -> i64 {
        self.deposits - self.loans
    }

    /// Upper bound on new lending. Negative once withdrawals have eaten into
    /// the reserves.
    pub fn lendable(&self) -> i64 {
        self.deposits - self.reserves() - self.loans
    }

    pub fn can_lend(&self, amount: i64) -> bool {
        amount > 0 && self.lendable() >= amount
    }

    // ─── Transactions ───────────────────────────────────────────────────────

    /// Move up to `amount` from the wallet into savings.
    pub fn accept_deposit(&mut self, person: &mut Person, amount: i64) -> i64 {
        let amount = amount.min(person.wallet).max(0);
        person.wallet -= amount;
        person.savings += amount;
        self.deposits += amount;
        amount
    }

    /// Move up to `amount` from savings back into the wallet.
    pub fn withdraw(&mut self, person: &mut Person, amount: i64) -> i64 {
        let amount = amount.min(person.savings).max(0);
        person.savings -= amount;
        person.wallet += amount;
        self.deposits -= amount;
        amount
    }

    /// Lend `amount` if it fits within the lendable funds. Borrowed money is
    /// new cash in the borrower's wallet.
    pub fn request_loan(&mut self, person: &mut Person, amount: i64) -> Result<(), LoanDenied> {
        if !self.can_lend(amount) {
            return Err(LoanDenied {
                requested: amount,
                lendable: self.lendable(),
            });
        }
        self.loans += amount;
        self.loans_issued += amount;
        person.loans += amount;
        person.wallet += amount;
        debug_assert!(self.cash_on_hand() >= self.reserves());
        Ok(())
    }

    /// Pay back `min(amount, outstanding, wallet)`; overpayment is clamped.
    pub fn repay(&mut self, person: &mut Person, amount: i64) -> i64 {
        let amount = amount.min(person.loans).min(person.wallet).max(0);
        person.loans -= amount;
        person.wallet -= amount;
        self.loans -= amount;
        self.loans_repaid += amount;
        amount
    }
}
