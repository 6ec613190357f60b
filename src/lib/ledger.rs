//! Running debt and cycle history
//!
//! The ledger is a plain value: every transition takes the current state
//! by reference and hands back a new one, so that a rejected submission
//! cannot leave anything half-applied.

use num_traits::{CheckedSub, Saturating};
use thiserror::Error;

use crate::lib::{
    amount::Amount,
    date::Date,
    entry::{Cycle, CycleEntry},
    period::{compute_period, Period, Slot},
};

/// Everything a submission can be rejected for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("'{0}' is not a valid debt amount")]
    InvalidDebtAmount(String),
    #[error("expenses ({expenses}) exceed received money ({received})")]
    ExpensesExceedIncome { received: Amount, expenses: Amount },
    #[error("debt payment ({payment}) cannot exceed free money ({free})")]
    DebtPaymentExceedsFreeMoney { payment: Amount, free: Amount },
    #[error("{field} cannot be negative, got {amount}")]
    NegativeAmount { field: String, amount: Amount },
    #[error("a debt of {0} has already been entered")]
    AlreadyInitialized(Amount),
    #[error("no debt has been entered yet")]
    NotInitialized,
    #[error("{0} is too large to be represented")]
    AmountOverflow(&'static str),
}

impl LedgerError {
    /// Short name of the failure, for report headers
    pub fn title(&self) -> &'static str {
        use LedgerError::*;
        match self {
            InvalidDebtAmount(_) => "Invalid debt amount",
            ExpensesExceedIncome { .. } => "Expenses exceed received money",
            DebtPaymentExceedsFreeMoney { .. } => "Debt payment exceeds free money",
            NegativeAmount { .. } => "Negative amount",
            AlreadyInitialized(_) => "Debt already entered",
            NotInitialized => "No debt entered",
            AmountOverflow(_) => "Amount out of range",
        }
    }

    /// What message to show to help fix the submission
    pub fn fix_hint(&self) -> String {
        use LedgerError::*;
        match self {
            InvalidDebtAmount(_) => "the debt must be a positive number such as '1500' or '1500.50'".to_string(),
            ExpensesExceedIncome { received, expenses } => format!(
                "remove or lower expenses by at least {}",
                *expenses - *received
            ),
            DebtPaymentExceedsFreeMoney { free, .. } => {
                format!("pay at most {} this cycle", free)
            }
            NegativeAmount { .. } => "amounts are entered as non-negative numbers".to_string(),
            AlreadyInitialized(_) => "the debt is only entered once, record cycles to lower it".to_string(),
            NotInitialized => "start with 'debt <amount>'".to_string(),
            AmountOverflow(_) => format!("keep amounts below {}", Amount::MAX),
        }
    }
}

/// Read the user-provided text of an initial debt
///
/// Anything that is not a strictly positive amount is rejected.
pub fn parse_debt(raw: &str) -> Result<Amount, LedgerError> {
    match raw.parse::<Amount>() {
        Ok(debt) if debt.is_positive() => Ok(debt),
        _ => Err(LedgerError::InvalidDebtAmount(raw.to_string())),
    }
}

/// An active ledger: a debt exists and cycles can be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    initial_debt: Amount,
    debt: Amount,
    cycles: Vec<Cycle>,
    /// first day of the period the next cycle will represent
    next_start: Date,
}

/// What the next submission would look like, without recording it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub slot: Slot,
    pub free_money: Amount,
    pub remaining_free_money: Amount,
    /// `Err` if submitting the entry as-is would be rejected
    pub verdict: Result<(), LedgerError>,
}

impl Ledger {
    /// Open a ledger with a strictly positive debt
    ///
    /// `start` may be any day, the first cycle is the half-month containing it.
    pub fn initialize(debt: Amount, start: Date) -> Result<Self, LedgerError> {
        if !debt.is_positive() {
            return Err(LedgerError::InvalidDebtAmount(debt.to_string()));
        }
        Ok(Self {
            initial_debt: debt,
            debt,
            cycles: Vec::new(),
            next_start: Period::containing(start).start(),
        })
    }

    /// Current debt, negative if overpaid
    pub fn debt(&self) -> Amount {
        self.debt
    }

    pub fn initial_debt(&self) -> Amount {
        self.initial_debt
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn next_start(&self) -> Date {
        self.next_start
    }

    pub fn total_paid(&self) -> Amount {
        self.cycles
            .iter()
            .fold(Amount::ZERO, |acc, c| acc.saturating_add(c.debt_payment()))
    }

    /// Slot of the next cycle to be recorded
    ///
    /// Both previews and recording go through this, so that the label shown
    /// before submitting is always the one that gets recorded.
    pub fn upcoming(&self) -> Slot {
        compute_period(self.next_start)
    }

    pub fn preview(&self, entry: &CycleEntry) -> Preview {
        let free_money = entry.free_money();
        Preview {
            slot: self.upcoming(),
            free_money,
            remaining_free_money: free_money.saturating_sub(entry.debt_payment),
            verdict: entry.validate().map(|_| ()),
        }
    }

    /// Append a cycle, lowering the debt by its payment
    ///
    /// On success returns the new state along with the recorded cycle,
    /// `self` is left untouched either way.
    pub fn record_cycle(&self, entry: CycleEntry) -> Result<(Self, Cycle), LedgerError> {
        let slot = self.upcoming();
        let cycle = entry.settle(&slot)?;
        let debt = self
            .debt
            .checked_sub(&cycle.debt_payment())
            .ok_or(LedgerError::AmountOverflow("remaining debt"))?;
        let mut cycles = self.cycles.clone();
        cycles.push(cycle.clone());
        let next = Self {
            initial_debt: self.initial_debt,
            debt,
            cycles,
            next_start: slot.next_start,
        };
        Ok((next, cycle))
    }

    /// Cycles in entry order, each with the debt as it was right after it
    pub fn history(&self) -> History<'_> {
        History {
            debt: self.initial_debt,
            cycles: self.cycles.iter(),
        }
    }
}

/// Iterator returned by `Ledger::history`
pub struct History<'l> {
    debt: Amount,
    cycles: std::slice::Iter<'l, Cycle>,
}

impl<'l> Iterator for History<'l> {
    type Item = (&'l Cycle, Amount);

    fn next(&mut self) -> Option<Self::Item> {
        let cycle = self.cycles.next()?;
        self.debt = self.debt.saturating_sub(cycle.debt_payment());
        Some((cycle, self.debt))
    }
}

/// The ledger before and after the initial debt is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// `start` is the reference date for the first cycle
    Uninitialized { start: Date },
    Active(Ledger),
}

impl State {
    pub fn new(start: Date) -> Self {
        State::Uninitialized { start }
    }

    /// One-way transition to `Active`
    pub fn initialize(&self, debt: Amount) -> Result<Self, LedgerError> {
        match self {
            State::Uninitialized { start } => Ok(State::Active(Ledger::initialize(debt, *start)?)),
            State::Active(ledger) => Err(LedgerError::AlreadyInitialized(ledger.debt())),
        }
    }

    pub fn record_cycle(&self, entry: CycleEntry) -> Result<(Self, Cycle), LedgerError> {
        let (ledger, cycle) = self.ledger()?.record_cycle(entry)?;
        Ok((State::Active(ledger), cycle))
    }

    pub fn ledger(&self) -> Result<&Ledger, LedgerError> {
        match self {
            State::Uninitialized { .. } => Err(LedgerError::NotInitialized),
            State::Active(ledger) => Ok(ledger),
        }
    }

    /// `None` until a debt is entered
    pub fn debt(&self) -> Option<Amount> {
        self.ledger().ok().map(Ledger::debt)
    }

    /// Slot the next cycle will get, known even before the debt is entered
    pub fn upcoming(&self) -> Slot {
        match self {
            State::Uninitialized { start } => compute_period(*start),
            State::Active(ledger) => ledger.upcoming(),
        }
    }
}
