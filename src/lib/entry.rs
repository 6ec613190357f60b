//! What a cycle is made of
//!
//! A `CycleEntry` is what the user submits, a `Cycle` is what the ledger
//! keeps once the submission has been validated. Derived figures of a
//! `Cycle` are computed once and frozen.

use std::fmt;

use num_traits::{CheckedSub, Saturating};

use crate::lib::{
    amount::{self, Amount},
    ledger::LedgerError,
    period::{Period, Slot},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub description: String,
    pub amount: Amount,
}

impl Expense {
    pub fn new<S>(description: S, amount: Amount) -> Self
    where
        S: ToString,
    {
        Self {
            description: description.to_string(),
            amount,
        }
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.amount)
    }
}

/// Payload of a cycle submission, not yet validated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleEntry {
    pub received: Amount,
    pub expenses: Vec<Expense>,
    pub debt_payment: Amount,
}

impl CycleEntry {
    pub fn new(received: Amount, expenses: Vec<Expense>, debt_payment: Amount) -> Self {
        Self {
            received,
            expenses,
            debt_payment,
        }
    }

    /// Saturates instead of overflowing, `validate` reports the overflow
    pub fn total_expenses(&self) -> Amount {
        self.expenses
            .iter()
            .fold(Amount::ZERO, |acc, e| acc.saturating_add(e.amount))
    }

    /// Received money minus all expenses, possibly negative
    pub fn free_money(&self) -> Amount {
        self.received.saturating_sub(self.total_expenses())
    }

    /// Check the submission, returns the free money on success
    ///
    /// Negative inputs are reported first, then overspending, then
    /// a debt payment too large for what is left.
    pub fn validate(&self) -> Result<Amount, LedgerError> {
        if self.received.is_negative() {
            return Err(LedgerError::NegativeAmount {
                field: "received money".to_string(),
                amount: self.received,
            });
        }
        if let Some(e) = self.expenses.iter().find(|e| e.amount.is_negative()) {
            return Err(LedgerError::NegativeAmount {
                field: format!("expense '{}'", e.description),
                amount: e.amount,
            });
        }
        if self.debt_payment.is_negative() {
            return Err(LedgerError::NegativeAmount {
                field: "debt payment".to_string(),
                amount: self.debt_payment,
            });
        }
        let expenses = amount::checked_sum(self.expenses.iter().map(|e| e.amount))
            .ok_or(LedgerError::AmountOverflow("sum of expenses"))?;
        let free = self
            .received
            .checked_sub(&expenses)
            .ok_or(LedgerError::AmountOverflow("free money"))?;
        if free.is_negative() {
            return Err(LedgerError::ExpensesExceedIncome {
                received: self.received,
                expenses,
            });
        }
        if self.debt_payment > free {
            return Err(LedgerError::DebtPaymentExceedsFreeMoney {
                payment: self.debt_payment,
                free,
            });
        }
        Ok(free)
    }

    /// Validate and freeze into a cycle for the given slot
    pub fn settle(self, slot: &Slot) -> Result<Cycle, LedgerError> {
        let free_money = self.validate()?;
        Ok(Cycle {
            received: self.received,
            expenses: self.expenses,
            debt_payment: self.debt_payment,
            free_money,
            date_range: slot.label.clone(),
            period: slot.period,
        })
    }
}

/// One recorded half-month settlement
///
/// Immutable: there is no way to edit a cycle once it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    received: Amount,
    expenses: Vec<Expense>,
    debt_payment: Amount,
    free_money: Amount,
    date_range: String,
    period: Period,
}

impl Cycle {
    pub fn received(&self) -> Amount {
        self.received
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn total_expenses(&self) -> Amount {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn debt_payment(&self) -> Amount {
        self.debt_payment
    }

    /// Received money minus expenses, as of recording
    pub fn free_money(&self) -> Amount {
        self.free_money
    }

    /// What is left once the debt payment is taken out of the free money
    pub fn remaining_free_money(&self) -> Amount {
        self.free_money - self.debt_payment
    }

    pub fn date_range(&self) -> &str {
        &self.date_range
    }

    pub fn period(&self) -> Period {
        self.period
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::{Date, Month::*},
        period::compute_period,
    };

    fn entry(received: i64, expenses: &[(&str, i64)], payment: i64) -> CycleEntry {
        CycleEntry::new(
            Amount::units(received),
            expenses
                .iter()
                .map(|(d, a)| Expense::new(d, Amount::units(*a)))
                .collect(),
            Amount::units(payment),
        )
    }

    #[test]
    fn free_money() {
        let e = entry(500, &[("rent", 200), ("food", 50)], 100);
        assert_eq!(e.total_expenses(), Amount::units(250));
        assert_eq!(e.free_money(), Amount::units(250));
        assert_eq!(e.validate(), Ok(Amount::units(250)));
        assert_eq!(entry(400, &[], 0).validate(), Ok(Amount::units(400)));
    }

    #[test]
    fn overspending() {
        assert_eq!(
            entry(100, &[("x", 150)], 0).validate(),
            Err(LedgerError::ExpensesExceedIncome {
                received: Amount::units(100),
                expenses: Amount::units(150),
            })
        );
    }

    #[test]
    fn payment_limit() {
        // spending everything on the debt is fine
        assert_eq!(entry(300, &[("rent", 100)], 200).validate(), Ok(Amount::units(200)));
        assert_eq!(
            entry(300, &[("rent", 100)], 201).validate(),
            Err(LedgerError::DebtPaymentExceedsFreeMoney {
                payment: Amount::units(201),
                free: Amount::units(200),
            })
        );
    }

    #[test]
    fn negative_inputs() {
        assert!(matches!(
            entry(-1, &[], 0).validate(),
            Err(LedgerError::NegativeAmount { .. })
        ));
        assert_eq!(
            entry(100, &[("refund", -20)], 0).validate(),
            Err(LedgerError::NegativeAmount {
                field: "expense 'refund'".to_string(),
                amount: Amount::units(-20),
            })
        );
        assert!(matches!(
            entry(100, &[], -5).validate(),
            Err(LedgerError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn huge_expenses_are_not_wrapped() {
        let big = Amount(9_000_000_000_000_000_000);
        let e = CycleEntry::new(
            Amount::ZERO,
            vec![Expense::new("a", big), Expense::new("b", big)],
            Amount::units(100),
        );
        assert_eq!(
            e.validate(),
            Err(LedgerError::AmountOverflow("sum of expenses"))
        );
        assert_eq!(e.total_expenses(), Amount(i64::MAX));
        assert!(e.free_money().is_negative());
    }

    #[test]
    fn settle_freezes_label() {
        let slot = compute_period(Date::from(2024, Feb, 20).unwrap());
        let cycle = entry(500, &[("rent", 200)], 100).settle(&slot).unwrap();
        assert_eq!(cycle.date_range(), "16-29 Feb");
        assert_eq!(cycle.free_money(), Amount::units(300));
        assert_eq!(cycle.remaining_free_money(), Amount::units(200));
        assert_eq!(cycle.period(), slot.period);
        assert_eq!(cycle.expenses()[0].to_string(), "rent: 200");
    }
}
