use num_traits::Saturating;

use crate::lib::{
    amount::{self, Amount},
    ledger::Ledger,
};

/// Aggregated figures over all recorded cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub received: Amount,
    pub expenses: Amount,
    pub free_money: Amount,
    pub paid: Amount,
    pub debt: Amount,
    /// zero if nothing was recorded
    pub average_payment: Amount,
    /// fraction of the initial debt repaid, in thousandths
    pub repaid_per_mille: i64,
}

impl Summary {
    pub fn of(ledger: &Ledger) -> Self {
        let mut sum = Self {
            count: 0,
            received: Amount::ZERO,
            expenses: Amount::ZERO,
            free_money: Amount::ZERO,
            paid: ledger.total_paid(),
            debt: ledger.debt(),
            average_payment: Amount::ZERO,
            repaid_per_mille: 0,
        };
        for cycle in ledger.cycles() {
            sum.count += 1;
            sum.received = sum.received.saturating_add(cycle.received());
            sum.expenses = sum.expenses.saturating_add(cycle.total_expenses());
            sum.free_money = sum.free_money.saturating_add(cycle.free_money());
        }
        if sum.count > 0 {
            sum.average_payment = Amount(sum.paid.cents() / sum.count as i64);
        }
        sum.repaid_per_mille = amount::per_mille(sum.paid, ledger.initial_debt());
        sum
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::{Date, Month},
        entry::{CycleEntry, Expense},
    };

    #[test]
    fn empty_ledger() {
        let l = Ledger::initialize(Amount::units(1000), Date::from(2024, Month::Jan, 3).unwrap())
            .unwrap();
        let s = Summary::of(&l);
        assert_eq!(s.count, 0);
        assert_eq!(s.average_payment, Amount::ZERO);
        assert_eq!(s.repaid_per_mille, 0);
        assert_eq!(s.debt, Amount::units(1000));
    }

    #[test]
    fn totals() {
        let mut l = Ledger::initialize(Amount::units(1000), Date::from(2024, Month::Jan, 3).unwrap())
            .unwrap();
        for (received, rent, pay) in [(500, 200, 100), (400, 0, 50), (300, 100, 101)] {
            let entry = CycleEntry::new(
                Amount::units(received),
                vec![Expense::new("rent", Amount::units(rent))],
                Amount::units(pay),
            );
            l = l.record_cycle(entry).unwrap().0;
        }
        let s = Summary::of(&l);
        assert_eq!(s.count, 3);
        assert_eq!(s.received, Amount::units(1200));
        assert_eq!(s.expenses, Amount::units(300));
        assert_eq!(s.free_money, Amount::units(900));
        assert_eq!(s.paid, Amount::units(251));
        assert_eq!(s.debt, Amount::units(749));
        assert_eq!(s.average_payment, Amount(8366));
        assert_eq!(s.repaid_per_mille, 251);
    }
}
