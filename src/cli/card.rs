//! Short textual summaries printed after each command

use std::fmt;

use crate::lib::{
    amount::Amount,
    entry::Cycle,
    ledger::{Preview, State},
    summary::Summary,
};

/// Everything about one recorded cycle
pub struct Card<'c>(pub &'c Cycle);

impl fmt::Display for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = self.0;
        writeln!(f, "== {} ==", c.date_range())?;
        writeln!(f, "Received: {}", c.received())?;
        if !c.expenses().is_empty() {
            writeln!(f, "Expenses:")?;
            for e in c.expenses() {
                writeln!(f, "  - {}", e)?;
            }
        }
        writeln!(f, "Free Money: {}", c.free_money())?;
        writeln!(f, "Debt Payment: {}", c.debt_payment())?;
        writeln!(f, "Remaining Free Money: {}", c.remaining_free_money())
    }
}

/// What a cycle submission would amount to
pub struct PreviewCard<'p>(pub &'p Preview);

impl fmt::Display for PreviewCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = self.0;
        writeln!(f, "Cycle Date Range: {}", p.slot.label)?;
        writeln!(f, "Free Money Available: {}", p.free_money)?;
        writeln!(f, "Remaining Free Money: {}", p.remaining_free_money)?;
        match &p.verdict {
            Ok(()) => writeln!(f, "Ready to submit."),
            Err(e) => writeln!(f, "Would be rejected: {}", e),
        }
    }
}

/// Headline figures of the whole session
pub struct Status<'s>(pub &'s State);

impl fmt::Display for Status<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.0;
        let next = state.upcoming().label;
        let ledger = match state.ledger() {
            Ok(ledger) => ledger,
            Err(_) => return write!(f, "Current Debt: N/A\nNext Cycle: {}\n", next),
        };
        let sum = Summary::of(ledger);
        writeln!(f, "Current Debt: {}", sum.debt)?;
        writeln!(f, "Next Cycle: {}", next)?;
        writeln!(f, "Cycles: {}", sum.count)?;
        writeln!(f, "Total Received: {}", sum.received)?;
        writeln!(f, "Total Expenses: {}", sum.expenses)?;
        writeln!(f, "Total Free Money: {}", sum.free_money)?;
        writeln!(f, "Total Paid: {} of {}", sum.paid, ledger.initial_debt())?;
        writeln!(f, "Average Payment: {}", sum.average_payment)?;
        writeln!(
            f,
            "Repaid: {}.{}%",
            sum.repaid_per_mille / 10,
            (sum.repaid_per_mille % 10).abs()
        )
    }
}

/// Single line shown whenever the debt changes
pub fn debt_line(debt: Amount, next: &str) -> String {
    format!("Current Debt: {} (next cycle: {})", debt, next)
}
