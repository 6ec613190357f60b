//! Execute commands against the ledger
//!
//! The session owns the current `State` and replaces it after every
//! accepted command. Rejected commands are reported and leave it untouched.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::cli::{
    card::{debt_line, Card, PreviewCard, Status},
    plot::Plotter,
    table::Table,
};
use crate::lib::{
    date::Date,
    ledger::{parse_debt, LedgerError, State},
};
use crate::load::{
    error::{self, Loc},
    parse::{self, Command},
};

/// Whether more commands should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W> {
    state: State,
    out: W,
}

const HELP: &str = "\
Commands:
  debt <amount>                 enter the initial debt (once)
  cycle received <amount> [expense <desc> <amount>]* pay <amount>
                                record the next half-month cycle
  preview [received <amount>] [expense <desc> <amount>]* [pay <amount>]
                                show what a cycle would amount to
  history                       table of all recorded cycles
  status                        current debt and totals
  plot <file.svg>               write a chart of the recorded cycles
  help                          this message
  quit | exit                   end the session
Descriptions with spaces go between double quotes, '#' starts a comment.";

impl<W> Session<W>
where
    W: Write,
{
    /// Empty session whose first cycle will contain `start`
    pub fn new(start: Date, out: W) -> Self {
        Self {
            state: State::new(start),
            out,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Parse and execute all commands in `contents`
    ///
    /// A line that is not a command at all makes the whole input rejected
    /// before anything runs. Well-formed commands with invalid contents
    /// (missing field, unreadable amount) are skipped, the others are
    /// executed in order until the end of the input or a `quit`.
    pub fn run(&mut self, path: &str, contents: &str, errs: &mut error::Record) -> io::Result<Flow> {
        let script = parse::extract(path, errs, contents);
        debug!(path, commands = script.len(), "script parsed");
        for (loc, cmd) in script {
            if self.execute(&loc, cmd, errs)? == Flow::Quit {
                info!("quit requested");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn execute(&mut self, loc: &Loc, cmd: Command, errs: &mut error::Record) -> io::Result<Flow> {
        debug!(command = ?cmd, "executing");
        match cmd {
            Command::Debt(raw) => match parse_debt(raw).and_then(|debt| self.state.initialize(debt)) {
                Ok(state) => {
                    self.state = state;
                    let next = self.state.upcoming();
                    info!(debt = raw, next = %next.label, "debt entered");
                    if let Some(debt) = self.state.debt() {
                        writeln!(self.out, "{}", debt_line(debt, &next.label))?;
                    }
                }
                Err(e) => reject(errs, loc, &e),
            },
            Command::Cycle(entry) => match self.state.record_cycle(entry) {
                Ok((state, cycle)) => {
                    self.state = state;
                    info!(period = cycle.date_range(), payment = %cycle.debt_payment(), "cycle recorded");
                    write!(self.out, "{}", Card(&cycle))?;
                    if let Some(debt) = self.state.debt() {
                        writeln!(self.out, "{}", debt_line(debt, &self.state.upcoming().label))?;
                    }
                }
                Err(e) => reject(errs, loc, &e),
            },
            Command::Preview(entry) => match self.state.ledger() {
                Ok(ledger) => write!(self.out, "{}", PreviewCard(&ledger.preview(&entry)))?,
                Err(e) => reject(errs, loc, &e),
            },
            Command::History => match self.state.ledger() {
                Ok(ledger) => write!(self.out, "{}", Table::from(ledger).with_title("History"))?,
                Err(_) => writeln!(self.out, "No cycles added yet.")?,
            },
            Command::Status => write!(self.out, "{}", Status(&self.state))?,
            Command::Plot(file) => self.plot(loc, file, errs)?,
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn plot(&mut self, loc: &Loc, file: &str, errs: &mut error::Record) -> io::Result<()> {
        let saved = match self.state.ledger() {
            Ok(ledger) => Plotter::from(ledger).save(file),
            Err(_) => Ok(false),
        };
        match saved {
            Ok(true) => {
                info!(file, "chart written");
                writeln!(self.out, "Chart written to '{}'", file)?;
            }
            Ok(false) => {
                errs.make("Nothing to plot")
                    .nonfatal()
                    .span(loc, "requested here")
                    .text("No cycles have been recorded yet")
                    .hint("record a cycle with 'cycle received <amount> pay <amount>'");
            }
            Err(e) => {
                warn!(file, error = %e, "chart not written");
                errs.make("Cannot write chart")
                    .span(loc, "requested here")
                    .text(format!("'{}': {}", file, e))
                    .hint("check that the destination directory exists");
            }
        }
        Ok(())
    }
}

/// Report a command refused by the ledger
fn reject(errs: &mut error::Record, loc: &Loc, err: &LedgerError) {
    warn!(error = %err, "command rejected");
    errs.make(err.title())
        .span(loc, "submitted here")
        .text(err)
        .hint(err.fix_hint());
}
