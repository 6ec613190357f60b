//! Convert a script or a line of input into a stream of commands

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;
/// Wrapper around Pest's `Pairs`
type Pairs<'i> = pest::iterators::Pairs<'i, Rule>;

use crate::lib::{
    amount::Amount,
    date::{Date, Month},
    entry::{CycleEntry, Expense},
};
use crate::load::error::{self, Loc};

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/command.pest"]
pub struct CommandParser;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'i> {
    /// raw text of the initial debt, validated by the ledger
    Debt(&'i str),
    Cycle(CycleEntry),
    Preview(CycleEntry),
    History,
    Status,
    Plot(&'i str),
    Help,
    Quit,
}

/// Commands in the order they appear, each with the text it was read from
pub type Script<'i> = Vec<(Loc<'i>, Command<'i>)>;

/// A field that must be provided at most once
struct Once<'a, T> {
    name: &'static str,
    hint: &'static str,
    loc: &'a Loc<'a>,
    valid: bool,
    data: Option<T>,
}

impl<'a, T> Once<'a, T> {
    fn new(name: &'static str, hint: &'static str, loc: &'a Loc<'a>) -> Self {
        Self {
            name,
            hint,
            loc,
            valid: true,
            data: None,
        }
    }

    fn try_set(&mut self, val: T, errs: &mut error::Record) {
        if self.data.is_some() {
            errs.make("Duplicate field definition")
                .span(self.loc, format!("attempt to override '{}'", self.name))
                .text("Each field may only be defined once")
                .hint("remove one of the field definitions");
            self.valid = false;
        }
        self.data = Some(val);
    }

    /// Value of a mandatory field
    fn try_get(self, errs: &mut error::Record) -> Option<T> {
        if !self.valid {
            return None;
        }
        if self.data.is_none() {
            errs.make("Missing field definition")
                .span(self.loc, format!("'{}' may not be omitted", self.name))
                .text("Each field must be defined once")
                .hint(format!(
                    "add definition for the missing field: '{} {}'",
                    self.name, self.hint
                ));
        }
        self.data
    }

    /// Value of an optional field
    fn get_or(self, default: T) -> Option<T> {
        if self.valid {
            Some(self.data.unwrap_or(default))
        } else {
            None
        }
    }
}

/// Get the commands of `contents`, reading from `path`
///
/// The return value may be non-empty even if some errors (including fatal ones) occured:
/// it contains all commands that were read correctly.
///
/// Caller should determine the success of this function not through its return value
/// but by querying `errs` (e.g. by checking `errs.is_fatal()` or `errs.count_errors()`)
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Script<'i> {
    match CommandParser::parse(Rule::program, contents) {
        Ok(pairs) => validate(path, errs, pairs),
        Err(e) => {
            errs.make("Parsing failure")
                .from(e.with_path(path))
                .hint("type 'help' for the list of commands");
            Vec::new()
        }
    }
}

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        if items.next().is_some() {
            panic!("Several subrules");
        }
        fst
    }};
}

// extract two-element inner
macro_rules! pair {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No 1st"));
        let snd = items.next().unwrap_or_else(|| panic!("No 2nd"));
        assert!(items.next().is_none());
        (fst, snd)
    }};
}

/// Check all commands
///
/// Sequentially validates each command, records errors, accumulates the
/// correct ones into the return value.
pub fn validate<'i>(path: &'i str, errs: &mut error::Record, pairs: Pairs<'i>) -> Script<'i> {
    let mut script = Vec::new();
    for pair in pairs {
        let loc = (path, pair.as_span());
        let cmd = match pair.as_rule() {
            Rule::EOI => continue,
            Rule::cmd_debt => Command::Debt(subrule!(pair).as_str()),
            Rule::cmd_cycle => match validate_cycle(path, errs, pair, true) {
                Some(entry) => Command::Cycle(entry),
                None => continue,
            },
            Rule::cmd_preview => match validate_cycle(path, errs, pair, false) {
                Some(entry) => Command::Preview(entry),
                None => continue,
            },
            Rule::cmd_history => Command::History,
            Rule::cmd_status => Command::Status,
            Rule::cmd_plot => Command::Plot(subrule!(pair).as_str()),
            Rule::cmd_help => Command::Help,
            Rule::cmd_quit => Command::Quit,
            _ => unreachable!("{:?}", pair),
        };
        script.push((loc, cmd));
    }
    script
}

/// Fields of a `cycle` or `preview` command
///
/// In a `cycle` both `received` and `pay` must be provided, a `preview`
/// treats them as zero when omitted.
fn validate_cycle(path: &str, errs: &mut error::Record, pair: Pair, strict: bool) -> Option<CycleEntry> {
    let loc = (path, pair.as_span());
    let mut received = Once::new("received", "<amount>", &loc);
    let mut payment = Once::new("pay", "<amount>", &loc);
    let mut expenses = Vec::new();
    let mut valid = true;
    for field in pair.into_inner() {
        match field.as_rule() {
            Rule::received_field => match validate_amount(path, errs, subrule!(field)) {
                Some(amount) => received.try_set(amount, errs),
                None => valid = false,
            },
            Rule::payment_field => match validate_amount(path, errs, subrule!(field)) {
                Some(amount) => payment.try_set(amount, errs),
                None => valid = false,
            },
            Rule::expense_field => {
                let (desc, amount) = pair!(field);
                let description = match desc.as_rule() {
                    Rule::text => desc.into_inner().next().map(|s| s.as_str()).unwrap_or(""),
                    _ => desc.as_str(),
                };
                match validate_amount(path, errs, amount) {
                    Some(amount) => expenses.push(Expense::new(description, amount)),
                    None => valid = false,
                }
            }
            _ => unreachable!("{:?}", field),
        }
    }
    let (received, payment) = if strict {
        (received.try_get(errs), payment.try_get(errs))
    } else {
        (received.get_or(Amount::ZERO), payment.get_or(Amount::ZERO))
    };
    if !valid {
        return None;
    }
    Some(CycleEntry::new(received?, expenses, payment?))
}

fn validate_amount(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Amount> {
    match pair.as_str().parse::<Amount>() {
        Ok(amount) => Some(amount),
        Err(e) => {
            let loc = (path, pair.as_span());
            errs.make("Invalid amount")
                .span(&loc, "provided here")
                .text(format!("'{}' cannot be read as money: {}", pair.as_str(), e))
                .hint("amounts look like '120', '120.5' or '120.50'");
            None
        }
    }
}

/// Read a `YYYY-Mmm-DD` date, e.g. from a command line argument
pub fn parse_date(path: &str, errs: &mut error::Record, s: &str) -> Option<Date> {
    let pairs = match CommandParser::parse(Rule::date_only, s) {
        Ok(pairs) => pairs,
        Err(e) => {
            errs.make("Invalid date")
                .from(e.with_path(path))
                .hint("dates look like '2024-Jan-16'");
            return None;
        }
    };
    let full = pairs
        .into_iter()
        .find(|p| p.as_rule() == Rule::full_date)?;
    let loc = (path, full.as_span());
    let mut inner = full.into_inner();
    let (year, month, day) = (inner.next()?, inner.next()?, inner.next()?);
    let month = match month.as_str().parse::<Month>() {
        Ok(month) => month,
        Err(e) => {
            errs.make("Invalid month")
                .span(&loc, "provided here")
                .text(&e)
                .hint(e.fix_hint());
            return None;
        }
    };
    // digit counts are bounded by the grammar
    let year = year.as_str().parse::<usize>().ok()?;
    let day = day.as_str().parse::<usize>().ok()?;
    match Date::from(year, month, day) {
        Ok(date) => Some(date),
        Err(e) => {
            errs.make("Invalid date")
                .span(&loc, "provided here")
                .text(&e)
                .hint("choose a date that exists")
                .hint(e.fix_hint());
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::date::Month::*;

    macro_rules! amt {
        ( $n:expr ) => {
            Amount::units($n)
        };
    }

    fn commands(src: &str) -> (Vec<Command<'_>>, error::Record) {
        let mut errs = error::Record::new().plain();
        let script = extract("test", &mut errs, src);
        (script.into_iter().map(|(_, c)| c).collect(), errs)
    }

    #[test]
    fn simple_commands() {
        let (cmds, errs) = commands("debt 1000\nhistory\nstatus\nhelp\nplot out.svg\nquit\nexit");
        assert!(errs.is_empty());
        assert_eq!(
            cmds,
            vec![
                Command::Debt("1000"),
                Command::History,
                Command::Status,
                Command::Help,
                Command::Plot("out.svg"),
                Command::Quit,
                Command::Quit,
            ]
        );
    }

    #[test]
    fn debt_is_kept_raw() {
        let (cmds, errs) = commands("debt lots");
        assert!(errs.is_empty());
        assert_eq!(cmds, vec![Command::Debt("lots")]);
    }

    #[test]
    fn cycle_fields() {
        let (cmds, errs) = commands(
            "cycle received 500 expense rent 200 expense \"weekly groceries\" 50.5 pay 100",
        );
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(
            cmds,
            vec![Command::Cycle(CycleEntry::new(
                amt!(500),
                vec![
                    Expense::new("rent", amt!(200)),
                    Expense::new("weekly groceries", Amount(5050)),
                ],
                amt!(100),
            ))]
        );
    }

    #[test]
    fn cycle_fields_any_order() {
        let (cmds, errs) = commands("cycle pay 50 received 400");
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(
            cmds,
            vec![Command::Cycle(CycleEntry::new(amt!(400), vec![], amt!(50)))]
        );
    }

    #[test]
    fn cycle_missing_field() {
        let (cmds, errs) = commands("cycle received 400");
        assert!(cmds.is_empty());
        assert_eq!(errs.count_errors(), 1);
        assert!(errs.to_string().contains("'pay' may not be omitted"));
    }

    #[test]
    fn cycle_duplicate_field() {
        let (cmds, errs) = commands("cycle received 400 received 300 pay 5");
        assert!(cmds.is_empty());
        assert_eq!(errs.count_errors(), 1);
        assert!(errs.to_string().contains("Duplicate field definition"));
    }

    #[test]
    fn preview_defaults() {
        let (cmds, errs) = commands("preview\npreview expense rent 200");
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(
            cmds,
            vec![
                Command::Preview(CycleEntry::default()),
                Command::Preview(CycleEntry::new(
                    Amount::ZERO,
                    vec![Expense::new("rent", amt!(200))],
                    Amount::ZERO
                )),
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines() {
        let src = "\n# opening balance\ndebt 1000   # from the bank\n\n  \n# first half\ncycle received 10 pay 0\n";
        let (cmds, errs) = commands(src);
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(cmds.len(), 2);
    }

    #[test]
    fn invalid_amount() {
        let (cmds, errs) = commands("cycle received 12.345 pay 0\nstatus");
        assert_eq!(cmds, vec![Command::Status]);
        assert!(errs.to_string().contains("more than two decimal places"));
    }

    #[test]
    fn syntax_error() {
        let (cmds, errs) = commands("debt 1000\nborrow 50");
        assert!(cmds.is_empty());
        assert!(errs.is_fatal());
        assert!(errs.to_string().contains("Parsing failure"));
    }

    #[test]
    fn dates() {
        let mut errs = error::Record::new().plain();
        assert_eq!(
            parse_date("--start", &mut errs, "2024-Jan-16"),
            Some(Date::from(2024, Jan, 16).unwrap())
        );
        assert_eq!(
            parse_date("--start", &mut errs, "2023-Dec-1"),
            Some(Date::from(2023, Dec, 1).unwrap())
        );
        assert!(errs.is_empty());
        assert_eq!(parse_date("--start", &mut errs, "2023-Feb-29"), None);
        assert!(errs.to_string().contains("2023 is not bissextile"));
        let mut errs = error::Record::new().plain();
        assert_eq!(parse_date("--start", &mut errs, "2023-Foo-2"), None);
        assert!(errs.to_string().contains("'Foo' is not a valid month"));
        let mut errs = error::Record::new().plain();
        assert_eq!(parse_date("--start", &mut errs, "2023-01-02"), None);
        assert!(errs.is_fatal());
    }
}
