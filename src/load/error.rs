//! Pretty-printing facility for error messages
//!
//! A wrapper around `pest::error::Error::new_from_span` for the code blocks,
//! `Error` only adds aggregation of messages as well as colored output.
//!
//! # Example
//!
//! ```txt
//! errs.make("Debt payment exceeds free money")
//!     .span(&loc, "submitted here")
//!     .text("debt payment (350) cannot exceed free money (300)")
//!     .hint("pay at most 300 this cycle");
//! ```
//!
//! ```txt
//! --> Error: Debt payment exceeds free money
//!  |     --> march.txt:4:1
//!  |      |
//!  |    4 | cycle received 500 expense rent 200 pay 350
//!  |      | ^-----------------------------------------^
//!  |      |
//!  |      = submitted here
//!  |  debt payment (350) cannot exceed free money (300)
//!  |      ? hint: pay at most 300 this cycle
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// Location of an error
///
/// Contains information on the file in which the error
/// occured and the precise span within that file
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single error
///
/// All messages (`label` passed with `new`, arguments of `hint`
/// and `text`) should fit in a single line.
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// determines the error label (warning/error) and the color (yellow/red)
    fatal: bool,
    /// name of the error
    label: String,
    items: Vec<Item>,
}

/// Kinds of items that can be added to an error report
#[derive(Debug)]
enum Item {
    /// code block
    Block(pest::error::Error<Rule>),
    /// important message
    Text(String),
    /// recommendations for fixes
    Hint(String),
}

/// Escape sequences used to render a report
#[derive(Debug)]
pub struct Palette {
    red: &'static str,
    yellow: &'static str,
    blue: &'static str,
    white: &'static str,
    none: &'static str,
}

pub static COLORED: Palette = Palette {
    red: "\x1b[0;91;1m",
    yellow: "\x1b[0;93;1m",
    blue: "\x1b[0;96;1m",
    white: "\x1b[0;1m",
    none: "\x1b[0m",
};

pub static PLAIN: Palette = Palette {
    red: "",
    yellow: "",
    blue: "",
    white: "",
    none: "",
};

/// A collection of errors
///
/// Typically to keep record of all errors detected in one script,
/// but the structure itself makes no assumption regarding the
/// relationship between these errors
#[must_use]
#[derive(Debug)]
pub struct Record {
    fatal: usize,
    contents: Vec<Error>,
    palette: &'static Palette,
}

impl Error {
    /// Create a new error
    pub fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Mark as a warning rather that a fatal error
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Add a pre-existing error (e.g. to build from a parsing error)
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items.push(Item::Block(err.renamed_rules(rule_rename)));
        self
    }

    /// Add a code block and its associated message
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1.clone(),
            )
            .with_path(loc.0),
        ));
        self
    }

    /// Add an important note
    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, pal: &Palette) -> fmt::Result {
        let (color, header) = if self.fatal {
            (pal.red, "--> Error")
        } else {
            (pal.yellow, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, pal.white, self.label, pal.none)?;
        for item in &self.items {
            match item {
                Item::Block(err) => render_block(f, pal, color, err)?,
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, pal.white, txt, pal.none)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, pal.blue, pal.none, txt)?;
                }
            }
        }
        Ok(())
    }
}

/// Indent a pest code block inside the report margin,
/// coloring its gutter and its markers
fn render_block(
    f: &mut fmt::Formatter<'_>,
    pal: &Palette,
    color: &str,
    err: &pest::error::Error<Rule>,
) -> fmt::Result {
    let mut align = "   ".to_string();
    let mut align_found = false;
    for line in err.to_string().split('\n') {
        write!(
            f,
            " {}|{}  {}",
            color,
            if align_found { &align } else { "" },
            pal.blue
        )?;
        for c in line.chars() {
            match c {
                '-' if !align_found => {
                    align_found = true;
                    write!(f, "{}-", align)?;
                }
                ' ' if !align_found => {
                    align.pop();
                    write!(f, " ")?;
                }
                '|' => write!(f, "|{}", pal.none)?,
                '=' => write!(f, "={}", pal.none)?,
                '^' => write!(f, "{}^", color)?,
                // pest renders line endings as a visible symbol
                '␊' => (),
                _ => write!(f, "{}", c)?,
            }
        }
        writeln!(f, "{}", pal.none)?;
    }
    Ok(())
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// Initialize a new pool of errors (e.g. to record errors from another line)
    pub fn new() -> Self {
        Self {
            fatal: 0,
            contents: Vec::new(),
            palette: &COLORED,
        }
    }

    /// Render without escape sequences, for non-terminal outputs
    pub fn plain(mut self) -> Self {
        self.palette = &PLAIN;
        self
    }

    /// Checks if any of the recorded errors are fatal
    pub fn is_fatal(&self) -> bool {
        self.count_errors() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Number of fatal errors
    pub fn count_errors(&self) -> usize {
        self.fatal
            + self
                .contents
                .last()
                .map(|e| if e.fatal { 1 } else { 0 })
                .unwrap_or(0)
    }

    /// Number of nonfatal errors
    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    /// Add a new error to the pool
    ///
    /// The last error may still be turned into a warning by the caller,
    /// it is only counted once a newer one is made.
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        if self.contents.last().map(|e| e.fatal).unwrap_or(false) {
            self.fatal += 1;
        }
        self.contents.push(Error::new(msg));
        let idx = self.contents.len() - 1;
        &mut self.contents[idx]
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        let pal = self.palette;
        let fatal = self.is_fatal();
        let count = if fatal {
            self.count_errors()
        } else {
            self.count_warnings()
        };
        let color = if fatal { pal.red } else { pal.yellow };
        let trunc = 10;
        // only print errors with the maximum fatality
        for err in self
            .contents
            .iter()
            .filter(|err| err.fatal == fatal)
            .take(trunc)
        {
            err.render(f, pal)?;
            writeln!(f)?;
        }
        if count > trunc {
            writeln!(f, "{} And {} more.", color, count - trunc)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        if fatal {
            writeln!(
                f,
                "{}Fatal: {}{} error{} emitted{}",
                color, pal.white, count, plural, pal.none
            )
        } else {
            writeln!(
                f,
                "{}Nonfatal: {}{} warning{} emitted{}",
                color, pal.white, count, plural, pal.none
            )
        }
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "end of input",
        Rule::money_amount => "a monetary value ('XXX.XX')",
        Rule::word => "a value",
        Rule::label => "a one-word description",
        Rule::string => "a string of non-'\"' characters",
        Rule::text => "a quoted description ('\"foo\"')",
        Rule::year => "a 4-digit year",
        Rule::month => "a month name ('Jan' ... 'Dec')",
        Rule::day => "a 1- or 2-digit day number",
        Rule::full_date => "a date YYYY-Mmm-DD",
        Rule::received_field => "a 'received <amount>' field",
        Rule::payment_field => "a 'pay <amount>' field",
        Rule::expense_field => "an 'expense <description> <amount>' field",
        Rule::cmd_debt => "'debt <amount>'",
        Rule::cmd_cycle => "'cycle <fields>'",
        Rule::cmd_preview => "'preview <fields>'",
        Rule::cmd_history => "'history'",
        Rule::cmd_status => "'status'",
        Rule::cmd_plot => "'plot <file>'",
        Rule::cmd_help => "'help'",
        Rule::cmd_quit => "'quit'",
        _ => "a token",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counting() {
        let mut errs = Record::new();
        assert!(!errs.is_fatal());
        assert!(errs.is_empty());
        errs.make("first").nonfatal();
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 1);
        errs.make("second");
        errs.make("third");
        assert!(errs.is_fatal());
        assert_eq!(errs.count_errors(), 2);
        assert_eq!(errs.count_warnings(), 1);
    }

    #[test]
    fn plain_rendering() {
        let mut errs = Record::new().plain();
        errs.make("No debt entered")
            .text("no debt has been entered yet")
            .hint("start with 'debt <amount>'");
        let out = errs.to_string();
        assert!(out.contains("--> Error: No debt entered"));
        assert!(out.contains(" |  no debt has been entered yet"));
        assert!(out.contains("? hint: start with 'debt <amount>'"));
        assert!(out.contains("Fatal: 1 error emitted"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn warnings_hidden_behind_errors() {
        let mut errs = Record::new().plain();
        errs.make("Just a warning").nonfatal();
        let out = errs.to_string();
        assert!(out.contains("--> Warning: Just a warning"));
        assert!(out.contains("Nonfatal: 1 warning emitted"));
        errs.make("Real problem");
        let out = errs.to_string();
        assert!(!out.contains("Just a warning"));
        assert!(out.contains("Real problem"));
    }
}
