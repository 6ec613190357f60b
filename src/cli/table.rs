use std::fmt;

use crate::lib::{amount::Amount, entry::Cycle, ledger::Ledger};

/// Box-drawn history of a ledger, one line per cycle
pub struct Table<'d> {
    ledger: &'d Ledger,
    title: Option<String>,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    title: Option<String>,
    labels: ColFmt,
    columns: Vec<ColFmt>,
}

const HEADERS: &[&str] = &["Received", "Expenses", "Free", "Payment", "Remaining", "Debt"];

impl<'d> Table<'d> {
    pub fn from(ledger: &'d Ledger) -> Self {
        Self {
            ledger,
            title: None,
        }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    fn to_formatter(&self) -> GridFmt {
        let cols = HEADERS
            .iter()
            .map(|h| ColFmt::with_label(BoxFmt::from(h.to_string())))
            .collect::<Vec<_>>();
        let mut grid = GridFmt::with_columns(self.title.clone(), cols);
        for (cycle, debt) in self.ledger.history() {
            grid.push_line(
                BoxFmt::cycle(cycle),
                [
                    cycle.received(),
                    cycle.total_expenses(),
                    cycle.free_money(),
                    cycle.debt_payment(),
                    cycle.remaining_free_money(),
                    debt,
                ]
                .iter()
                .map(|a| BoxFmt::amount(*a))
                .collect::<Vec<_>>(),
            );
        }
        grid
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn amount(a: Amount) -> Self {
        Self::from(a.to_string())
    }

    /// Label of the cycle, with the year it belongs to
    fn cycle(c: &Cycle) -> Self {
        Self::from(format!("{} {}", c.date_range(), c.period().start().year()))
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width + 1,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width + 1);
        self.boxes.push(b);
    }
}

impl GridFmt {
    fn with_columns(title: Option<String>, columns: Vec<ColFmt>) -> Self {
        Self {
            title,
            labels: ColFmt::with_label(BoxFmt::from(String::from("Period"))),
            columns,
        }
    }

    fn push_line(&mut self, label: BoxFmt, boxes: Vec<BoxFmt>) {
        self.labels.push(label);
        for (i, b) in boxes.into_iter().enumerate() {
            self.columns[i].push(b);
        }
    }

    /// One horizontal border made of `left`, `join` and `right`
    fn border(&self, f: &mut fmt::Formatter, left: &str, join: &str, right: &str) -> fmt::Result {
        write!(f, "{}", left)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", join)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", right)
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ledger.cycles().is_empty() {
            if let Some(title) = &self.title {
                writeln!(f, "{}", title)?;
            }
            return writeln!(f, "No cycles added yet.");
        }
        write!(f, "{}", self.to_formatter())
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "{}", title)?;
        }
        self.border(f, ULCORNER, LOJOIN, URCORNER)?;
        // title line
        write!(f, "{}", VLINE)?;
        self.labels.write_label(f, false)?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f, true)?;
        }
        writeln!(f, "{}", VLINE)?;
        self.border(f, RTJOIN, CROSS, LTJOIN)?;
        // main block
        for idx in 0..self.labels.len() {
            write!(f, "{}", VLINE)?;
            self.labels.write_item(f, idx, false)?;
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx, true)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        self.border(f, DLCORNER, HIJOIN, DRCORNER)
    }
}

impl ColFmt {
    fn write_label(&self, f: &mut fmt::Formatter, right: bool) -> fmt::Result {
        self.label.write(f, self.width, right)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize, right: bool) -> fmt::Result {
        self.boxes[idx].write(f, self.width, right)
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

impl BoxFmt {
    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let pad = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", pad, self.text)
        } else {
            write!(f, " {}{} ", self.text, pad)
        }
    }
}
