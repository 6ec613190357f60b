//! SVG chart of a ledger
//!
//! Each cycle is drawn over the dates of its period as stacked bands
//! (expenses, debt payment, what is left) whose top is the money received,
//! with the running debt as a step line on top.

use svg::{
    node::element::{path::Data, Line, Path, Text},
    Document,
};

use crate::lib::{amount::Amount, date::Date, ledger::Ledger, period::Period};

pub struct Plotter<'d> {
    ledger: &'d Ledger,
}

impl<'d> Plotter<'d> {
    pub fn from(ledger: &'d Ledger) -> Self {
        Self { ledger }
    }

    /// `None` if there is nothing to draw yet
    pub fn render(&self) -> Option<Document> {
        if self.ledger.cycles().is_empty() {
            return None;
        }
        Some(self.stacked_plot().to_range_group_drawer().render(&self.debt_line()))
    }

    /// Write the chart to `file`, returns `Ok(false)` if there was nothing to draw
    pub fn save(&self, file: &str) -> std::io::Result<bool> {
        match self.render() {
            Some(document) => svg::save(file, &document).map(|()| true),
            None => Ok(false),
        }
    }

    fn stacked_plot(&self) -> Plot<Period, CumulativeEntry<Amount>> {
        let mut plot = Plot::new();
        for cycle in self.ledger.cycles() {
            plot.push(
                cycle.period(),
                CumulativeEntry::cumul(vec![
                    Amount::ZERO,
                    cycle.total_expenses(),
                    cycle.debt_payment(),
                    cycle.remaining_free_money(),
                ]),
            );
        }
        plot
    }

    /// Debt during each period, dropping at the start of the next one
    fn debt_line(&self) -> Vec<(i64, i64)> {
        let mut points = Vec::new();
        let mut before = self.ledger.initial_debt();
        for (cycle, after) in self.ledger.history() {
            let (start, end) = cycle.period().to_range();
            points.push((start, before.to_scalar()));
            points.push((end, before.to_scalar()));
            before = after;
        }
        points.push((self.ledger.next_start().to_scalar(), before.to_scalar()));
        points
    }
}

#[derive(Debug)]
pub struct Plot<X, Y> {
    data: Vec<(X, Y)>,
}

impl<X, Y> Plot<X, Y> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn push(&mut self, x: X, y: Y) {
        self.data.push((x, y));
    }
}

/// Running totals of a group of values, starting from the first one
#[derive(Debug)]
struct CumulativeEntry<Y> {
    points: Vec<Y>,
}

impl<Y> CumulativeEntry<Y>
where
    Y: std::ops::AddAssign + Clone,
{
    fn cumul(mut points: Vec<Y>) -> Self {
        for i in 1..points.len() {
            let prev = points[i - 1].clone();
            points[i] += prev;
        }
        Self { points }
    }
}

pub trait Scalar {
    fn to_scalar(&self) -> i64;
}
pub trait ScalarRange {
    fn to_range(&self) -> (i64, i64);
}
pub trait ScalarGroup {
    fn to_group(&self) -> Vec<i64>;
}

impl Scalar for Amount {
    fn to_scalar(&self) -> i64 {
        self.cents()
    }
}

impl Scalar for Date {
    fn to_scalar(&self) -> i64 {
        self.index() as i64
    }
}

impl ScalarRange for Period {
    /// Periods cover their last day entirely
    fn to_range(&self) -> (i64, i64) {
        (self.start().to_scalar(), self.end().to_scalar() + 1)
    }
}

impl<Y> ScalarGroup for CumulativeEntry<Y>
where
    Y: Scalar,
{
    fn to_group(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.to_scalar()).collect::<Vec<_>>()
    }
}

impl<X, Y> Plot<X, Y>
where
    X: ScalarRange,
    Y: ScalarGroup,
{
    fn to_range_group_drawer(&self) -> RangeGroupDrawer {
        RangeGroupDrawer {
            points: self
                .data
                .iter()
                .map(|(x, y)| (x.to_range(), y.to_group()))
                .collect::<Vec<_>>(),
        }
    }
}

#[derive(Debug)]
struct RangeGroupDrawer {
    points: Vec<((i64, i64), Vec<i64>)>,
}

impl RangeGroupDrawer {
    /// Bands between consecutive values of each group, and `line` on top
    fn render(&self, line: &[(i64, i64)]) -> Document {
        let (xmin, ymax, width, height) = {
            let mut xmin = i64::MAX;
            let mut ymin = 0;
            let mut xmax = i64::MIN;
            let mut ymax = 0;
            for ((start, end), points) in &self.points {
                xmin = xmin.min(*start);
                xmax = xmax.max(*end);
                for pt in points {
                    ymin = ymin.min(*pt);
                    ymax = ymax.max(*pt);
                }
            }
            for (_, y) in line {
                ymin = ymin.min(*y);
                ymax = ymax.max(*y);
            }
            // extremes may be a whole i64 range apart
            (
                xmin,
                ymax,
                (xmax as f64 - xmin as f64).max(1.0),
                (ymax as f64 - ymin as f64).max(1.0),
            )
        };
        let fheight = 700.0;
        let fwidth = 1000.0;
        let stroke_width = 2.0;
        let margin = 20.0;
        let resize_x = |x: i64| (x as f64 - xmin as f64) / width * fwidth;
        let resize_y = |y: i64| (ymax as f64 - y as f64) / height * fheight;

        let mut document = Document::new().set(
            "viewBox",
            (-margin, -margin, fwidth + 2.0 * margin, fheight + 2.0 * margin),
        );
        for ((start, end), points) in &self.points {
            for (i, pair) in points.windows(2).enumerate() {
                let (lo, hi) = (pair[0], pair[1]);
                if lo == hi {
                    continue;
                }
                let band = Data::new()
                    .move_to((resize_x(*start), resize_y(lo)))
                    .line_to((resize_x(*end), resize_y(lo)))
                    .line_to((resize_x(*end), resize_y(hi)))
                    .line_to((resize_x(*start), resize_y(hi)))
                    .close();
                document = document.add(
                    Path::new()
                        .set("fill", COLORS[i % COLORS.len()])
                        .set("stroke", "white")
                        .set("d", band),
                );
            }
        }
        if let Some((first, rest)) = line.split_first() {
            let debt = rest.iter().fold(
                Data::new().move_to((resize_x(first.0), resize_y(first.1))),
                |data, (x, y)| data.line_to((resize_x(*x), resize_y(*y))),
            );
            document = document.add(
                Path::new()
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", stroke_width)
                    .set("d", debt),
            );
        }
        let yaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", 0.0)
            .set("y1", 0.0)
            .set("y2", fheight)
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        let xaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", fwidth)
            .set("y1", resize_y(0))
            .set("y2", resize_y(0))
            .set("stroke", "black")
            .set("stroke-width", stroke_width);
        LEGEND
            .iter()
            .enumerate()
            .fold(document.add(yaxis).add(xaxis), |doc, (i, name)| {
                doc.add(
                    Text::new()
                        .set("x", 10.0)
                        .set("y", 20.0 * (i + 1) as f64)
                        .set("fill", COLORS.get(i).copied().unwrap_or("black"))
                        .add(svg::node::Text::new(*name)),
                )
            })
    }
}

const COLORS: &[&str] = &["red", "blue", "green"];
const LEGEND: &[&str] = &["expenses", "debt payment", "remaining free money", "debt"];

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month,
        entry::{CycleEntry, Expense},
    };

    fn ledger() -> Ledger {
        let l = Ledger::initialize(Amount::units(1000), Date::from(2024, Month::Jan, 1).unwrap())
            .unwrap();
        let (l, _) = l
            .record_cycle(CycleEntry::new(
                Amount::units(500),
                vec![Expense::new("rent", Amount::units(200))],
                Amount::units(100),
            ))
            .unwrap();
        let (l, _) = l
            .record_cycle(CycleEntry::new(Amount::units(400), vec![], Amount::units(400)))
            .unwrap();
        l
    }

    #[test]
    fn nothing_to_draw() {
        let l = Ledger::initialize(Amount::units(1000), Date::from(2024, Month::Jan, 1).unwrap())
            .unwrap();
        assert!(Plotter::from(&l).render().is_none());
    }

    #[test]
    fn cumulative_groups() {
        let l = ledger();
        let drawer = Plotter::from(&l).stacked_plot().to_range_group_drawer();
        assert_eq!(drawer.points.len(), 2);
        // stacked up to the money received
        assert_eq!(drawer.points[0].1, vec![0, 20000, 30000, 50000]);
        assert_eq!(drawer.points[1].1, vec![0, 0, 40000, 40000]);
        // contiguous periods
        assert_eq!(drawer.points[0].0 .1, drawer.points[1].0 .0);
        assert_eq!(drawer.points[0].0 .1 - drawer.points[0].0 .0, 15);
        assert_eq!(drawer.points[1].0 .1 - drawer.points[1].0 .0, 16);
    }

    #[test]
    fn debt_steps() {
        let l = ledger();
        let line = Plotter::from(&l).debt_line();
        let debts = line.iter().map(|(_, y)| *y).collect::<Vec<_>>();
        assert_eq!(debts, vec![100_000, 100_000, 90_000, 90_000, 50_000]);
    }

    #[test]
    fn document() {
        let l = ledger();
        let doc = Plotter::from(&l).render().unwrap().to_string();
        assert!(doc.contains("<svg"));
        // one band per legend entry, plus three bands for the first cycle and one for the second
        assert_eq!(doc.matches("fill=\"red\"").count(), 2);
        assert_eq!(doc.matches("fill=\"blue\"").count(), 3);
        assert!(doc.contains("remaining free money"));
    }

    #[test]
    fn extreme_amounts() {
        let max = Amount(i64::MAX);
        let l = Ledger::initialize(Amount(1), Date::from(2024, Month::Jan, 1).unwrap()).unwrap();
        let (l, _) = l.record_cycle(CycleEntry::new(max, vec![], max)).unwrap();
        let line = Plotter::from(&l).debt_line();
        assert_eq!(line.last().map(|(_, y)| *y), Some(i64::MIN + 2));
        let doc = Plotter::from(&l).render().unwrap().to_string();
        assert!(!doc.contains("NaN") && !doc.contains("inf"));
    }
}
