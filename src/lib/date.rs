//! Day-precise calendar, with a focus on month boundaries
//!
//! Dates are `YYYY-Mmm-DD`, not number of seconds. Only what the half-month
//! bucketing needs is provided: month lengths (leap years included),
//! the successor of a day, and jumping to the boundaries of a month.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;
use std::str::FromStr;

/// A date with day-precision
///
/// Years in the range 1000..=9999 are accepted by `Date::from`.
/// Arithmetic does not re-check the range: `9999-Dec-31` is followed by
/// `10000-Jan-01`, which still has a valid month and day.
///
/// All methods execute in constant time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:02}", self.year, self.month, self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, PartialOrd, Ord)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_usize((self as usize + 1) % 12).unwrap_or(Month::Jan)
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => {
                if is_leap(year) {
                    29
                } else {
                    28
                }
            }
        }
    }
}

impl FromStr for Month {
    type Err = DateError;

    /// Parse a month from its stringified name (`"Jan"`, `"Feb"`, `"Mar"`, ...)
    fn from_str(s: &str) -> Result<Self, DateError> {
        use Month::*;
        Ok(match s {
            "Jan" => Jan,
            "Feb" => Feb,
            "Mar" => Mar,
            "Apr" => Apr,
            "May" => May,
            "Jun" => Jun,
            "Jul" => Jul,
            "Aug" => Aug,
            "Sep" => Sep,
            "Oct" => Oct,
            "Nov" => Nov,
            "Dec" => Dec,
            _ => return Err(DateError::UnknownMonth(s.to_string())),
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(usize),
    /// Feb 29 of a non-leap year
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(Month, usize),
    /// day outside of 1..=31
    InvalidDay(usize),
    /// not one of `Jan` ... `Dec`
    UnknownMonth(String),
}

impl Date {
    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self {
                year: year as u16,
                month,
                day: day as u8,
            })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// Current date in the local timezone, as reported by the system clock
    pub fn today() -> Result<Self, DateError> {
        use chrono::Datelike;
        let now = chrono::Local::now().date_naive();
        let month = Month::from_u32(now.month0())
            .ok_or_else(|| DateError::UnknownMonth(now.month().to_string()))?;
        Self::from(now.year().max(0) as usize, month, now.day() as usize)
    }

    /// `self.day` accessor
    pub fn day(&self) -> u8 {
        self.day
    }

    /// `self.month` accessor
    pub fn month(&self) -> Month {
        self.month
    }

    /// `self.year` accessor
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d`,
    ///
    ///     assert_eq!(d.index() + 1, d.next().index());
    pub fn index(self) -> usize {
        let leaps = {
            let years = if self.month <= Month::Feb {
                self.year as usize - 1
            } else {
                self.year as usize
            };
            // count leap years before current
            (years / 4) - (years / 100) + (years / 400)
        };
        let mut n = self.year as usize * 365 + self.day as usize;
        // partially elapsed current year
        n += [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334][self.month as usize];
        n += leaps; // each leap year adds one day
        n
    }

    /// Following day, possibly in year 10000
    pub fn next(self) -> Self {
        if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                Self {
                    year: self.year + 1,
                    month: Month::Jan,
                    day: 1,
                }
            } else {
                Self {
                    month: self.month.next(),
                    day: 1,
                    ..self
                }
            }
        } else {
            Self {
                day: self.day + 1,
                ..self
            }
        }
    }

    /// Same month, different day
    ///
    /// Day is clamped to fit in the month:
    /// `2021-Feb-10` at day 30 is `2021-Feb-28`
    pub fn at_day(self, day: u8) -> Self {
        Self {
            day: day.clamp(1, self.month.count(self.year)),
            ..self
        }
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        Self { day: 1, ..self }
    }

    /// Get date of the last day of the current month
    pub fn end_of_month(self) -> Self {
        Self {
            day: self.month.count(self.year),
            ..self
        }
    }
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(m, d) => write!(
                f,
                "{} is a short month, it does not have a {}th day",
                m, d,
            ),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
            UnknownMonth(m) => write!(f, "'{}' is not a valid month", m),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            NotBissextile(y) => format!("did you mean {y}-Feb-28 or {y}-Mar-01 ?", y = y),
            MonthTooShort(m, d) => format!(
                "{} is only {} days long",
                m,
                if *m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
            UnknownMonth(_) => "Months are 'Jan', 'Feb', ..., 'Dec'".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Month::*, *};

    #[test]
    fn bissextile_check() {
        macro_rules! yes {
            ( $y:expr ) => {
                assert!(is_leap($y));
            };
        }
        macro_rules! no {
            ( $y:expr ) => {
                assert!(!is_leap($y));
            };
        }
        yes!(2004);
        no!(2100);
        yes!(2000);
        no!(2001);
        no!(2010);
        yes!(2012);
        yes!(2024);
    }

    macro_rules! ok {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(
                Date::from($y, $m, $d),
                Ok(Date {
                    year: $y,
                    month: $m,
                    day: $d
                })
            );
        };
    }
    macro_rules! short {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::MonthTooShort($m, $d)));
        };
    }
    macro_rules! nbiss {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::NotBissextile($y)));
        };
    }
    macro_rules! invalid {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::InvalidDay($d)));
        };
    }

    #[test]
    fn long_months() {
        ok!(2020-Jan-31);
        ok!(2020-Mar-31);
        short!(2020-Apr-31);
        ok!(2020-May-31);
        short!(2020-Jun-31);
        ok!(2020-Jul-31);
        ok!(2020-Aug-31);
        short!(2020-Sep-31);
        ok!(2020-Oct-31);
        short!(2020-Nov-31);
        ok!(2020-Dec-31);
    }

    #[test]
    fn normal_days() {
        invalid!(2020-Dec-45);
        invalid!(2020-Jan-32);
        invalid!(2020-Jan-0);
        ok!(2020-Mar-20);
        ok!(2020-Apr-10);
    }

    #[test]
    fn february() {
        short!(2020-Feb-31);
        short!(2020-Feb-30);
        ok!(2020-Feb-29);
        ok!(2020-Feb-28);
        short!(2021-Feb-31);
        short!(2021-Feb-30);
        nbiss!(2021-Feb-29);
        ok!(2021-Feb-28);
    }

    #[test]
    fn years_out_of_range() {
        assert_eq!(Date::from(999, Jan, 1), Err(DateError::UnsupportedYear(999)));
        assert_eq!(Date::from(10000, Jan, 1), Err(DateError::UnsupportedYear(10000)));
    }

    #[test]
    fn month_names() {
        assert_eq!("Jan".parse::<Month>(), Ok(Jan));
        assert_eq!("Sep".parse::<Month>(), Ok(Sep));
        assert_eq!("Dec".parse::<Month>(), Ok(Dec));
        assert_eq!(
            "Sept".parse::<Month>(),
            Err(DateError::UnknownMonth("Sept".to_string()))
        );
        assert_eq!(
            "jan".parse::<Month>(),
            Err(DateError::UnknownMonth("jan".to_string()))
        );
        assert_eq!(Dec.next(), Jan);
        assert_eq!(format!("{}", Aug), "Aug");
    }

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        };
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", dt!(2024-Jan-1)), "2024-Jan-01");
        assert_eq!(format!("{}", dt!(1999-Dec-31)), "1999-Dec-31");
    }

    #[test]
    fn index_consistent() {
        let mut d = Date::from(2000, Jan, 1).unwrap();
        let end = Date::from(3000, Dec, 31).unwrap();
        while d < end {
            let ds = d.next();
            let n = d.index() + 1;
            let ns = ds.index();
            if n != ns {
                panic!("date {}, successor {}, expected {} == {}", d, ds, n, ns);
            }
            d = ds;
        }
    }

    #[test]
    fn successors() {
        assert_eq!(dt!(2020-Jan-15).next(), dt!(2020-Jan-16));
        assert_eq!(dt!(2020-Jan-31).next(), dt!(2020-Feb-1));
        assert_eq!(dt!(2020-Feb-28).next(), dt!(2020-Feb-29));
        assert_eq!(dt!(2021-Feb-28).next(), dt!(2021-Mar-1));
        assert_eq!(dt!(2020-Dec-31).next(), dt!(2021-Jan-1));
    }

    #[test]
    fn past_last_year() {
        let d = dt!(9999-Dec-31).next();
        assert_eq!(d.year(), 10000);
        assert_eq!(d.month(), Jan);
        assert_eq!(d.day(), 1);
        assert_eq!(d.to_string(), "10000-Jan-01");
        assert_eq!(d.end_of_month().day(), 31);
        assert!(Date::from(10000, Jan, 1).is_err());
    }

    #[test]
    fn time_boundaries() {
        assert_eq!(dt!(2020-Mar-26).start_of_month(), dt!(2020-Mar-1));
        assert_eq!(dt!(2020-Feb-12).end_of_month(), dt!(2020-Feb-29));
        assert_eq!(dt!(2021-Feb-12).end_of_month(), dt!(2021-Feb-28));
        assert_eq!(dt!(2021-Apr-2).end_of_month(), dt!(2021-Apr-30));
        assert_eq!(dt!(2021-Feb-10).at_day(30), dt!(2021-Feb-28));
        assert_eq!(dt!(2021-Feb-10).at_day(16), dt!(2021-Feb-16));
        assert_eq!(dt!(2021-Feb-10).at_day(0), dt!(2021-Feb-1));
    }

    #[test]
    fn today_is_valid() {
        let today = Date::today().unwrap();
        assert!(today.year() >= 2000);
        assert!(today.day() >= 1 && today.day() <= today.month().count(today.year()));
    }
}
