//! Half-month billing periods
//!
//! Every month is cut in two fixed buckets: the 1st through the 15th,
//! and the 16th through the last day of the month. Cycles are labeled
//! by the bucket they fall in and advance one bucket at a time.

use std::fmt;

use crate::lib::date::Date;

/// Last day of the first bucket of any month
pub const SPLIT_DAY: u8 = 15;

/// Which of the two buckets of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Half {
    /// 1st ..= 15th
    First = 0,
    /// 16th ..= end of month
    Second,
}

/// `Period(a, b)` is the range of dates from `a` to `b` inclusive
///
/// Only ever constructed aligned on a bucket, see `Period::containing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(pub Date, pub Date);

impl Period {
    /// The bucket that `date` belongs to
    pub fn containing(date: Date) -> Self {
        if date.day() <= SPLIT_DAY {
            Self(date.start_of_month(), date.at_day(SPLIT_DAY))
        } else {
            Self(date.at_day(SPLIT_DAY + 1), date.end_of_month())
        }
    }

    pub fn half(&self) -> Half {
        if self.0.day() <= SPLIT_DAY {
            Half::First
        } else {
            Half::Second
        }
    }

    pub fn start(&self) -> Date {
        self.0
    }

    pub fn end(&self) -> Date {
        self.1
    }

    /// First day of the bucket immediately following
    ///
    /// The 16th of the same month for a first half, the 1st of the
    /// next month (possibly of the next year) for a second half.
    pub fn next_start(&self) -> Date {
        self.1.next()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.half() {
            Half::First => write!(f, "1-{} {}", SPLIT_DAY, self.0.month()),
            Half::Second => write!(f, "{}-{} {}", SPLIT_DAY + 1, self.1.day(), self.0.month()),
        }
    }
}

/// Everything there is to know about the bucket of a reference date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub period: Period,
    /// human-readable name of `period`, e.g. `"16-29 Feb"`
    pub label: String,
    pub next_start: Date,
}

/// Label of the bucket containing `reference` and start of the following one
///
/// Total over all dates, the exact day within the bucket is irrelevant.
pub fn compute_period(reference: Date) -> Slot {
    let period = Period::containing(reference);
    Slot {
        period,
        label: period.to_string(),
        next_start: period.next_start(),
    }
}
