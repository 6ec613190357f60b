//! Exact monetary values
//!
//! Amounts are a number of cents, so that sums and differences of
//! user-provided values never accumulate rounding errors.

use std::fmt;
use std::iter;
use std::ops;
use std::str::FromStr;

use num_traits::{CheckedAdd, CheckedSub, Saturating, Zero};
use thiserror::Error;

/// A signed amount of money, in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(pub i64);

/// Ways in which a textual amount can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("no digits")]
    Empty,
    #[error("unexpected character '{0}'")]
    InvalidChar(char),
    #[error("more than two decimal places")]
    TooPrecise,
    #[error("value too large, at most {} is accepted", Amount::MAX)]
    Overflow,
}

impl Amount {
    pub const ZERO: Self = Self(0);
    /// Largest magnitude read from user input: ten trillion units
    pub const MAX: Self = Self(1_000_000_000_000_000);

    /// Whole units, no cents
    #[cfg(test)]
    pub fn units(n: i64) -> Self {
        Self(n * 100)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts `123`, `-123`, `123.4`, `123.45`, and nothing else
    fn from_str(s: &str) -> Result<Self, AmountError> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match body.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (body, ""),
        };
        if whole.is_empty() {
            return Err(AmountError::Empty);
        }
        if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
            return Err(AmountError::InvalidChar(c));
        }
        if frac.len() > 2 {
            return Err(AmountError::TooPrecise);
        }
        let whole = whole.parse::<i64>().map_err(|_| AmountError::Overflow)?;
        // "5" is fifty cents, "05" is five
        let frac = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| AmountError::Overflow)? * 10,
            _ => frac.parse::<i64>().map_err(|_| AmountError::Overflow)?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .filter(|c| *c <= Self::MAX.0)
            .ok_or(AmountError::Overflow)?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    /// Thousands are grouped, cents only appear when there are some:
    /// `1,000`, `1,000.50`, `-12.05`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        let digits = (abs / 100).to_string();
        let mut grouped = String::with_capacity(digits.len() * 4 / 3 + 1);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let text = if abs % 100 == 0 {
            format!("{}{}", if self.0 < 0 { "-" } else { "" }, grouped)
        } else {
            format!(
                "{}{}.{:02}",
                if self.0 < 0 { "-" } else { "" },
                grouped,
                abs % 100
            )
        };
        f.pad(&text)
    }
}

impl ops::Add for Amount {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl ops::Sub for Amount {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl ops::AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl ops::SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl CheckedAdd for Amount {
    fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl CheckedSub for Amount {
    fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Saturating for Amount {
    fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Zero for Amount {
    fn zero() -> Self {
        Self::ZERO
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, a| acc + a)
    }
}

impl<'a> iter::Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Sum that fails instead of wrapping around
pub fn checked_sum<I>(iter: I) -> Option<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    iter.into_iter()
        .try_fold(Amount::ZERO, |acc, a| acc.checked_add(&a))
}

/// Per-mille ratio of `part` to `whole`, `0` when `whole` is not positive
pub fn per_mille(part: Amount, whole: Amount) -> i64 {
    if whole.0 <= 0 {
        0
    } else {
        // i128 so that huge amounts cannot overflow the product
        (part.0 as i128 * 1000 / whole.0 as i128) as i64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! amt {
        ( $s:expr => ! $err:expr ) => {
            assert_eq!($s.parse::<Amount>(), Err($err));
        };
        ( $s:expr => $cents:expr ) => {
            assert_eq!($s.parse::<Amount>(), Ok(Amount($cents)));
        };
    }

    #[test]
    fn parse_valid() {
        amt!("0" => 0);
        amt!("1000" => 100_000);
        amt!("12.5" => 1250);
        amt!("12.05" => 1205);
        amt!("12.50" => 1250);
        amt!("-3" => -300);
        amt!("-0.99" => -99);
        amt!("007" => 700);
    }

    #[test]
    fn parse_invalid() {
        amt!("" => ! AmountError::Empty);
        amt!("-" => ! AmountError::Empty);
        amt!(".5" => ! AmountError::Empty);
        amt!("abc" => ! AmountError::InvalidChar('a'));
        amt!("1e3" => ! AmountError::InvalidChar('e'));
        amt!("1.2.3" => ! AmountError::InvalidChar('.'));
        amt!("+5" => ! AmountError::InvalidChar('+'));
        amt!("1.234" => ! AmountError::TooPrecise);
        amt!("99999999999999999999" => ! AmountError::Overflow);
        amt!("90000000000000000" => ! AmountError::Overflow);
    }

    #[test]
    fn input_bound() {
        amt!("10000000000000" => Amount::MAX.0);
        amt!("-10000000000000" => -Amount::MAX.0);
        amt!("10000000000000.01" => ! AmountError::Overflow);
        assert_eq!(Amount::MAX.to_string(), "10,000,000,000,000");
    }

    #[test]
    fn checked_arithmetic() {
        let big = Amount(i64::MAX - 10);
        assert_eq!(big.checked_add(&Amount(10)), Some(Amount(i64::MAX)));
        assert_eq!(big.checked_add(&Amount(11)), None);
        assert_eq!(Amount(i64::MIN).checked_sub(&Amount(1)), None);
        assert_eq!(big.saturating_add(big), Amount(i64::MAX));
        assert_eq!(checked_sum(vec![Amount(5), Amount(7)]), Some(Amount(12)));
        assert_eq!(checked_sum(vec![big, Amount(100)]), None);
        assert_eq!(checked_sum(Vec::new()), Some(Amount::ZERO));
    }

    #[test]
    fn display() {
        assert_eq!(Amount(0).to_string(), "0");
        assert_eq!(Amount(100_000).to_string(), "1,000");
        assert_eq!(Amount(100_050).to_string(), "1,000.50");
        assert_eq!(Amount(-1205).to_string(), "-12.05");
        assert_eq!(Amount(-5).to_string(), "-0.05");
        assert_eq!(Amount::units(1_234_567).to_string(), "1,234,567");
        assert_eq!(Amount::units(123_456).to_string(), "123,456");
        assert_eq!(format!("{:>8}", Amount::units(900)), "     900");
    }

    #[test]
    fn arithmetic() {
        let total: Amount = vec![Amount::units(200), Amount(1250), Amount(5)].iter().sum();
        assert_eq!(total, Amount(21255));
        assert_eq!(Amount::units(500) - Amount::units(200), Amount::units(300));
        let mut debt = Amount::units(1000);
        debt -= Amount::units(1100);
        assert!(debt.is_negative());
        assert_eq!(per_mille(Amount::units(150), Amount::units(1000)), 150);
        assert_eq!(per_mille(Amount::units(150), Amount::ZERO), 0);
    }
}
