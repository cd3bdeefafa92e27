use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Amount of money in integer minor units (cents).
///
/// Every amount the ledger touches (expense totals, debts, payments and
/// balances) goes through this type, so no value ever passes through a float.
/// Entry amounts are non-negative; balances are signed.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let lunch: MoneyCents = "42,10".parse().unwrap();
/// assert_eq!(lunch.cents(), 4210);
/// assert_eq!((-lunch).to_string(), "-42.10");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Largest amount a single expense or payment may carry (ten billion
    /// units). Keeps every per-group sum far away from `i64` overflow.
    pub const MAX_ENTRY: MoneyCents = MoneyCents(1_000_000_000_000);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Integer division into `parts` equal shares.
    ///
    /// Returns the floor share and the number of cents left over, which is
    /// always in `0..parts` for a non-negative amount. `None` when `parts` is 0.
    #[must_use]
    pub fn divide(self, parts: usize) -> Option<(MoneyCents, i64)> {
        let parts = i64::try_from(parts).ok().filter(|p| *p > 0)?;
        Some((Self(self.0.div_euclid(parts)), self.0.rem_euclid(parts)))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> MoneyCents {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> MoneyCents {
        Self(self.0 - rhs.0)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> MoneyCents {
        Self(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

fn digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses `12`, `12.3`, `12,30`, `-0.05` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EngineError::InvalidAmount(format!("{reason}: {s:?}"));

        let value = s.trim();
        let (negative, value) = match value.as_bytes().first() {
            Some(b'-') => (true, &value[1..]),
            Some(b'+') => (false, &value[1..]),
            Some(_) => (false, value),
            None => return Err(invalid("empty amount")),
        };

        let (units, fraction) = match value.split_once(['.', ',']) {
            Some((units, fraction)) => (units, fraction),
            None => (value, ""),
        };
        if !digits(units) || !(fraction.is_empty() || digits(fraction)) {
            return Err(invalid("invalid amount"));
        }
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 | 2 => {
                let padded = format!("{fraction:0<2}");
                padded.parse::<i64>().map_err(|_| invalid("invalid amount"))?
            }
            _ => return Err(invalid("too many decimals")),
        };

        let cents = units
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|cents| cents.checked_add(fraction_cents))
            .ok_or_else(|| invalid("amount too large"))?;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Option<i64> {
        value.parse::<MoneyCents>().ok().map(MoneyCents::cents)
    }

    #[test]
    fn display_always_shows_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(7).to_string(), "0.07");
        assert_eq!(MoneyCents::new(-5).to_string(), "-0.05");
        assert_eq!(MoneyCents::new(33_34).to_string(), "33.34");
        assert_eq!(MoneyCents::new(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn parses_user_input() {
        assert_eq!(parse("100"), Some(100_00));
        assert_eq!(parse("33.3"), Some(33_30));
        assert_eq!(parse("33,34"), Some(33_34));
        assert_eq!(parse(" -0.01 "), Some(-1));
        assert_eq!(parse("+5"), Some(5_00));
        assert_eq!(parse("5."), Some(5_00));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", " ", "-", "1.234", ".5", "1.2.3", "1,2.3", "ten", "1e3", "--1", "99999999999999999999"] {
            let err = bad.parse::<MoneyCents>().unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)), "{bad:?}");
        }
    }

    #[test]
    fn divide_reports_leftover_cents() {
        assert_eq!(MoneyCents::new(100).divide(3), Some((MoneyCents::new(33), 1)));
        assert_eq!(MoneyCents::new(2).divide(3), Some((MoneyCents::ZERO, 2)));
        assert_eq!(MoneyCents::new(30_00).divide(3), Some((MoneyCents::new(10_00), 0)));
        assert_eq!(MoneyCents::new(1).divide(0), None);
    }

    #[test]
    fn checked_arithmetic_and_sum() {
        assert_eq!(MoneyCents::new(i64::MAX).checked_add(MoneyCents::new(1)), None);
        assert_eq!(MoneyCents::new(i64::MIN).checked_sub(MoneyCents::new(1)), None);
        let total: MoneyCents = [34, 33, 33].into_iter().map(MoneyCents::new).sum();
        assert_eq!(total, MoneyCents::new(100));
    }
}
