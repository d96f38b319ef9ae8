//! Fixed-point decimal money, two places, banker's rounding.
//!
//! All invoice arithmetic (`spec.md` §3, §9) is specified in fixed-point
//! decimal rather than binary floating point. `Money` stores an integer
//! count of cents (hundredths of the major unit) so that addition is exact;
//! the only place rounding is needed is multiplying by the tax rate, which
//! uses round-half-to-even ("banker's rounding") as the spec requires.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Construct from a decimal major-unit amount, rounding to the nearest
    /// cent (banker's rounding on exact ties).
    pub fn from_f64(amount: f64) -> Self {
        Self {
            cents: banker_round(amount * 100.0),
        }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn to_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Multiply by a rate (e.g. the 0.21 tax rate), rounding the product to
    /// the nearest cent with round-half-to-even.
    pub fn mul_rate(&self, rate: f64) -> Money {
        Money {
            cents: banker_round(self.cents as f64 * rate),
        }
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(|cents| Money { cents })
    }

    pub fn sum(items: impl IntoIterator<Item = Money>) -> Money {
        items
            .into_iter()
            .fold(Money::zero(), |acc, m| acc.checked_add(m).unwrap_or(acc))
    }
}

/// Round-half-to-even for a value already scaled to integer units
/// (e.g. cents). Ties at exactly `.5` round to the nearest even integer;
/// all other values round to the nearest integer.
fn banker_round(scaled: f64) -> i64 {
    let floor = scaled.floor();
    let diff = scaled - floor;
    let floor_i = floor as i64;
    if (diff - 0.5).abs() < 1e-9 {
        if floor_i % 2 == 0 {
            floor_i
        } else {
            floor_i + 1
        }
    } else if diff > 0.5 {
        floor_i + 1
    } else {
        floor_i
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_exact() {
        let a = Money::from_cents(1050);
        let b = Money::from_cents(275);
        assert_eq!((a + b).cents(), 1325);
    }

    #[test]
    fn tax_rounding_ties_to_even() {
        // 250 * 0.01 = 2.5 exactly -> ties to the nearest even cent (2)
        assert_eq!(Money::from_cents(250).mul_rate(0.01).cents(), 2);
        // 350 * 0.01 = 3.5 exactly -> ties to the nearest even cent (4)
        assert_eq!(Money::from_cents(350).mul_rate(0.01).cents(), 4);
    }

    #[test]
    fn display_formats_two_places() {
        assert_eq!(Money::from_cents(123456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn from_f64_round_trips_ordinary_amounts() {
        assert_eq!(Money::from_f64(19.99).cents(), 1999);
    }
}
