//! Fixed-point money type.
//!
//! # Scale
//!
//! All spend amounts (bid cost, budget caps, booked spend) use a 1e-6
//! (micros) fixed-point representation stored as `i64`.  1 currency unit =
//! `Money::new(1_000_000)`.  Impression counts are NOT money and stay plain
//! `i64`; the type system keeps the two from being mixed.
//!
//! # Arithmetic
//!
//! - `Add`, `Sub`, `Neg`, `AddAssign`, `SubAssign` are closed over `Money`.
//!   Unrolling a win adds the negated cost, so negation must be exact.
//! - `saturating_add` clamps at `i64::MAX` / `i64::MIN`.
//! - `checked_mul_qty` multiplies a per-unit rate by an integer count and
//!   returns `None` on overflow.
//!
//! There is intentionally no `From<i64>`: callers must say whether a raw
//! integer is micros (`new`) or whole units (`from_units`).

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Micros per whole currency unit.
pub const MICROS_SCALE: i64 = 1_000_000;

/// A fixed-point monetary amount at 1e-6 scale.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero monetary amount.
    pub const ZERO: Money = Money(0);

    /// Maximum representable value.
    pub const MAX: Money = Money(i64::MAX);

    /// Construct from a raw micros value.
    #[inline]
    pub const fn new(raw_micros: i64) -> Self {
        Money(raw_micros)
    }

    /// Construct from whole currency units (`from_units(3)` == 3.000000).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * MICROS_SCALE)
    }

    /// Extract the underlying raw micros.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Saturating addition; clamps at the `i64` extremes.
    #[inline]
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// `None` when the sum leaves the `i64` range.
    #[inline]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply a per-unit rate by an integer count (e.g. CPM × thousands).
    ///
    /// Returns `None` on overflow; there is no implicit clamp.
    #[inline]
    pub fn checked_mul_qty(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }
}

/// Plain `+` overflows like `i64`; tallies stay far inside the range, and
/// limit comparisons go through `checked_add`.
impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.0 / MICROS_SCALE;
        let frac = (self.0 % MICROS_SCALE).abs();
        // -0.25 truncates to 0 units; keep the sign.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac:06}")
        } else {
            write!(f, "{units}.{frac:06}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_is_exact_additive_inverse() {
        let cost = Money::new(1_234_567);
        assert_eq!(cost + (-cost), Money::ZERO);
        assert_eq!(-(-cost), cost);
    }

    #[test]
    fn from_units_scales_by_micros() {
        assert_eq!(Money::from_units(3).raw(), 3_000_000);
    }

    #[test]
    fn strict_ordering_distinguishes_one_micro() {
        let limit = Money::from_units(100);
        let over = limit + Money::new(1);
        assert!(over > limit);
        assert!(limit + Money::ZERO <= limit);
    }

    #[test]
    fn sum_over_iterator() {
        let parts = [Money::from_units(1), Money::from_units(2), Money::new(-500_000)];
        let total: Money = parts.iter().sum();
        assert_eq!(total, Money::new(2_500_000));
    }

    #[test]
    fn checked_mul_qty_overflow_returns_none() {
        assert_eq!(Money::MAX.checked_mul_qty(2), None);
        assert_eq!(
            Money::from_units(25).checked_mul_qty(4),
            Some(Money::from_units(100))
        );
    }

    #[test]
    fn checked_add_overflow_returns_none() {
        assert_eq!(Money::MAX.checked_add(Money::new(1)), None);
        assert_eq!(
            Money::new(-1).checked_add(Money::new(2)),
            Some(Money::new(1))
        );
    }

    #[test]
    fn display_formats_six_decimals() {
        assert_eq!(format!("{}", Money::new(1_500_000)), "1.500000");
        assert_eq!(format!("{}", Money::new(-250_000)), "-0.250000");
    }

    #[test]
    fn serializes_as_raw_integer() {
        let json = serde_json::to_string(&Money::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: Money = serde_json::from_str("42").unwrap();
        assert_eq!(back, Money::new(42));
    }
}
