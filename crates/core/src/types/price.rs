//! Type-safe price representation using decimal arithmetic.
//!
//! Prices arrive from the backend as plain JSON numbers with an implicit
//! currency (Chilean pesos in practice). They are displayed with the es-CL
//! conventions: `.` groups thousands, `,` separates decimals, at most three
//! fraction digits.

use core::fmt;
use core::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};

use crate::types::catalog::Quantity;

/// Fraction digits kept when formatting (matches `toLocaleString` defaults).
const MAX_FRACTION_DIGITS: u32 = 3;

/// A price in the store's implicit currency.
///
/// `Display` renders the es-CL form without a currency symbol; templates add
/// the single `$` prefix themselves.
///
/// ```
/// use vitrina_core::Price;
///
/// assert_eq!(Price::from_units(12345).to_string(), "12.345");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }

    /// Format with es-CL separators, e.g. `1234567.5` becomes `1.234.567,5`.
    #[must_use]
    pub fn format_es_cl(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
            .normalize();

        let text = rounded.abs().to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut out = String::with_capacity(text.len() + whole.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(digit);
        }
        if !fraction.is_empty() {
            out.push(',');
            out.push_str(fraction);
        }
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_es_cl())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self {
        self.times(rhs)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

// The backend expects plain JSON numbers (integers for whole amounts).
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero()
            && let Some(units) = self.0.to_i64()
        {
            return serializer.serialize_i64(units);
        }
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom(format!(
                "price {} is not representable as a JSON number",
                self.0
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(Price::from_units(12345).format_es_cl(), "12.345");
        assert_eq!(Price::from_units(1990).format_es_cl(), "1.990");
        assert_eq!(Price::from_units(1_234_567).format_es_cl(), "1.234.567");
    }

    #[test]
    fn test_format_small_values_have_no_separator() {
        assert_eq!(Price::from_units(0).format_es_cl(), "0");
        assert_eq!(Price::from_units(999).format_es_cl(), "999");
    }

    #[test]
    fn test_format_fraction_uses_comma() {
        let price = Price::new(Decimal::new(12_345_50, 2));
        assert_eq!(price.format_es_cl(), "12.345,5");
    }

    #[test]
    fn test_format_rounds_to_three_digits() {
        let price = Price::new(Decimal::new(10_0005, 4));
        assert_eq!(price.format_es_cl(), "10,001");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(Price::from_units(-45990).format_es_cl(), "-45.990");
    }

    #[test]
    fn test_times_quantity() {
        let unit = Price::from_units(1990);
        let total = unit.times(Quantity::new(3).unwrap());
        assert_eq!(total, Price::from_units(5970));
    }

    #[test]
    fn test_sum() {
        let total: Price = [1990, 45990].into_iter().map(Price::from_units).sum();
        assert_eq!(total, Price::from_units(47980));
    }

    #[test]
    fn test_deserialize_integer_float_and_string() {
        let from_int: Price = serde_json::from_str("1990").unwrap();
        let from_float: Price = serde_json::from_str("1990.0").unwrap();
        let from_str: Price = serde_json::from_str("\"1990\"").unwrap();
        assert_eq!(from_int, Price::from_units(1990));
        assert_eq!(from_float, Price::from_units(1990));
        assert_eq!(from_str, Price::from_units(1990));
    }

    #[test]
    fn test_serialize_whole_amount_as_integer() {
        assert_eq!(
            serde_json::to_string(&Price::from_units(3980)).unwrap(),
            "3980"
        );
        assert_eq!(
            serde_json::to_string(&Price::new(Decimal::new(125, 1))).unwrap(),
            "12.5"
        );
    }
}
