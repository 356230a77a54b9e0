//! Money type for representing monetary values.
//!
//! Amounts are exact decimals. Nothing here rounds implicitly: repeated
//! recomputation of a total never compounds rounding error. Rounding to the
//! currency's minor unit only happens in [`Money::rounded`] and the display
//! helpers.

use crate::error::CommerceError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Exact amount in major units (e.g., dollars).
    pub amount: Decimal,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Round to the currency's minor unit, half away from zero.
    pub fn rounded(&self) -> Money {
        Money::new(
            self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            self.currency,
        )
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let rounded = self.rounded();
        let places = self.currency.decimal_places() as usize;
        if rounded.is_negative() {
            format!("-{}{:.places$}", self.currency.symbol(), rounded.amount.abs())
        } else {
            format!("{}{:.places$}", self.currency.symbol(), rounded.amount)
        }
    }

    /// Add another Money value.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a quantity.
    pub fn try_multiply(&self, factor: u32) -> Result<Money, CommerceError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(factor))
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a decimal rate (e.g., a tax rate of 0.08).
    pub fn try_scale(&self, rate: Decimal) -> Result<Money, CommerceError> {
        let amount = self
            .amount
            .checked_mul(rate)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Calculate a percentage of this amount.
    pub fn percentage(&self, percent: u8) -> Result<Money, CommerceError> {
        self.try_scale(Decimal::from(percent) / Decimal::ONE_HUNDRED)
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.fold(Ok(Money::zero(currency)), |acc, m| acc?.try_add(m))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency != other.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec!(49.99), Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(dec!(9.6), Currency::USD).display(), "$9.60");
        assert_eq!(Money::new(dec!(100), Currency::JPY).display(), "\u{00a5}100");
        assert_eq!(Money::new(dec!(-12), Currency::USD).display(), "-$12.00");
    }

    #[test]
    fn test_rounding_only_at_presentation() {
        // 3 x $0.335 keeps full precision internally.
        let unit = Money::new(dec!(0.335), Currency::USD);
        let total = unit.try_multiply(3).unwrap();
        assert_eq!(total.amount, dec!(1.005));
        assert_eq!(total.rounded().amount, dec!(1.01));
        assert_eq!(total.display(), "$1.01");
    }

    #[test]
    fn test_money_addition_and_subtraction() {
        let a = Money::new(dec!(10), Currency::USD);
        let b = Money::new(dec!(3), Currency::USD);
        assert_eq!(a.try_add(&b).unwrap().amount, dec!(13));
        assert_eq!(a.try_subtract(&b).unwrap().amount, dec!(7));
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::new(dec!(120), Currency::USD);
        assert_eq!(m.percentage(10).unwrap().amount, dec!(12));
        assert_eq!(m.try_scale(dec!(0.08)).unwrap().amount, dec!(9.60));
    }

    #[test]
    fn test_money_currency_mismatch() {
        let usd = Money::new(dec!(10), Currency::USD);
        let eur = Money::new(dec!(10), Currency::EUR);
        assert!(matches!(
            usd.try_add(&eur),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_sum() {
        let values = [
            Money::new(dec!(1.10), Currency::USD),
            Money::new(dec!(2.20), Currency::USD),
        ];
        let sum = Money::try_sum(values.iter(), Currency::USD).unwrap();
        assert_eq!(sum.amount, dec!(3.30));
    }
}
