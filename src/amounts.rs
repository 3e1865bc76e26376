//! Amounts
//!
//! Money values as they cross the API boundary. The backend sends amounts as
//! decimal strings (`"500"`, `"99.50"`), bare numbers, empty strings or not at
//! all. Everything is coerced into whole paise here so the rest of the crate
//! only deals in integers.

use std::{fmt, str::FromStr};

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use thiserror::Error;

/// Currency every amount is denominated in.
pub const CURRENCY: &Currency = iso::INR;

/// Minor units per rupee.
const MINOR_PER_MAJOR: i64 = 100;

/// Errors raised while coercing raw backend values into an [`Amount`].
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// The value is not a decimal number.
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    /// The value does not fit in minor units.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A rupee amount held in paise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from paise.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole rupees, saturating on overflow.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(MINOR_PER_MAJOR))
    }

    /// Returns the amount in paise.
    pub const fn to_minor_units(self) -> i64 {
        self.0
    }

    /// Parses a decimal rupee string.
    ///
    /// Blank input is an absent value and coerces to zero.
    ///
    /// # Errors
    ///
    /// - [`AmountError::Malformed`]: the text is not a decimal number.
    /// - [`AmountError::OutOfRange`]: the value does not fit in paise.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let text = text.trim();

        if text.is_empty() {
            return Ok(Self::ZERO);
        }

        let major = Decimal::from_str(text).map_err(|source| {
            AmountError::Malformed(format!("{text} ({source})"))
        })?;

        Self::from_decimal(major)
    }

    /// Converts a rupee decimal into paise, rounding half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::OutOfRange`] when the value does not fit in paise.
    pub fn from_decimal(major: Decimal) -> Result<Self, AmountError> {
        major
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| AmountError::OutOfRange(major.to_string()))
    }

    /// Converts a floating point rupee value into paise.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::OutOfRange`] for non-finite or oversized values.
    pub fn from_f64(major: f64) -> Result<Self, AmountError> {
        let decimal =
            Decimal::from_f64_retain(major).ok_or_else(|| AmountError::OutOfRange(major.to_string()))?;

        Self::from_decimal(decimal)
    }

    /// Returns the amount in rupees.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the amount as displayable money.
    pub fn to_money(self) -> Money<'static, Currency> {
        Money::from_minor(self.0, CURRENCY)
    }

    /// Adds two amounts, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Subtracts `other`, never going below zero.
    #[must_use]
    pub fn clamped_sub(self, other: Self) -> Self {
        self.saturating_sub(other).max(Self::ZERO)
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_money())
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal().to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal rupee amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Decimal::from_i64(v)
            .ok_or_else(|| E::custom(AmountError::OutOfRange(v.to_string())))
            .and_then(|major| Amount::from_decimal(major).map_err(E::custom))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Decimal::from_u64(v)
            .ok_or_else(|| E::custom(AmountError::OutOfRange(v.to_string())))
            .and_then(|major| Amount::from_decimal(major).map_err(E::custom))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).map_err(E::custom)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(self)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default)]
        value: Amount,
    }

    #[test]
    fn parse_whole_rupees() -> TestResult {
        assert_eq!(Amount::parse("500")?, Amount::from_minor(50_000));

        Ok(())
    }

    #[test]
    fn parse_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(Amount::parse("10.005")?, Amount::from_minor(1_001));
        assert_eq!(Amount::parse("-10.005")?, Amount::from_minor(-1_001));

        Ok(())
    }

    #[test]
    fn parse_blank_is_zero() -> TestResult {
        assert_eq!(Amount::parse("")?, Amount::ZERO);
        assert_eq!(Amount::parse("   ")?, Amount::ZERO);

        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = Amount::parse("five hundred");

        assert!(
            matches!(result, Err(AmountError::Malformed(_))),
            "expected Malformed, got {result:?}"
        );
    }

    #[test]
    fn from_f64_rejects_nan() {
        assert!(matches!(
            Amount::from_f64(f64::NAN),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn deserializes_strings_numbers_and_nulls() -> TestResult {
        let text: Wrapper = serde_json::from_str(r#"{"value": "99.50"}"#)?;
        let int: Wrapper = serde_json::from_str(r#"{"value": 400}"#)?;
        let float: Wrapper = serde_json::from_str(r#"{"value": 12.5}"#)?;
        let null: Wrapper = serde_json::from_str(r#"{"value": null}"#)?;
        let missing: Wrapper = serde_json::from_str("{}")?;

        assert_eq!(text.value, Amount::from_minor(9_950));
        assert_eq!(int.value, Amount::from_major(400));
        assert_eq!(float.value, Amount::from_minor(1_250));
        assert_eq!(null.value, Amount::ZERO);
        assert_eq!(missing.value, Amount::ZERO);

        Ok(())
    }

    #[test]
    fn deserialize_fails_fast_on_malformed_strings() {
        let result: Result<Wrapper, _> = serde_json::from_str(r#"{"value": "N/A"}"#);

        assert!(result.is_err(), "malformed amounts must not coerce to zero");
    }

    #[test]
    fn serializes_as_rupee_string() -> TestResult {
        let json = serde_json::to_string(&Amount::from_minor(55_000))?;

        assert_eq!(json, r#""550.00""#);

        Ok(())
    }

    #[test]
    fn clamped_sub_never_goes_negative() {
        let result = Amount::from_major(100).clamped_sub(Amount::from_major(250));

        assert_eq!(result, Amount::ZERO);
    }

    #[test]
    fn to_money_uses_rupees() {
        let money = Amount::from_major(5).to_money();

        assert_eq!(money, Money::from_minor(500, iso::INR));
    }
}
