//! Fixed-point money primitives.
//!
//! Amounts are whole counts of a currency's minor unit (cents for USD). There is
//! no floating point anywhere in the ledger, so repeated deposits and transfers
//! never drift.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Signed amount in minor units.
///
/// Signed so that negative inputs can be represented and rejected with a
/// proper `InvalidArgument`; stored balances are never negative.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Reject zero and negative amounts for mutations.
    pub fn ensure_positive(self) -> Result<Amount, DomainError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(DomainError::invalid_argument("amount must be positive"))
        }
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// ISO-4217-like currency code (three ASCII letters, stored upper case).
///
/// Purely descriptive: the ledger never converts between currencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::invalid_argument(format!(
                "currency must be a three letter code, got '{code}'"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(Amount::new(1).ensure_positive().is_ok());
        assert!(matches!(
            Amount::ZERO.ensure_positive(),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(Amount::new(-5).ensure_positive().is_err());
    }

    #[test]
    fn checked_add_reports_overflow() {
        assert_eq!(Amount::new(i64::MAX).checked_add(Amount::new(1)), None);
        assert_eq!(
            Amount::new(40).checked_add(Amount::new(2)),
            Some(Amount::new(42))
        );
    }

    #[test]
    fn currency_is_normalised_to_upper_case() {
        assert_eq!(Currency::parse("eur").unwrap().as_str(), "EUR");
        assert_eq!(Currency::parse(" usd ").unwrap(), Currency::usd());
        assert_eq!(Currency::default().as_str(), "USD");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        for bad in ["", "US", "USDX", "U$D", "12A"] {
            assert!(Currency::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn currency_deserializes_through_validation() {
        let ok: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(ok.as_str(), "GBP");
        assert!(serde_json::from_str::<Currency>("\"pounds\"").is_err());
    }

    proptest! {
        /// Adding then subtracting the same positive amount is the identity.
        #[test]
        fn add_then_sub_round_trips(base in 0i64..1_000_000_000, delta in 1i64..1_000_000_000) {
            let base = Amount::new(base);
            let delta = Amount::new(delta);
            let up = base.checked_add(delta).unwrap();
            prop_assert_eq!(up.checked_sub(delta), Some(base));
        }
    }
}
