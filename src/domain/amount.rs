//! Amount type
//!
//! Domain primitive for transfer amounts. Values are in the smallest unit
//! of the account currency (cents for USD), validated at construction so
//! an invalid amount cannot reach the transfer engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A validated, strictly positive transfer amount.
///
/// Entry rows store signed `i64` values directly; `Amount` only covers the
/// requested size of a transfer, which is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive (got {0})")]
    NotPositive(i64),
}

impl Amount {
    /// Create a new Amount, rejecting zero and negative values.
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// The underlying value in the smallest currency unit.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(300).unwrap();
        assert_eq!(amount.get(), 300);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert_eq!(Amount::new(0), Err(AmountError::NotPositive(0)));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert_eq!(Amount::new(-100), Err(AmountError::NotPositive(-100)));
    }

    #[test]
    fn test_amount_serde_rejects_invalid() {
        let ok: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(ok.get(), 250);

        assert!(serde_json::from_str::<Amount>("0").is_err());
        assert!(serde_json::from_str::<Amount>("-10").is_err());
    }
}
