//! Currency codes
//!
//! The set of currencies the ledger accepts. Accounts store the code as
//! text; this type exists so request validation happens in one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported currency code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Usd,
    Eur,
    Cad,
    Aud,
}

/// Error returned for unsupported currency codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct CurrencyError(pub String);

impl Currency {
    /// The canonical ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
        }
    }

    /// All supported currencies.
    pub fn all() -> &'static [Currency] {
        &[Currency::Usd, Currency::Eur, Currency::Cad, Currency::Aud]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            other => Err(CurrencyError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_codes() {
        for currency in Currency::all() {
            let parsed: Currency = currency.code().parse().unwrap();
            assert_eq!(parsed, *currency);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let err = "BTC".parse::<Currency>().unwrap_err();
        assert_eq!(err, CurrencyError("BTC".to_string()));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("usd".parse::<Currency>().is_err());
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }
}
