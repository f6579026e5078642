use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-4217 currency code attached to every expense and balance.
///
/// The household this app serves pays in `SEK` almost exclusively, but the
/// balance model is per-currency (a trip abroad produces EUR expenses that
/// must never net against SEK ones), so currency is modeled explicitly.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`Money`](crate::Money)). `minor_units()` returns how many decimal digits
/// are used when converting between:
/// - major units (human input/output, e.g. `10.50 SEK`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Sek,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Sek => "SEK",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    ///
    /// Example: SEK uses 2 fraction digits (öre).
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Sek | Currency::Eur | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SEK" => Ok(Currency::Sek),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::UnknownCurrency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes_case_insensitively() {
        assert_eq!(Currency::try_from("SEK").unwrap(), Currency::Sek);
        assert_eq!(Currency::try_from(" sek ").unwrap(), Currency::Sek);
        assert_eq!(Currency::try_from("eur").unwrap(), Currency::Eur);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(
            Currency::try_from("NOK"),
            Err(EngineError::UnknownCurrency("NOK".to_string()))
        );
    }
}
