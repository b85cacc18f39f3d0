//! Display currency for prices.
//!
//! Prices come from the store API as JSON numbers and are kept as
//! [`Decimal`] so cart totals never accumulate binary floating point error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Format an amount the way shoppers in this currency expect it.
    ///
    /// `BRL` uses `.` for thousands and `,` for decimals (`R$ 1.234,50`);
    /// the others use `,` and `.` (`$1,234.50`).
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let (group, decimal) = match self {
            Self::BRL => ('.', ','),
            Self::USD | Self::EUR => (',', '.'),
        };

        let rounded = amount.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(group);
            }
            grouped.push(digit);
        }

        let sign = if negative { "-" } else { "" };
        format!("{sign}{}{grouped}{decimal}{cents}", self.symbol())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_brl() {
        assert_eq!(CurrencyCode::BRL.format(Decimal::new(1_234_5, 1)), "R$ 1.234,50");
        assert_eq!(CurrencyCode::BRL.format(Decimal::ZERO), "R$ 0,00");
    }

    #[test]
    fn test_format_usd_groups_millions() {
        assert_eq!(
            CurrencyCode::USD.format(Decimal::new(123_456_789, 2)),
            "$1,234,567.89"
        );
    }

    #[test]
    fn test_format_rounds_to_cents() {
        assert_eq!(CurrencyCode::EUR.format(Decimal::new(19_999, 3)), "€20.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert!("xyz".parse::<CurrencyCode>().is_err());
    }
}
