use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// Exchange rates keyed by currency code, relative to the base currency.
pub type RateTable = HashMap<String, f64>;

/// Display currency chosen by the user.
///
/// Amounts are always stored in [`Currency::BASE`] (THB); the other
/// currencies exist only for display, converted through a [`RateTable`].
///
/// ## Minor units
///
/// `decimals()` is the number of fraction digits shown when formatting:
/// THB and USD use 2, JPY uses none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Thb,
    Usd,
    Jpy,
}

impl Currency {
    /// The currency every amount is persisted in.
    pub const BASE: Currency = Currency::Thb;

    pub const ALL: [Currency; 3] = [Currency::Thb, Currency::Usd, Currency::Jpy];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Thb => "THB",
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Thb => "฿",
            Currency::Usd => "$",
            Currency::Jpy => "¥",
        }
    }

    /// Number of fraction digits used when formatting amounts.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            Currency::Thb | Currency::Usd => 2,
            Currency::Jpy => 0,
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
        match value.trim() {
            "THB" => Ok(Currency::Thb),
            "USD" => Ok(Currency::Usd),
            "JPY" => Ok(Currency::Jpy),
            _ => Err(EngineError::validation("Invalid currency.")),
        }
    }
}

/// A rate table together with the time it was published (unix seconds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub rates: RateTable,
    pub updated_at: i64,
}

impl ExchangeRates {
    /// Static table used whenever the live source cannot be reached.
    pub fn fallback(now_unix: i64) -> Self {
        let rates = [("THB", 1.0), ("USD", 0.029), ("JPY", 4.3)]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();
        Self {
            rates,
            updated_at: now_unix,
        }
    }
}

/// Formats a base-currency `amount` in `currency`.
///
/// The base currency is never converted. Any other currency is multiplied by
/// its entry in `rates`, defaulting to `1.0` when the table has no entry.
///
/// ```rust
/// use engine::{Currency, Money, RateTable, format_amount};
///
/// let rates = RateTable::from([("USD".to_string(), 0.029), ("JPY".to_string(), 4.3)]);
/// assert_eq!(format_amount(Money::new(100_000), Currency::Usd, &rates), "$29.00");
/// assert_eq!(format_amount(Money::new(100_000), Currency::Jpy, &rates), "¥4,300");
/// ```
pub fn format_amount(amount: Money, currency: Currency, rates: &RateTable) -> String {
    let decimals = currency.decimals();
    let scale = 10_i64.pow(decimals);

    let scaled = if currency == Currency::BASE {
        // Base amounts are already exact minor units.
        amount.minor() * scale / 100
    } else {
        let rate = rates.get(currency.code()).copied().unwrap_or(1.0);
        (amount.as_major() * rate * scale as f64).round() as i64
    };

    let sign = if scaled < 0 { "-" } else { "" };
    let abs = scaled.unsigned_abs();
    let whole = group_thousands(abs / scale as u64);
    if decimals == 0 {
        format!("{sign}{}{whole}", currency.symbol())
    } else {
        let frac = abs % scale as u64;
        format!(
            "{sign}{}{whole}.{frac:0width$}",
            currency.symbol(),
            width = decimals as usize
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human readable age of a rate table, e.g. `"5m ago"`.
pub fn time_ago(updated_at: i64, now_unix: i64) -> String {
    let diff = now_unix - updated_at;
    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86_400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateTable {
        ExchangeRates::fallback(0).rates
    }

    #[test]
    fn base_currency_is_not_converted() {
        assert_eq!(format_amount(Money::new(100_000), Currency::Thb, &rates()), "฿1,000.00");
        assert_eq!(format_amount(Money::new(123_456), Currency::Thb, &rates()), "฿1,234.56");
        assert_eq!(format_amount(Money::ZERO, Currency::Thb, &rates()), "฿0.00");

        let skewed = RateTable::from([("THB".to_string(), 3.0)]);
        assert_eq!(format_amount(Money::new(100_000), Currency::Thb, &skewed), "฿1,000.00");
    }

    #[test]
    fn converts_with_rate_table() {
        let usd = RateTable::from([("USD".to_string(), 0.029)]);
        assert_eq!(format_amount(Money::new(100_000), Currency::Usd, &usd), "$29.00");
        assert_eq!(format_amount(Money::new(100_000), Currency::Jpy, &rates()), "¥4,300");
    }

    #[test]
    fn missing_rate_defaults_to_one() {
        assert_eq!(
            format_amount(Money::new(50_000), Currency::Usd, &RateTable::new()),
            "$500.00"
        );
    }

    #[test]
    fn large_and_negative_amounts_are_grouped() {
        assert_eq!(
            format_amount(Money::new(123_456_789), Currency::Thb, &rates()),
            "฿1,234,567.89"
        );
        assert_eq!(format_amount(Money::new(-50_000), Currency::Thb, &rates()), "-฿500.00");
    }

    #[test]
    fn currency_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::try_from(currency.code()).unwrap(), currency);
        }
        assert_eq!(
            Currency::try_from("EUR"),
            Err(EngineError::validation("Invalid currency."))
        );
    }

    #[test]
    fn time_ago_buckets() {
        assert_eq!(time_ago(1_000, 1_059), "just now");
        assert_eq!(time_ago(1_000, 1_060), "1m ago");
        assert_eq!(time_ago(0, 7_200), "2h ago");
        assert_eq!(time_ago(0, 3 * 86_400), "3d ago");
    }
}
