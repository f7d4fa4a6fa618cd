//! Internal helpers for input parsing and calendar math.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing so every operation reports malformed input the same way.

use chrono::{DateTime, Datelike, Months, NaiveDate};

use crate::{EngineError, Money, ResultEngine};

/// Trims an optional text field, mapping blanks to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parses a strictly positive amount, reporting `message` on any failure.
///
/// Amounts above [`Money::MAX_INPUT`] are refused so monthly and yearly sums
/// stay far from `i64` overflow.
pub(crate) fn parse_positive_amount(value: &str, message: &str) -> ResultEngine<Money> {
    match value.parse::<Money>() {
        Ok(amount) if amount > Money::MAX_INPUT => Err(EngineError::validation(
            "Amount must not exceed 999,999,999,999.99.",
        )),
        Ok(amount) if amount.is_positive() => Ok(amount),
        _ => Err(EngineError::validation(message)),
    }
}

/// Parses a calendar date given as `YYYY-MM-DD` or as an RFC 3339 timestamp,
/// in which case only its date part is kept.
pub(crate) fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| EngineError::validation("Invalid date."))
}

/// First and last day of the month containing `day`.
pub(crate) fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Bounds of the month before the one containing `day`.
pub(crate) fn previous_month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (first, _) = month_bounds(day);
    month_bounds(first.pred_opt().unwrap_or(first))
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain
/// without whitespace.
pub(crate) fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
        assert_eq!(parse_date("2024-03-01T23:30:00+07:00").unwrap(), date(2024, 3, 1));
        assert_eq!(
            parse_date("01/03/2024").unwrap_err(),
            EngineError::validation("Invalid date.")
        );
    }

    #[test]
    fn month_bounds_cover_whole_months() {
        assert_eq!(month_bounds(date(2024, 2, 10)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(date(2023, 12, 31)), (date(2023, 12, 1), date(2023, 12, 31)));
        assert_eq!(
            previous_month_bounds(date(2024, 1, 15)),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn positive_amounts_only() {
        let msg = "Amount must be a positive number.";
        assert_eq!(parse_positive_amount("12.50", msg).unwrap(), Money::new(1250));
        assert_eq!(parse_positive_amount("0", msg).unwrap_err(), EngineError::validation(msg));
        assert_eq!(parse_positive_amount("-3", msg).unwrap_err(), EngineError::validation(msg));
        assert_eq!(parse_positive_amount("abc", msg).unwrap_err(), EngineError::validation(msg));
    }

    #[test]
    fn amounts_are_capped() {
        let msg = "Amount must be a positive number.";
        let too_large = EngineError::validation("Amount must not exceed 999,999,999,999.99.");
        assert_eq!(
            parse_positive_amount("999999999999.99", msg).unwrap(),
            Money::MAX_INPUT
        );
        assert_eq!(parse_positive_amount("1000000000000", msg).unwrap_err(), too_large);
        assert_eq!(parse_positive_amount("50000000000000000", msg).unwrap_err(), too_large);
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ann@example.com"));
        assert!(!looks_like_email("ann@example"));
        assert!(!looks_like_email("ann example@x.io"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("a@@b.com"));
    }
}
