//! Duration strings for the `sleep` action
//!
//! Accepts a sequence of decimal numbers, each with an optional fraction and
//! a unit suffix, such as `"300ms"`, `"1.5h"` or `"2h45m"`. Valid units are
//! `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A leading `-` is accepted and
//! yields a zero duration, since a negative sleep returns immediately.

use std::time::Duration;
use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest accepted duration, in nanoseconds (about 290 years)
const MAX_NANOS: u128 = i64::MAX as u128;

const MAX_FRACTION_DIGITS: usize = 20;

/// Duration parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The string is not a sequence of number/unit pairs
    #[error("invalid duration \"{0}\"")]
    Invalid(String),

    /// A number has no unit
    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),

    /// The unit is not one of the known suffixes
    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit {
        /// Unrecognised suffix
        unit: String,
        /// Full input string
        input: String,
    },

    /// The value does not fit in the supported range
    #[error("invalid duration \"{0}\": out of range")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Nanoseconds contributed by the digits after the decimal point.
///
/// Digits past [`MAX_FRACTION_DIGITS`] are below a nanosecond for every unit
/// and are dropped.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let (numerator, denominator) = digits
        .bytes()
        .take(MAX_FRACTION_DIGITS)
        .fold((0u128, 1u128), |(n, d), b| {
            (n * 10 + u128::from(b - b'0'), d * 10)
        });
    numerator * scale / denominator
}

/// Parse a duration string such as `"1m30s"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_part = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map_or(rest.len(), |(i, _)| i);
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse::<u128>()
                .map_err(|_| DurationError::Overflow(input.to_string()))?
        };
        let mut nanos = whole
            .checked_mul(scale)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;

        if !frac_part.is_empty() {
            nanos += fraction_nanos(frac_part, scale);
        }

        total = total
            .checked_add(nanos)
            .filter(|t| *t <= MAX_NANOS)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
    }

    if negative {
        return Ok(Duration::ZERO);
    }

    let secs = (total / NANOS_PER_SEC) as u64;
    let subsec = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, subsec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(
            parse_duration("2h45m").unwrap(),
            Duration::from_secs(2 * 3600 + 45 * 60)
        );
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1m0.5s").unwrap(), Duration::from_millis(60_500));
    }

    #[test]
    fn test_fraction_is_exact() {
        assert_eq!(parse_duration("0.009h").unwrap(), Duration::from_millis(32_400));
        assert_eq!(parse_duration("1.1s").unwrap(), Duration::from_millis(1100));
        assert_eq!(parse_duration("0.3ms").unwrap(), Duration::from_micros(300));
        assert_eq!(
            parse_duration("1.0000000000000000000000001s").unwrap(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_zero_and_sign() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("-1s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(parse_duration(""), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("-"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("."), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("10"), Err(DurationError::MissingUnit(_))));
        assert!(matches!(
            parse_duration("3 seconds"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(
            parse_duration("3d"),
            Err(DurationError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_duration("9999999999999h"),
            Err(DurationError::Overflow(_))
        ));
    }
}
