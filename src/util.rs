//!
//! String and number helpers
//!
//! Locale-independent number parsing and formatting, quoted-string
//! escaping, and the tolerant floating-point comparisons used by the
//! compute-equality operations.
//!
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, recognize},
    multi::many0_count,
    number::complete::recognize_float,
    sequence::pair,
    IResult,
};

use crate::consts::EPS;

pub(crate) fn number(i: &str) -> IResult<&str, &str> {
    alt((recognize_float, recognize(digit1)))(i)
}

/// Parse a double. The decimal separator is always `.`; signs and an
/// exponent are accepted; anything else is rejected.
pub(crate) fn parse_double(s: &str) -> Option<f64> {
    all_consuming(number)(s).ok()?;
    s.parse::<f64>().ok()
}

/// Parse a decimal integer, tolerating a leading sign.
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    let parser: fn(&str) -> IResult<&str, &str> = |i| {
        recognize(pair(
            many0_count(alt((tag("+"), tag("-")))),
            digit1,
        ))(i)
    };
    all_consuming(parser)(s).ok()?;
    s.parse::<i64>().ok()
}

/// Format a double so that it parses back to the same IEEE-754 value,
/// with insignificant trailing zeros trimmed and `.` as the separator.
pub(crate) fn fmt_double(d: f64) -> String {
    format!("{d}")
}

/// Replace every `"` with `""` for quoted output.
pub(crate) fn escape(s: &str) -> String {
    s.replace('"', "\"\"")
}

/// Replace every `""` with `"`; the inverse of [`escape`].
pub(crate) fn unescape(s: &str) -> String {
    s.replace("\"\"", "\"")
}

/// Compare two doubles within a relative tolerance.
pub(crate) fn eq_eps(a: f64, b: f64, e: f64) -> bool {
    (a == b) || (a - b).abs() <= e * (1.0 + (a.abs() + b.abs()) / 2.0)
}

/// Compare two doubles within the default tolerance.
pub(crate) fn eq(a: f64, b: f64) -> bool {
    eq_eps(a, b, EPS)
}

// ==============================
//  Tests
// ==============================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbers() {
        assert_eq!(parse_double("1234.56"), Some(1234.56));
        assert_eq!(parse_double("-71.5"), Some(-71.5));
        assert_eq!(parse_double("+0.25"), Some(0.25));
        assert_eq!(parse_double("1e-7"), Some(1e-7));
        assert_eq!(parse_double("6378137"), Some(6378137.0));
        assert_eq!(parse_double("baz"), None);
        assert_eq!(parse_double("1.5x"), None);

        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("2.5"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn format_numbers() {
        assert_eq!(fmt_double(1.0), "1");
        assert_eq!(fmt_double(6378137.0), "6378137");
        assert_eq!(fmt_double(298.257223563), "298.257223563");
        assert_eq!(fmt_double(-0.5), "-0.5");
        // round-trip
        let d = 0.0174532925199433_f64;
        assert_eq!(fmt_double(d).parse::<f64>().unwrap(), d);
    }

    #[test]
    fn escaping() {
        assert_eq!(escape(r#"say "hi" loud"#), r#"say ""hi"" loud"#);
        assert_eq!(unescape(r#"say ""hi"" loud"#), r#"say "hi" loud"#);
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn float_compare() {
        assert!(eq(0.1 + 0.2, 0.3));
        assert!(!eq(1.0, 1.0001));
        assert!(eq(0.0, 0.0));
    }
}
