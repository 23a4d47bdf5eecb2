//! Amount normalization for Indonesian-formatted numbers.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Normalize a locale-formatted amount (e.g. "762.300,00") into a decimal.
///
/// Only digits, `,`, `.` and `-` are kept. A separator that appears alone is a
/// thousands separator; when both appear, the one occurring last is the
/// decimal point. Returns `None` when nothing numeric is left.
pub fn normalize_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (None, Some(_)) => cleaned.replace('.', ""),
        (Some(_), None) => cleaned.replace(',', ""),
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, None) => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_period_only_is_thousands() {
        assert_eq!(normalize_amount("762.300"), Some(dec("762300")));
        assert_eq!(normalize_amount("1.000.000"), Some(dec("1000000")));
        for n in [1u32, 12, 999] {
            let raw = format!("{}.{:03}", n, 450);
            let expected = Decimal::from(n * 1000 + 450);
            assert_eq!(normalize_amount(&raw), Some(expected), "{}", raw);
        }
    }

    #[test]
    fn test_comma_only_is_thousands() {
        assert_eq!(normalize_amount("762,300"), Some(dec("762300")));
        assert_eq!(normalize_amount("1,000,000"), Some(dec("1000000")));
    }

    #[test]
    fn test_both_separators_last_is_decimal() {
        assert_eq!(normalize_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(normalize_amount("762.300,00"), Some(dec("762300.00")));
        assert_eq!(normalize_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(normalize_amount("12.345.678,90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_noise_is_stripped() {
        assert_eq!(normalize_amount("Rp 1.234,56"), Some(dec("1234.56")));
        assert_eq!(normalize_amount(" 500 "), Some(dec("500")));
        assert_eq!(normalize_amount("-1.500,00"), Some(dec("-1500.00")));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(normalize_amount(""), None);
        assert_eq!(None::<&str>.and_then(normalize_amount), None);
        assert_eq!(normalize_amount("abc"), None);
        assert_eq!(normalize_amount("-"), None);
        assert_eq!(normalize_amount("1-2"), None);
    }

    #[test]
    fn test_zero_is_a_value() {
        assert_eq!(normalize_amount("0"), Some(Decimal::ZERO));
        assert_eq!(normalize_amount("0,00"), Some(Decimal::ZERO));
    }
}
