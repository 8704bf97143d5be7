//! Text formatting for invoice cells.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format used for the generation timestamp row.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Formats a monetary amount as `$` followed by a comma-grouped value with exactly two decimals.
///
/// Extra decimal places are rounded half-to-even. The sign, if any, follows the `$`.
///
/// ```rust
/// use invoice2pdf::format::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(5_000_000, 2)), "$50,000.00");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("${}{}.{}", sign, group_thousands(integer), fraction)
}

/// Inserts a comma between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a quantity as a plain integer.
pub fn format_quantity(quantity: u32) -> String {
    quantity.to_string()
}

/// Formats the generation timestamp as `DD/MM/YYYY HH:MM:SS`.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_examples() {
        assert_eq!(format_currency(dec!(50000.00)), "$50,000.00");
        assert_eq!(format_currency(dec!(130000)), "$130,000.00");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999.5)), "$999.50");
        assert_eq!(format_currency(dec!(0.07)), "$0.07");
        assert_eq!(format_currency(dec!(100)), "$100.00");
        assert_eq!(format_currency(dec!(1000)), "$1,000.00");
    }

    #[test]
    fn currency_formats_largest_decimal() {
        let text = format_currency(Decimal::MAX);
        assert!(text.starts_with("$79,228,162,514,"));
        assert!(text.ends_with(".00"));
    }

    #[test]
    fn currency_rounds_half_to_even() {
        assert_eq!(format_currency(dec!(0.125)), "$0.12");
        assert_eq!(format_currency(dec!(0.135)), "$0.14");
        assert_eq!(format_currency(dec!(999.995)), "$1,000.00");
    }

    #[test]
    fn currency_keeps_sign_after_symbol() {
        assert_eq!(format_currency(dec!(-1234.5)), "$-1,234.50");
        assert_eq!(format_currency(dec!(-0.001)), "$0.00");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn timestamp_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(format_timestamp(ts), "07/03/2024 09:05:01");
    }

    #[test]
    fn quantity_is_plain_integer() {
        assert_eq!(format_quantity(2), "2");
        assert_eq!(format_quantity(12000), "12000");
    }
}
