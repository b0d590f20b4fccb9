//! Amount helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All balances and transaction amounts are `rust_decimal::Decimal`.

use rust_decimal::Decimal;

/// Formats an amount with grouped thousands for report rows.
///
/// Export formatters (PDF/spreadsheet) consume these strings verbatim and
/// do no recomputation, so the magnitude here is final.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let raw = rounded.abs().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (raw, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_small_amounts_ungrouped() {
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(950)), "950");
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(format_amount(dec!(50000)), "50.000");
        assert_eq!(format_amount(dec!(1500000)), "1.500.000");
        assert_eq!(format_amount(dec!(130000)), "130.000");
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(format_amount(dec!(-20000)), "-20.000");
    }

    #[test]
    fn test_fractional_amounts() {
        assert_eq!(format_amount(dec!(1234.5)), "1.234,5");
    }

    #[test]
    fn test_trailing_zero_fraction_dropped() {
        assert_eq!(format_amount(dec!(100000.00)), "100.000");
    }
}
