//! Result-text rendering: rounding, trailing-zero stripping, quantity and
//! money display.

use crate::core::catalog::Unit;

/// Round half away from zero at `digits` decimal places.
pub fn round_dp(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Render a number rounded to `precision` digits. Trailing zeros and a
/// trailing decimal point are stripped; plain decimal notation with a `.`
/// separator, no grouping, no exponent.
pub fn format_number(value: f64, precision: u32) -> String {
    let mut rounded = round_dp(value, precision);
    if !rounded.is_finite() {
        // Never produced by the dispatcher; render as unresolved.
        return String::new();
    }
    if rounded == 0.0 {
        // Keep -0 from printing a sign.
        rounded = 0.0;
    }
    let mut text = format!("{:.*}", precision as usize, rounded);
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    text
}

/// Render a converted quantity with its unit symbol. Degree-like symbols
/// sit flush against the number; everything else is separated by a space
/// and pluralized by magnitude where the unit has word forms.
pub fn format_quantity(value: f64, unit: Unit, precision: u32) -> String {
    let number = format_number(value, precision);
    if number.is_empty() {
        return number;
    }
    if unit.attaches_to_number() {
        return format!("{}{}", number, unit.symbol());
    }
    let rounded = round_dp(value, precision);
    format!("{} {}", number, unit.display(rounded))
}

/// Money renders at cent resolution with the ISO code as suffix.
pub fn format_money(value: f64, code: &str) -> String {
    let number = format_number(value, 2);
    if number.is_empty() {
        return number;
    }
    format!("{} {}", number, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        // 0.125 and 2.5 are exactly representable, so the tie is real
        assert_eq!(format_number(0.125, 2), "0.13");
        assert_eq!(format_number(-0.125, 2), "-0.13");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(-2.5, 0), "-3");
    }

    #[test]
    fn test_strips_trailing_zeros() {
        assert_eq!(format_number(3.2, 4), "3.2");
        assert_eq!(format_number(1.0, 4), "1");
        assert_eq!(format_number(0.0001, 4), "0.0001");
        assert_eq!(format_number(1234567.0, 2), "1234567");
    }

    #[test]
    fn test_zero_is_unsigned() {
        assert_eq!(format_number(-0.00004, 4), "0");
        assert_eq!(format_number(0.0, 0), "0");
    }

    #[test]
    fn test_precision_zero_has_no_point() {
        assert_eq!(format_number(14.0, 0), "14");
        assert_eq!(format_number(14.7, 0), "15");
    }

    #[test]
    fn test_quantity_layout() {
        assert_eq!(format_quantity(3.2, Unit::Kilometer, 4), "3.2 km");
        assert_eq!(format_quantity(45.0, Unit::Degree, 4), "45°");
        assert_eq!(format_quantity(2.0, Unit::Pound, 4), "2 lbs");
        assert_eq!(format_quantity(1.0, Unit::Day, 4), "1 day");
        assert_eq!(format_quantity(21.0, Unit::Celsius, 4), "21 °C");
    }

    #[test]
    fn test_money_layout() {
        assert_eq!(format_money(11.0, "USD"), "11 USD");
        assert_eq!(format_money(11.05, "USD"), "11.05 USD");
        assert_eq!(format_money(1234.5, "JPY"), "1234.5 JPY");
    }

    #[test]
    fn test_non_finite_values_render_empty() {
        assert_eq!(format_number(f64::NAN, 4), "");
        assert_eq!(format_quantity(f64::INFINITY, Unit::Kilometer, 4), "");
        // No dangling code after a value that could not be rendered
        assert_eq!(format_money(f64::INFINITY, "USD"), "");
        assert_eq!(format_money(f64::NAN, "USD"), "");
    }
}
