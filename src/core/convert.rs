//! Conversion engine. Linear categories convert through one base factor per
//! category (degree, bit, hertz, meter, gram, second); temperature goes
//! through Celsius with affine formulas; currency goes through EUR with the
//! loaded rate snapshot.

use crate::core::catalog::{Unit, UnitCategory};
use crate::core::format;
use crate::shared::error::{EngineError, EngineResult};
use crate::shared::types::ExchangeRateSnapshot;

/// Multiplier from one unit to its category base. Temperature has no linear
/// factor and the `None` sentinel has no category, so both yield `None`.
fn base_factor(unit: Unit) -> Option<f64> {
    use Unit::*;
    Some(match unit {
        // Angle, base degree
        Degree => 1.0,
        Radian => 180.0 / std::f64::consts::PI,
        Gradian => 0.9,
        ArcMinute => 1.0 / 60.0,
        ArcSecond => 1.0 / 3600.0,
        // DataSize, base bit, 1024 ladder
        Bit => 1.0,
        Kilobit => 1024.0,
        Megabit => 1024.0 * 1024.0,
        Gigabit => 1024.0 * 1024.0 * 1024.0,
        Terabit => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        Byte => 8.0,
        Kilobyte => 8.0 * 1024.0,
        Megabyte => 8.0 * 1024.0 * 1024.0,
        Gigabyte => 8.0 * 1024.0 * 1024.0 * 1024.0,
        Terabyte => 8.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0,
        // Frequency, base hertz
        Hertz => 1.0,
        Kilohertz => 1_000.0,
        Megahertz => 1_000_000.0,
        Gigahertz => 1_000_000_000.0,
        // Length, base meter
        Millimeter => 0.001,
        Centimeter => 0.01,
        Meter => 1.0,
        Kilometer => 1000.0,
        Inch => 0.0254,
        Foot => 0.3048,
        Yard => 0.9144,
        Mile => 1609.344,
        // Mass, base gram; avoirdupois units from the exact pound
        Milligram => 0.001,
        Gram => 1.0,
        Kilogram => 1000.0,
        Tonne => 1_000_000.0,
        Ounce => 28.349_523_125,
        Pound => 453.592_37,
        Stone => 6_350.293_18,
        LongTon => 1_016_046.908_8,
        ShortTon => 907_184.74,
        // Time, base second; month is 30 days, year 365
        Millisecond => 0.001,
        Second => 1.0,
        Minute => 60.0,
        Hour => 3600.0,
        Day => 86_400.0,
        Week => 7.0 * 86_400.0,
        Month => 30.0 * 86_400.0,
        Year => 365.0 * 86_400.0,
        None | Celsius | Fahrenheit | Kelvin | Rankine | Reaumur => return Option::None,
    })
}

/// The unit a category's conversions pivot through. The two dynamic
/// categories have no single base unit.
pub(crate) fn base_unit(category: UnitCategory) -> Option<Unit> {
    Some(match category {
        UnitCategory::Angle => Unit::Degree,
        UnitCategory::DataSize => Unit::Bit,
        UnitCategory::Frequency => Unit::Hertz,
        UnitCategory::Length => Unit::Meter,
        UnitCategory::Mass => Unit::Gram,
        UnitCategory::Temperature => Unit::Celsius,
        UnitCategory::Time => Unit::Second,
        UnitCategory::Currency | UnitCategory::NumeralSystem => return None,
    })
}

/// Convert `value` from `src` to `tgt` within `category`.
///
/// `None` or cross-category units are contract violations and fail with
/// `InvalidUnit`; the dispatcher resolves both units before calling here.
/// Identity conversions return the input bit-for-bit rather than going
/// through the factor table.
pub fn convert(value: f64, category: UnitCategory, src: Unit, tgt: Unit) -> EngineResult<f64> {
    if value.is_nan() {
        return Err(EngineError::InvalidValue(
            "NaN cannot be converted".to_string(),
        ));
    }
    if src == Unit::None || tgt == Unit::None {
        return Err(EngineError::InvalidUnit(
            "the None unit cannot be converted".to_string(),
        ));
    }
    if src.category() != Some(category) || tgt.category() != Some(category) {
        return Err(EngineError::InvalidUnit(format!(
            "{:?}/{:?} outside {:?}",
            src, tgt, category
        )));
    }
    if src == tgt {
        return Ok(value);
    }
    if category == UnitCategory::Temperature {
        let celsius = to_celsius(value, src)
            .ok_or_else(|| EngineError::InvalidUnit(format!("{:?} is not a temperature", src)))?;
        return from_celsius(celsius, tgt)
            .ok_or_else(|| EngineError::InvalidUnit(format!("{:?} is not a temperature", tgt)));
    }
    let from = base_factor(src)
        .ok_or_else(|| EngineError::InvalidUnit(format!("{:?} has no linear factor", src)))?;
    let to = base_factor(tgt)
        .ok_or_else(|| EngineError::InvalidUnit(format!("{:?} has no linear factor", tgt)))?;
    Ok(value * from / to)
}

fn to_celsius(value: f64, unit: Unit) -> Option<f64> {
    Some(match unit {
        Unit::Celsius => value,
        Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        Unit::Kelvin => value - 273.15,
        Unit::Rankine => (value - 491.67) * 5.0 / 9.0,
        Unit::Reaumur => value * 5.0 / 4.0,
        _ => return None,
    })
}

fn from_celsius(celsius: f64, unit: Unit) -> Option<f64> {
    // Explicit parentheses keep the order (c * 9/5) + 32.
    Some(match unit {
        Unit::Celsius => celsius,
        Unit::Fahrenheit => (celsius * 9.0 / 5.0) + 32.0,
        Unit::Kelvin => celsius + 273.15,
        Unit::Rankine => (celsius + 273.15) * 9.0 / 5.0,
        Unit::Reaumur => celsius * 4.0 / 5.0,
        _ => return None,
    })
}

/// Convert between two ISO codes through the EUR pivot. Unlike the other
/// categories, currency rounds to 2 decimals at conversion time, except for
/// the identity case which passes the value through untouched.
pub fn convert_currency(
    value: f64,
    src: &str,
    tgt: &str,
    snapshot: &ExchangeRateSnapshot,
) -> EngineResult<f64> {
    if value.is_nan() {
        return Err(EngineError::InvalidValue(
            "NaN cannot be converted".to_string(),
        ));
    }
    if src == tgt {
        return Ok(value);
    }
    let from = snapshot
        .rate(src)
        .ok_or_else(|| EngineError::UnknownUnit(format!("'{}' in Currency", src)))?;
    let to = snapshot
        .rate(tgt)
        .ok_or_else(|| EngineError::UnknownUnit(format!("'{}' in Currency", tgt)))?;
    Ok(round2(value / from * to))
}

fn round2(value: f64) -> f64 {
    format::round_dp(value, 2)
}
