//! Unit catalog: categories, unit variants, alias resolution and display
//! symbols. Conversion factors live in `core::convert`; this module only
//! answers "which unit is this token" and "how is this unit written".

use serde::{Deserialize, Serialize};

use crate::shared::error::{EngineError, EngineResult};

// ============================================================================
// Categories and units
// ============================================================================

/// The independent unit domains. Conversions never cross categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Angle,
    DataSize,
    Frequency,
    Length,
    Mass,
    Temperature,
    Time,
    Currency,
    NumeralSystem,
}

/// Every unit of the seven closed categories, plus a `None` sentinel for
/// "unspecified". Currency codes are open-ended strings validated against
/// the rate snapshot, and numeral systems are bases rather than measures,
/// so neither appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    None,
    // Angle
    Degree,
    Radian,
    Gradian,
    ArcMinute,
    ArcSecond,
    // DataSize
    Bit,
    Kilobit,
    Megabit,
    Gigabit,
    Terabit,
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
    // Frequency
    Hertz,
    Kilohertz,
    Megahertz,
    Gigahertz,
    // Length
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
    Yard,
    Mile,
    // Mass
    Milligram,
    Gram,
    Kilogram,
    Tonne,
    Ounce,
    Pound,
    Stone,
    LongTon,
    ShortTon,
    // Temperature
    Celsius,
    Fahrenheit,
    Kelvin,
    Rankine,
    Reaumur,
    // Time
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    pub fn category(self) -> Option<UnitCategory> {
        use Unit::*;
        Some(match self {
            None => return Option::None,
            Degree | Radian | Gradian | ArcMinute | ArcSecond => UnitCategory::Angle,
            Bit | Kilobit | Megabit | Gigabit | Terabit | Byte | Kilobyte | Megabyte
            | Gigabyte | Terabyte => UnitCategory::DataSize,
            Hertz | Kilohertz | Megahertz | Gigahertz => UnitCategory::Frequency,
            Millimeter | Centimeter | Meter | Kilometer | Inch | Foot | Yard | Mile => {
                UnitCategory::Length
            }
            Milligram | Gram | Kilogram | Tonne | Ounce | Pound | Stone | LongTon
            | ShortTon => UnitCategory::Mass,
            Celsius | Fahrenheit | Kelvin | Rankine | Reaumur => UnitCategory::Temperature,
            Millisecond | Second | Minute | Hour | Day | Week | Month | Year => {
                UnitCategory::Time
            }
        })
    }

    /// Canonical display symbol at singular magnitude.
    pub fn symbol(self) -> &'static str {
        use Unit::*;
        match self {
            None => "",
            Degree => "°",
            Radian => "rad",
            Gradian => "grad",
            ArcMinute => "′",
            ArcSecond => "″",
            Bit => "b",
            Kilobit => "Kb",
            Megabit => "Mb",
            Gigabit => "Gb",
            Terabit => "Tb",
            Byte => "B",
            Kilobyte => "KB",
            Megabyte => "MB",
            Gigabyte => "GB",
            Terabyte => "TB",
            Hertz => "Hz",
            Kilohertz => "kHz",
            Megahertz => "MHz",
            Gigahertz => "GHz",
            Millimeter => "mm",
            Centimeter => "cm",
            Meter => "m",
            Kilometer => "km",
            Inch => "in",
            Foot => "ft",
            Yard => "yd",
            Mile => "mi",
            Milligram => "mg",
            Gram => "g",
            Kilogram => "kg",
            Tonne => "t",
            Ounce => "oz",
            Pound => "lb",
            Stone => "st",
            LongTon => "long ton",
            ShortTon => "short ton",
            Celsius => "°C",
            Fahrenheit => "°F",
            Kelvin => "K",
            Rankine => "°Ra",
            Reaumur => "°Re",
            Millisecond => "ms",
            Second => "s",
            Minute => "min",
            Hour => "h",
            Day => "day",
            Week => "week",
            Month => "month",
            Year => "year",
        }
    }

    /// Display symbol adjusted for the magnitude: word-form units pluralize
    /// when the magnitude is not ±1 ("1 day" but "2 days", "1 lb" but
    /// "2 lbs").
    pub fn display(self, magnitude: f64) -> &'static str {
        let plural = magnitude.abs() != 1.0;
        if !plural {
            return self.symbol();
        }
        use Unit::*;
        match self {
            Pound => "lbs",
            Day => "days",
            Week => "weeks",
            Month => "months",
            Year => "years",
            LongTon => "long tons",
            ShortTon => "short tons",
            other => other.symbol(),
        }
    }

    /// Symbols written flush against the number, like `45°` or `12′`.
    pub fn attaches_to_number(self) -> bool {
        matches!(self, Unit::Degree | Unit::ArcMinute | Unit::ArcSecond)
    }
}

// ============================================================================
// Alias resolution
// ============================================================================

/// Resolve an input token within one category. Tokens arrive trimmed with
/// internal whitespace collapsed, so two-word units like "long ton" match
/// as-is.
pub fn resolve(token: &str, category: UnitCategory) -> EngineResult<Unit> {
    let token = token.trim();
    let unit = match category {
        UnitCategory::Angle => resolve_angle(token),
        UnitCategory::DataSize => resolve_data_size(token),
        UnitCategory::Frequency => resolve_frequency(token),
        UnitCategory::Length => resolve_length(token),
        UnitCategory::Mass => resolve_mass(token),
        UnitCategory::Temperature => resolve_temperature(token),
        UnitCategory::Time => resolve_time(token),
        // Currency and numeral systems resolve through their own tables.
        UnitCategory::Currency | UnitCategory::NumeralSystem => Unit::None,
    };
    if unit == Unit::None {
        return Err(EngineError::UnknownUnit(format!(
            "'{}' in {:?}",
            token, category
        )));
    }
    Ok(unit)
}

fn resolve_angle(token: &str) -> Unit {
    match token {
        "°" => return Unit::Degree,
        "′" | "'" => return Unit::ArcMinute,
        "″" | "\"" => return Unit::ArcSecond,
        _ => {}
    }
    match token.to_lowercase().as_str() {
        "deg" | "degree" | "degrees" => Unit::Degree,
        "rad" | "radian" | "radians" => Unit::Radian,
        "grad" | "grads" | "gradian" | "gradians" | "gon" => Unit::Gradian,
        "arcmin" | "arcminute" | "arcminutes" | "angular minute" | "angular minutes"
        | "minute of arc" | "minutes of arc" => Unit::ArcMinute,
        "arcsec" | "arcsecond" | "arcseconds" | "angular second" | "angular seconds"
        | "second of arc" | "seconds of arc" => Unit::ArcSecond,
        _ => Unit::None,
    }
}

fn resolve_data_size(token: &str) -> Unit {
    // Spelled-out names are case-insensitive.
    match token.to_lowercase().as_str() {
        "bit" | "bits" => return Unit::Bit,
        "kilobit" | "kilobits" => return Unit::Kilobit,
        "megabit" | "megabits" => return Unit::Megabit,
        "gigabit" | "gigabits" => return Unit::Gigabit,
        "terabit" | "terabits" => return Unit::Terabit,
        "byte" | "bytes" => return Unit::Byte,
        "kilobyte" | "kilobytes" => return Unit::Kilobyte,
        "megabyte" | "megabytes" => return Unit::Megabyte,
        "gigabyte" | "gigabytes" => return Unit::Gigabyte,
        "terabyte" | "terabytes" => return Unit::Terabyte,
        _ => {}
    }
    // Symbol forms: the magnitude prefix is case-insensitive, the trailing
    // b/B marker is not (Kb is kilobits, KB kilobytes).
    let Some(marker) = token.chars().last() else {
        return Unit::None;
    };
    let prefix = token[..token.len() - marker.len_utf8()].to_lowercase();
    let bits = match marker {
        'b' => true,
        'B' => false,
        _ => return Unit::None,
    };
    match (prefix.as_str(), bits) {
        ("", true) => Unit::Bit,
        ("k", true) => Unit::Kilobit,
        ("m", true) => Unit::Megabit,
        ("g", true) => Unit::Gigabit,
        ("t", true) => Unit::Terabit,
        ("", false) => Unit::Byte,
        ("k", false) => Unit::Kilobyte,
        ("m", false) => Unit::Megabyte,
        ("g", false) => Unit::Gigabyte,
        ("t", false) => Unit::Terabyte,
        _ => Unit::None,
    }
}

fn resolve_frequency(token: &str) -> Unit {
    match token.to_lowercase().as_str() {
        "hz" | "hertz" => Unit::Hertz,
        "khz" | "kilohertz" => Unit::Kilohertz,
        "mhz" | "megahertz" => Unit::Megahertz,
        "ghz" | "gigahertz" => Unit::Gigahertz,
        _ => Unit::None,
    }
}

fn resolve_length(token: &str) -> Unit {
    match token.to_lowercase().as_str() {
        "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Unit::Millimeter,
        "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Unit::Centimeter,
        "m" | "meter" | "meters" | "metre" | "metres" => Unit::Meter,
        "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Unit::Kilometer,
        "in" | "inch" | "inches" => Unit::Inch,
        "ft" | "foot" | "feet" => Unit::Foot,
        "yd" | "yard" | "yards" => Unit::Yard,
        "mi" | "mile" | "miles" => Unit::Mile,
        _ => Unit::None,
    }
}

fn resolve_mass(token: &str) -> Unit {
    match token.to_lowercase().as_str() {
        "mg" | "milligram" | "milligrams" => Unit::Milligram,
        "g" | "gram" | "grams" | "gramme" | "grammes" => Unit::Gram,
        "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kilogram,
        "t" | "tonne" | "tonnes" | "ton" | "tons" => Unit::Tonne,
        "oz" | "ounce" | "ounces" => Unit::Ounce,
        "lb" | "lbs" | "pound" | "pounds" => Unit::Pound,
        "st" | "stone" | "stones" => Unit::Stone,
        "long ton" | "long tons" => Unit::LongTon,
        "short ton" | "short tons" => Unit::ShortTon,
        _ => Unit::None,
    }
}

fn resolve_temperature(token: &str) -> Unit {
    // Symbol forms are case-sensitive: K is Kelvin, lowercase k is nothing.
    match token {
        "°C" | "C" => return Unit::Celsius,
        "°F" | "F" => return Unit::Fahrenheit,
        "K" => return Unit::Kelvin,
        "°Ra" | "Ra" => return Unit::Rankine,
        "°Re" | "Re" => return Unit::Reaumur,
        _ => {}
    }
    match token.to_lowercase().as_str() {
        "celsius" | "centigrade" => Unit::Celsius,
        "fahrenheit" => Unit::Fahrenheit,
        "kelvin" => Unit::Kelvin,
        "rankine" => Unit::Rankine,
        "reaumur" | "réaumur" => Unit::Reaumur,
        _ => Unit::None,
    }
}

fn resolve_time(token: &str) -> Unit {
    match token.to_lowercase().as_str() {
        "ms" | "millisecond" | "milliseconds" => Unit::Millisecond,
        "s" | "sec" | "secs" | "second" | "seconds" => Unit::Second,
        "min" | "mins" | "minute" | "minutes" => Unit::Minute,
        "h" | "hr" | "hrs" | "hour" | "hours" => Unit::Hour,
        "day" | "days" => Unit::Day,
        "week" | "weeks" => Unit::Week,
        "month" | "months" => Unit::Month,
        "year" | "years" | "yr" | "yrs" => Unit::Year,
        _ => Unit::None,
    }
}

// ============================================================================
// Currency tokens
// ============================================================================

/// Map a currency token to a candidate ISO-4217 code. Symbols and word
/// forms map to the majors; any other three-letter token is uppercased and
/// offered as a code. Whether the code actually has a rate is decided by
/// the caller against the snapshot.
pub fn resolve_currency(token: &str) -> Option<String> {
    let token = token.trim();
    match token {
        "$" => return Some("USD".to_string()),
        "€" => return Some("EUR".to_string()),
        "£" => return Some("GBP".to_string()),
        "¥" => return Some("JPY".to_string()),
        _ => {}
    }
    let lower = token.to_lowercase();
    match lower.as_str() {
        "dollar" | "dollars" => return Some("USD".to_string()),
        "euro" | "euros" => return Some("EUR".to_string()),
        "pound" | "pounds" => return Some("GBP".to_string()),
        "yen" => return Some("JPY".to_string()),
        _ => {}
    }
    if token.len() == 3 && token.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(token.to_uppercase());
    }
    None
}
