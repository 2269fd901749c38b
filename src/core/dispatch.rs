//! Per-line classification. Every line runs through the same pipeline:
//! comment stripping, text substitutions, aggregation, then an ordered
//! chain of recognizers where the first match wins. The order is part of
//! the engine's contract because many line shapes overlap; `10 pounds to
//! usd` must land on currency while `10 pounds to kg` falls through to
//! mass, and `100 C to F` must survive looking like a hex literal.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::aggregate::{self, AggregateOp};
use crate::core::catalog::{self, UnitCategory};
use crate::core::{convert, datetime, eval, format, numeral, substitute};
use crate::shared::settings::EngineSettings;
use crate::shared::types::ExchangeRateSnapshot;

/// Lines beyond this many bytes are never worth pattern-matching.
pub const MAX_LINE_LENGTH: usize = 1000;

/// Everything one line is allowed to see: the settings, the rate snapshot
/// and the results of the lines above it. Nothing here lets a line look
/// forward.
pub struct LineContext<'a> {
    pub settings: &'a EngineSettings,
    pub rates: Option<&'a ExchangeRateSnapshot>,
    pub prior_results: &'a [String],
    pub now: NaiveDateTime,
}

static RE_AGGREGATION: Lazy<Regex> = Lazy::new(|| {
    // The target must look like a unit token, otherwise `sum * 2` style
    // lines would be eaten here instead of by embedded expansion.
    Regex::new(r#"(?i)^(sum|avg)(?:\s+(?:(?:to|in)\s+)?([a-z°′″'"].*))?$"#).unwrap()
});

static RE_EMBEDDED_AGGREGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(sum|avg)\b").unwrap());

static RE_CONVERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s*([^\s\d].*?)\s+(?:to|in)\s+(\S.*)$").unwrap()
});

static RE_PREFIX_CONVERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([€$£¥])\s*([+-]?\d+(?:\.\d+)?)\s+(?:to|in)\s+(\S.*)$").unwrap()
});

static RE_DIRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s*([^\s\d].*)$").unwrap());

static RE_PREFIX_DIRECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([€$£¥])\s*([+-]?\d+(?:\.\d+)?)$").unwrap());

static RE_PLAIN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(?:\.\d+)?$").unwrap());

/// Evaluate one raw line against its context. Unrecognized, malformed and
/// failed lines all come back as an empty string.
pub fn evaluate_line(ctx: &LineContext, raw: &str) -> String {
    if raw.len() > MAX_LINE_LENGTH {
        return String::new();
    }
    let line = substitute::normalize(raw);
    if line.is_empty() {
        return String::new();
    }
    let line = substitute::expand_ncr(&line);
    let line = substitute::expand_constants(&line);
    let line = substitute::expand_functions(&line);
    let line = substitute::expand_previous(&line, ctx.prior_results);
    let line = substitute::expand_date_keywords(&line, ctx.now);

    if let Some(caps) = RE_AGGREGATION.captures(&line) {
        let op = if caps[1].eq_ignore_ascii_case("sum") {
            AggregateOp::Sum
        } else {
            AggregateOp::Avg
        };
        let target = caps.get(2).map(|m| m.as_str());
        return aggregate::aggregate(
            ctx.prior_results,
            target,
            op,
            fresh_rates(ctx),
            ctx.settings.precision,
        )
        .unwrap_or_default();
    }
    let line = expand_embedded_aggregation(&line, ctx);

    if let Some(result) = datetime::recognize(&line, ctx.now) {
        return result;
    }

    let parts = conversion_parts(&line);
    if let Some((value, src, tgt)) = parts {
        for category in [UnitCategory::Angle, UnitCategory::Frequency] {
            if let Some(result) =
                try_static_conversion(value, src, tgt, category, ctx.settings.precision)
            {
                return result;
            }
        }
    }
    if let Some(result) = try_currency_conversion(ctx, &line) {
        return result;
    }
    if let Some((value, src, tgt)) = parts {
        for category in [
            UnitCategory::DataSize,
            UnitCategory::Length,
            UnitCategory::Mass,
        ] {
            if let Some(result) =
                try_static_conversion(value, src, tgt, category, ctx.settings.precision)
            {
                return result;
            }
        }
    }
    if let Some(result) = numeral::recognize(&line) {
        return result;
    }
    if let Some((value, src, tgt)) = parts {
        for category in [UnitCategory::Temperature, UnitCategory::Time] {
            if let Some(result) =
                try_static_conversion(value, src, tgt, category, ctx.settings.precision)
            {
                return result;
            }
        }
    }

    if let Some(result) = try_direct_statement(ctx, &line) {
        return result;
    }

    match eval::evaluate(&line) {
        Ok(value) => format::format_number(value, ctx.settings.precision),
        Err(_) => String::new(),
    }
}

/// Replace bare `sum`/`avg` tokens inside a longer line with the rendered
/// aggregate so the rest of the line can keep computing with it.
fn expand_embedded_aggregation(line: &str, ctx: &LineContext) -> String {
    RE_EMBEDDED_AGGREGATION
        .replace_all(line, |caps: &regex::Captures| {
            let op = if caps[1].eq_ignore_ascii_case("sum") {
                AggregateOp::Sum
            } else {
                AggregateOp::Avg
            };
            aggregate::aggregate(
                ctx.prior_results,
                None,
                op,
                fresh_rates(ctx),
                ctx.settings.precision,
            )
            .unwrap_or_default()
        })
        .into_owned()
}

/// Split a `<value> <src> to <tgt>` line into its pieces without deciding
/// the category yet.
fn conversion_parts(line: &str) -> Option<(f64, &str, &str)> {
    let caps = RE_CONVERSION.captures(line)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((value, caps.get(2)?.as_str(), caps.get(3)?.as_str().trim()))
}

fn try_static_conversion(
    value: f64,
    src_token: &str,
    tgt_token: &str,
    category: UnitCategory,
    precision: u32,
) -> Option<String> {
    let src = catalog::resolve(src_token, category).ok()?;
    let tgt = catalog::resolve(tgt_token, category).ok()?;
    let converted = convert::convert(value, category, src, tgt).ok()?;
    Some(format::format_quantity(converted, tgt, precision))
}

fn try_currency_conversion(ctx: &LineContext, line: &str) -> Option<String> {
    if let Some(caps) = RE_PREFIX_CONVERSION.captures(line) {
        let value: f64 = caps[2].parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        return exchange(ctx, value, caps.get(1)?.as_str(), caps.get(3)?.as_str().trim());
    }
    let (value, src, tgt) = conversion_parts(line)?;
    exchange(ctx, value, src, tgt)
}

/// The snapshot, but only while it is present and inside the staleness
/// window. Everything that applies a rate gates on this, aggregation over
/// money blocks included.
fn fresh_rates<'a>(ctx: &LineContext<'a>) -> Option<&'a ExchangeRateSnapshot> {
    ctx.rates.filter(|snapshot| !snapshot.is_stale(ctx.now.date()))
}

/// Currency is only live while the snapshot is present and fresh; both
/// codes must carry a rate or the recognizer declines and the dispatcher
/// keeps trying later categories.
fn exchange(ctx: &LineContext, value: f64, src_token: &str, tgt_token: &str) -> Option<String> {
    let snapshot = fresh_rates(ctx)?;
    let src = catalog::resolve_currency(src_token)?;
    let tgt = catalog::resolve_currency(tgt_token)?;
    snapshot.rate(&src)?;
    snapshot.rate(&tgt)?;
    let converted = convert::convert_currency(value, &src, &tgt, snapshot).ok()?;
    Some(format::format_money(converted, &tgt))
}

/// A code-form direct statement needs the snapshot to vouch for the code;
/// without one, any three letters would rerender as money.
fn direct_money(ctx: &LineContext, value: f64, token: &str) -> Option<String> {
    let code = catalog::resolve_currency(token)?;
    let snapshot = ctx.rates?;
    snapshot.rate(&code)?;
    Some(format::format_money(value, &code))
}

const DIRECT_TAIL: [UnitCategory; 5] = [
    UnitCategory::DataSize,
    UnitCategory::Length,
    UnitCategory::Mass,
    UnitCategory::Temperature,
    UnitCategory::Time,
];

/// No-conversion statements: re-render a lone value in its canonical
/// spelling. Hex first, then `value unit`, then a plain number, then
/// spaced binary/octal digit runs.
fn try_direct_statement(ctx: &LineContext, line: &str) -> Option<String> {
    if let Some(result) = numeral::normalize_hex_literal(line) {
        return Some(result);
    }
    if let Some(caps) = RE_PREFIX_DIRECT.captures(line) {
        if let (Some(code), Ok(value)) =
            (catalog::resolve_currency(&caps[1]), caps[2].parse::<f64>())
        {
            if value.is_finite() {
                return Some(format::format_money(value, &code));
            }
        }
    }
    if let Some(caps) = RE_DIRECT.captures(line) {
        if let Ok(value) = caps[1].parse::<f64>() {
            if value.is_finite() {
                let token = &caps[2];
                for category in [UnitCategory::Angle, UnitCategory::Frequency] {
                    if let Ok(unit) = catalog::resolve(token, category) {
                        return Some(format::format_quantity(
                            value,
                            unit,
                            ctx.settings.precision,
                        ));
                    }
                }
                if let Some(result) = direct_money(ctx, value, token) {
                    return Some(result);
                }
                for category in DIRECT_TAIL {
                    if let Ok(unit) = catalog::resolve(token, category) {
                        return Some(format::format_quantity(
                            value,
                            unit,
                            ctx.settings.precision,
                        ));
                    }
                }
            }
        }
    }
    if RE_PLAIN_NUMBER.is_match(line) {
        let value: f64 = line.parse().ok()?;
        return Some(format::format_number(value, ctx.settings.precision));
    }
    numeral::normalize_grouping(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn snapshot() -> ExchangeRateSnapshot {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.1);
        rates.insert("JPY".to_string(), 160.0);
        rates.insert("GBP".to_string(), 0.85);
        ExchangeRateSnapshot::new(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(), rates)
    }

    fn eval_with(prior: &[&str], rates: Option<&ExchangeRateSnapshot>, line: &str) -> String {
        let settings = EngineSettings::default();
        let prior: Vec<String> = prior.iter().map(|s| s.to_string()).collect();
        let ctx = LineContext {
            settings: &settings,
            rates,
            prior_results: &prior,
            now: noon(),
        };
        evaluate_line(&ctx, line)
    }

    fn eval_line(line: &str) -> String {
        eval_with(&[], None, line)
    }

    #[test]
    fn test_blank_comment_and_unrecognized_lines_are_empty() {
        assert_eq!(eval_line(""), "");
        assert_eq!(eval_line("   "), "");
        assert_eq!(eval_line("# note to self"), "");
        assert_eq!(eval_line("hello world"), "");
        assert_eq!(eval_line(&"9".repeat(MAX_LINE_LENGTH + 1)), "");
    }

    #[test]
    fn test_arithmetic_lines() {
        assert_eq!(eval_line("2 + 3 * 4"), "14");
        assert_eq!(eval_line("(2+3)*4"), "20");
        assert_eq!(eval_line("5!"), "120");
        assert_eq!(eval_line("5C2"), "10");
        assert_eq!(eval_line("3 + 4 # keep the rest"), "7");
        assert_eq!(eval_line("pi"), "3.1416");
        assert_eq!(eval_line("2 +"), "");
        assert_eq!(eval_line("5/0"), "");
    }

    #[test]
    fn test_unit_conversions_per_category() {
        assert_eq!(eval_line("45° to rad"), "0.7854 rad");
        assert_eq!(eval_line("100 hz to khz"), "0.1 kHz");
        assert_eq!(eval_line("10 GB to MB"), "10240 MB");
        assert_eq!(eval_line("100 mm to m"), "0.1 m");
        assert_eq!(eval_line("1 kg to lbs"), "2.2046 lbs");
        assert_eq!(eval_line("100 C to F"), "212 °F");
        assert_eq!(eval_line("100 s to min"), "1.6667 min");
        assert_eq!(eval_line("1 week to h"), "168 h");
        assert_eq!(eval_line("2 long tons to kg"), "2032.0938 kg");
    }

    #[test]
    fn test_numeral_lines() {
        assert_eq!(eval_line("1010 to dec"), "10");
        assert_eq!(eval_line("255 to hex"), "0xFF");
        assert_eq!(eval_line("0x10 to bin"), "0001 0000");
    }

    #[test]
    fn test_date_lines() {
        assert_eq!(eval_line("2024/1/31 + 1 month"), "2024/2/29");
        assert_eq!(eval_line("12:00 in 2 h"), "14:00");
        assert_eq!(eval_with(&[], None, "today"), "2024/5/4");
        assert_eq!(eval_with(&[], None, "tomorrow in 1 day"), "2024/5/6");
    }

    #[test]
    fn test_currency_conversions() {
        let snapshot = snapshot();
        assert_eq!(eval_with(&[], Some(&snapshot), "10 eur to usd"), "11 USD");
        assert_eq!(
            eval_with(&[], Some(&snapshot), "$10 to jpy"),
            "1454.55 JPY"
        );
        assert_eq!(eval_with(&[], Some(&snapshot), "10 usd to xxx"), "");
    }

    #[test]
    fn test_currency_unavailable_without_fresh_rates() {
        // No snapshot at all
        assert_eq!(eval_line("10 eur to usd"), "");
        // Stale snapshot: now is years past the table date
        let snapshot = snapshot();
        let settings = EngineSettings::default();
        let ctx = LineContext {
            settings: &settings,
            rates: Some(&snapshot),
            prior_results: &[],
            now: NaiveDate::from_ymd_opt(2026, 8, 25)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        };
        assert_eq!(evaluate_line(&ctx, "10 eur to usd"), "");
    }

    #[test]
    fn test_overlapping_shapes_resolve_by_priority() {
        let snapshot = snapshot();
        // Bare date before arithmetic division
        assert_eq!(eval_line("2024/5/1"), "2024/5/1");
        assert_eq!(eval_line("2024/5"), "404.8");
        // Time expression before the time-unit recognizer
        assert_eq!(eval_line("12:30 in 45 min"), "13:15");
        // pounds is money first, mass when the target is not a currency
        assert_eq!(
            eval_with(&[], Some(&snapshot), "10 pounds to usd"),
            "12.94 USD"
        );
        assert_eq!(
            eval_with(&[], Some(&snapshot), "10 pounds to kg"),
            "4.5359 kg"
        );
        // GB is two letters, never a currency code
        assert_eq!(eval_with(&[], Some(&snapshot), "10 GB to MB"), "10240 MB");
        // in is both a connective and the inch unit
        assert_eq!(eval_line("5 in to cm"), "12.7 cm");
        // Hex-shaped digits with a non-base target fall to temperature
        assert_eq!(eval_line("100 C to F"), "212 °F");
        // A base keyword target keeps the line in numeral conversion
        assert_eq!(eval_line("255 to hex"), "0xFF");
        // K resolves as Kelvin ahead of the time recognizer
        assert_eq!(eval_line("300 K to C"), "26.85 °C");
    }

    #[test]
    fn test_direct_statements() {
        let snapshot = snapshot();
        assert_eq!(eval_line("45°"), "45°");
        assert_eq!(eval_line("21 C"), "21 °C");
        assert_eq!(eval_line("3.14159 m"), "3.1416 m");
        assert_eq!(eval_line("1 day"), "1 day");
        assert_eq!(eval_line("2 day"), "2 days");
        assert_eq!(eval_with(&[], Some(&snapshot), "100 usd"), "100 USD");
        assert_eq!(eval_line("100 usd"), "");
        assert_eq!(eval_line("$100"), "100 USD");
        // Category order applies to bare statements too
        assert_eq!(eval_with(&[], Some(&snapshot), "2 pounds"), "2 GBP");
        assert_eq!(eval_line("2 pounds"), "2 lbs");
        assert_eq!(eval_line("0xff"), "0xFF");
        assert_eq!(eval_line("1010 0011"), "1010 0011");
        assert_eq!(eval_line("0755"), "755");
        assert_eq!(eval_line("42"), "42");
        assert_eq!(eval_line("3.14159"), "3.1416");
    }

    #[test]
    fn test_previous_reference_lines() {
        assert_eq!(eval_with(&["4"], None, "prev + 1"), "5");
        assert_eq!(eval_with(&["4", ""], None, "answer * 3"), "12");
        assert_eq!(eval_with(&[], None, "prev + 1"), "");
    }

    #[test]
    fn test_aggregation_lines() {
        let prior = ["3 km", "200 m", ""];
        assert_eq!(eval_with(&prior, None, "sum"), "3.2 km");
        assert_eq!(eval_with(&prior, None, "avg"), "1.6 km");
        assert_eq!(eval_with(&prior, None, "sum mi"), "1.9884 mi");
        assert_eq!(eval_with(&prior, None, "sum to mi"), "1.9884 mi");
        assert_eq!(eval_with(&[], None, "sum"), "");
    }

    #[test]
    fn test_stale_rates_block_money_aggregation() {
        let snapshot = snapshot();
        let settings = EngineSettings::default();
        let eval_stale = |prior: &[&str], line: &str| {
            let prior: Vec<String> = prior.iter().map(|s| s.to_string()).collect();
            let ctx = LineContext {
                settings: &settings,
                rates: Some(&snapshot),
                prior_results: &prior,
                now: NaiveDate::from_ymd_opt(2026, 8, 25)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            };
            evaluate_line(&ctx, line)
        };
        assert_eq!(eval_stale(&["4 EUR", "6 USD"], "sum"), "");
        assert_eq!(eval_stale(&["4 EUR", "6 EUR"], "avg"), "");
        // The same block stays live while the table is fresh
        assert_eq!(
            eval_with(&["4 EUR", "6 USD"], Some(&snapshot), "sum"),
            "9.45 EUR"
        );
    }

    #[test]
    fn test_embedded_aggregation_feeds_arithmetic() {
        assert_eq!(eval_with(&["10", "20"], None, "sum * 2"), "60");
        assert_eq!(eval_with(&["10", "20"], None, "avg + 5"), "20");
    }

    #[test]
    fn test_functions_and_constants_expand_before_dispatch() {
        assert_eq!(eval_line("sqrt(16) + 1"), "5");
        assert_eq!(eval_line("round(2.7182, 2) * 2"), "5.44");
        assert_eq!(eval_line("diff(3, 10) m"), "7 m");
    }
}
