//! `sum` and `avg` over the block of results directly above a line. The
//! block is collected bottom-up: one run of empty results right above the
//! aggregation line is skipped, then results accumulate while they stay
//! the same kind of quantity and stop at the first gap or mismatch. The
//! topmost accumulated line decides the output unit unless the line names
//! an explicit target; unit blocks total in the category base unit and
//! convert to the output unit once at the end.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::catalog::{self, Unit, UnitCategory};
use crate::core::{convert, format};
use crate::shared::types::ExchangeRateSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Sum,
    Avg,
}

/// A result line re-read as a quantity. Plain numbers, unit quantities and
/// money never mix inside one block.
#[derive(Debug, Clone, PartialEq)]
enum Quantity {
    Plain(f64),
    Measure(f64, Unit),
    Money(f64, String),
}

static RE_RESULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)\s*(.*)$").unwrap());

/// Unit categories in the order the dispatcher tries them, minus the two
/// that never appear as a rendered `value unit` result.
const STATIC_ORDER: [UnitCategory; 7] = [
    UnitCategory::Angle,
    UnitCategory::Frequency,
    UnitCategory::DataSize,
    UnitCategory::Length,
    UnitCategory::Mass,
    UnitCategory::Temperature,
    UnitCategory::Time,
];

fn resolve_static(token: &str) -> Option<Unit> {
    STATIC_ORDER
        .iter()
        .find_map(|&category| catalog::resolve(token, category).ok())
}

fn parse_result(text: &str) -> Option<Quantity> {
    let caps = RE_RESULT.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let rest = caps[2].trim();
    if rest.is_empty() {
        return Some(Quantity::Plain(value));
    }
    if let Some(unit) = resolve_static(rest) {
        return Some(Quantity::Measure(value, unit));
    }
    // The engine renders money as an uppercase three-letter code
    if rest.len() == 3 && rest.chars().all(|c| c.is_ascii_uppercase()) {
        return Some(Quantity::Money(value, rest.to_string()));
    }
    None
}

fn compatible(a: &Quantity, b: &Quantity) -> bool {
    match (a, b) {
        (Quantity::Plain(_), Quantity::Plain(_)) => true,
        (Quantity::Measure(_, ua), Quantity::Measure(_, ub)) => ua.category() == ub.category(),
        (Quantity::Money(_, _), Quantity::Money(_, _)) => true,
        _ => false,
    }
}

/// Nearest-first list of quantities forming the block above the line.
fn collect_block(prior_results: &[String]) -> Vec<Quantity> {
    let mut block: Vec<Quantity> = Vec::new();
    for text in prior_results.iter().rev() {
        if text.is_empty() {
            if block.is_empty() {
                continue;
            }
            break;
        }
        match parse_result(text) {
            Some(quantity) => {
                if let Some(nearest) = block.first() {
                    if !compatible(nearest, &quantity) {
                        break;
                    }
                }
                block.push(quantity);
            }
            None => break,
        }
    }
    block
}

fn reduce(total: f64, count: usize, op: AggregateOp) -> f64 {
    match op {
        AggregateOp::Sum => total,
        AggregateOp::Avg => total / count as f64,
    }
}

/// Aggregate the block above into one rendered result. `None` means the
/// line has nothing usable to aggregate and renders empty.
pub fn aggregate(
    prior_results: &[String],
    target: Option<&str>,
    op: AggregateOp,
    rates: Option<&ExchangeRateSnapshot>,
    precision: u32,
) -> Option<String> {
    let block = collect_block(prior_results);
    match block.last()? {
        Quantity::Plain(_) => {
            if target.is_some() {
                return None;
            }
            let mut total = 0.0;
            let mut count = 0usize;
            for quantity in &block {
                if let Quantity::Plain(value) = quantity {
                    total += value;
                    count += 1;
                }
            }
            Some(format::format_number(reduce(total, count, op), precision))
        }
        Quantity::Measure(_, topmost) => {
            let category = topmost.category()?;
            let base = convert::base_unit(category)?;
            let target_unit = match target {
                Some(token) => catalog::resolve(token, category).ok()?,
                None => *topmost,
            };
            // Totals accumulate in the base unit; an affine target's
            // offset applies once, on the final conversion.
            let mut total = 0.0;
            let mut count = 0usize;
            for quantity in &block {
                let (value, unit) = match quantity {
                    Quantity::Measure(value, unit) => (*value, *unit),
                    _ => return None,
                };
                match convert::convert(value, category, unit, base) {
                    Ok(converted) => {
                        total += converted;
                        count += 1;
                    }
                    Err(_) => break,
                }
            }
            if count == 0 {
                return None;
            }
            let reduced =
                convert::convert(reduce(total, count, op), category, base, target_unit).ok()?;
            Some(format::format_quantity(reduced, target_unit, precision))
        }
        Quantity::Money(_, topmost) => {
            let snapshot = rates?;
            let target_code = match target {
                Some(token) => catalog::resolve_currency(token)?,
                None => topmost.clone(),
            };
            let mut total = 0.0;
            let mut count = 0usize;
            for quantity in &block {
                let (value, code) = match quantity {
                    Quantity::Money(value, code) => (*value, code),
                    _ => return None,
                };
                match convert::convert_currency(value, code, &target_code, snapshot) {
                    Ok(converted) => {
                        total += converted;
                        count += 1;
                    }
                    Err(_) => break,
                }
            }
            if count == 0 {
                return None;
            }
            Some(format::format_money(reduce(total, count, op), &target_code))
        }
    }
}
