//! Text substitutions that run before a line is classified: comment
//! stripping, nCr expansion, math constants, inline functions, references
//! to earlier results and date keywords. Every pass rewrites the line into
//! plain text the downstream recognizers can handle; anything that cannot
//! be expanded is left in place untouched.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::core::{datetime, eval, format};

/// Fixpoint cap for the function pass so nested calls expand fully.
const MAX_EXPANSION_ROUNDS: usize = 8;

static RE_BASE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:bin|oct|dec|hex):").unwrap());

static RE_NCR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w.])(\d+)\s*[cC]\s*(\d+)\b").unwrap());

static RE_CONSTANT_PI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpi\b").unwrap());
static RE_CONSTANT_E: Lazy<Regex> = Lazy::new(|| Regex::new(r"\be\b").unwrap());

static RE_FN_RAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rand\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)").unwrap()
});
static RE_FN_RANDINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"randint\(\s*(-?\d+)\s*,\s*(-?\d+)\s*\)").unwrap());
static RE_FN_DIFF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"diff\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)").unwrap()
});
static RE_FN_ROUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"round\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(\d+)\s*\)").unwrap()
});
static RE_FN_SQRT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sqrt\(\s*(-?\d+(?:\.\d+)?)\s*\)").unwrap());

static RE_PREVIOUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:previous|prev|answer|ans)\b").unwrap());

static RE_DATE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(now|time|today|date|yesterday|tomorrow)\b").unwrap());

/// Strip a trailing `#` comment and collapse runs of whitespace.
pub fn normalize(raw: &str) -> String {
    let body = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    body.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrite `nCr` terms to their binomial value. Lines carrying an explicit
/// base prefix are skipped so hex digits are not mistaken for the operator.
pub fn expand_ncr(line: &str) -> String {
    if RE_BASE_PREFIX.is_match(line) {
        return line.to_string();
    }
    RE_NCR
        .replace_all(line, |caps: &regex::Captures| {
            let expanded = caps[2]
                .parse::<u64>()
                .ok()
                .zip(caps[3].parse::<u64>().ok())
                .and_then(|(n, r)| eval::combinations(n, r));
            match expanded {
                Some(value) => format!("{}{}", &caps[1], value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace the lowercase constants `pi` (and the symbol form) and `e`.
pub fn expand_constants(line: &str) -> String {
    let line = line.replace('π', "3.141592653589793");
    let line = RE_CONSTANT_PI.replace_all(&line, "3.141592653589793");
    RE_CONSTANT_E
        .replace_all(&line, "2.718281828459045")
        .into_owned()
}

/// Expand `rand`, `randint`, `diff`, `round` and `sqrt` calls over numeric
/// literals, repeating until the line stops changing so nested calls
/// resolve inside out. Calls with out-of-domain arguments stay as written.
pub fn expand_functions(line: &str) -> String {
    let mut current = line.to_string();
    for _ in 0..MAX_EXPANSION_ROUNDS {
        let next = expand_functions_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn expand_functions_once(line: &str) -> String {
    let line = RE_FN_RANDINT.replace_all(line, |caps: &regex::Captures| {
        match (caps[1].parse::<i64>(), caps[2].parse::<i64>()) {
            (Ok(a), Ok(b)) if a <= b => {
                format!("{}", rand::thread_rng().gen_range(a..=b))
            }
            _ => caps[0].to_string(),
        }
    });
    let line = RE_FN_RAND.replace_all(&line, |caps: &regex::Captures| {
        match (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            (Ok(a), Ok(b)) if a <= b => {
                format!("{}", rand::thread_rng().gen_range(a..=b))
            }
            _ => caps[0].to_string(),
        }
    });
    let line = RE_FN_DIFF.replace_all(&line, |caps: &regex::Captures| {
        match (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
            (Ok(a), Ok(b)) => format!("{}", (a - b).abs()),
            _ => caps[0].to_string(),
        }
    });
    let line = RE_FN_ROUND.replace_all(&line, |caps: &regex::Captures| {
        match (caps[1].parse::<f64>(), caps[2].parse::<u32>()) {
            (Ok(value), Ok(digits)) => format!("{}", format::round_dp(value, digits)),
            _ => caps[0].to_string(),
        }
    });
    let line = RE_FN_SQRT.replace_all(&line, |caps: &regex::Captures| {
        match caps[1].parse::<f64>() {
            Ok(value) if value >= 0.0 => format!("{}", value.sqrt()),
            _ => caps[0].to_string(),
        }
    });
    line.into_owned()
}

/// Substitute `prev`/`answer` style references with the nearest non-empty
/// earlier result. With no such result the token stays put and the line
/// fails classification downstream.
pub fn expand_previous(line: &str, prior_results: &[String]) -> String {
    let nearest = match prior_results.iter().rev().find(|r| !r.is_empty()) {
        Some(value) => value,
        None => return line.to_string(),
    };
    RE_PREVIOUS
        .replace_all(line, |_: &regex::Captures| nearest.clone())
        .into_owned()
}

/// Substitute clock keywords with concrete date/time text so the date
/// recognizer can pick the line up.
pub fn expand_date_keywords(line: &str, now: NaiveDateTime) -> String {
    RE_DATE_KEYWORD
        .replace_all(line, |caps: &regex::Captures| {
            let date = now.date();
            match caps[1].to_lowercase().as_str() {
                "now" => datetime::format_datetime(now),
                "time" => datetime::format_time(now.time(), true),
                "today" | "date" => datetime::format_date(date),
                "yesterday" => datetime::format_date(date.pred_opt().unwrap_or(date)),
                "tomorrow" => datetime::format_date(date.succ_opt().unwrap_or(date)),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_normalize_strips_comments_and_whitespace() {
        assert_eq!(normalize("  3   + 4  # note"), "3 + 4");
        assert_eq!(normalize("# only a comment"), "");
        assert_eq!(normalize("plain"), "plain");
    }

    #[test]
    fn test_ncr_expansion() {
        assert_eq!(expand_ncr("5C2"), "10");
        assert_eq!(expand_ncr("5 C 2"), "10");
        assert_eq!(expand_ncr("10c4 + 1"), "210 + 1");
        assert_eq!(expand_ncr("2C5"), "2C5");
    }

    #[test]
    fn test_ncr_leaves_base_literals_alone() {
        assert_eq!(expand_ncr("hex:5C2 to dec"), "hex:5C2 to dec");
        assert_eq!(expand_ncr("0x5C2 to dec"), "0x5C2 to dec");
    }

    #[test]
    fn test_constants() {
        assert_eq!(expand_constants("2 * pi"), "2 * 3.141592653589793");
        assert_eq!(expand_constants("π"), "3.141592653589793");
        assert_eq!(expand_constants("e + 1"), "2.718281828459045 + 1");
        assert_eq!(expand_constants("2e3"), "2e3");
        assert_eq!(expand_constants("pie"), "pie");
    }

    #[test]
    fn test_deterministic_functions() {
        assert_eq!(expand_functions("round(3.14159, 2)"), "3.14");
        assert_eq!(expand_functions("sqrt(16)"), "4");
        assert_eq!(expand_functions("diff(3, 10)"), "7");
        assert_eq!(expand_functions("round(sqrt(2), 3)"), "1.414");
        assert_eq!(expand_functions("sqrt(-4)"), "sqrt(-4)");
    }

    #[test]
    fn test_random_functions_respect_bounds() {
        assert_eq!(expand_functions("rand(5, 5)"), "5");
        assert_eq!(expand_functions("randint(3, 3)"), "3");
        assert_eq!(expand_functions("rand(5, 1)"), "rand(5, 1)");
        let value: f64 = expand_functions("rand(1, 10)").parse().unwrap();
        assert!((1.0..=10.0).contains(&value));
        let value: i64 = expand_functions("randint(1, 6)").parse().unwrap();
        assert!((1..=6).contains(&value));
    }

    #[test]
    fn test_previous_reference() {
        let results = vec!["4".to_string(), String::new()];
        assert_eq!(expand_previous("prev + 1", &results), "4 + 1");
        assert_eq!(expand_previous("ANS * 2", &results), "4 * 2");
        assert_eq!(expand_previous("prev + 1", &[]), "prev + 1");
    }

    #[test]
    fn test_date_keywords() {
        assert_eq!(expand_date_keywords("today", noon()), "2026/8/25");
        assert_eq!(expand_date_keywords("yesterday", noon()), "2026/8/24");
        assert_eq!(expand_date_keywords("tomorrow", noon()), "2026/8/26");
        assert_eq!(expand_date_keywords("now", noon()), "2026/8/25 12:00:00");
        assert_eq!(expand_date_keywords("time", noon()), "12:00:00");
        assert_eq!(expand_date_keywords("5 times 3", noon()), "5 times 3");
    }
}
