//! Date and time expressions: an optional `yyyy/M/d` date and/or
//! `H:mm[:ss]` time followed by add/subtract clauses applied left to
//! right. Years and months are calendar-aware and clamp to the end of the
//! target month; weeks and below are fixed durations.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_DATE_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(\d{4})/(\d{1,2})/(\d{1,2}))?\s*(?:(\d{1,2}):(\d{2})(?::(\d{2}))?)?((?:\s*(?:in|add|plus|\+|minus|remove|-)\s+\d+\s+[A-Za-z]+)*)$",
    )
    .unwrap()
});

static RE_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(in|add|plus|\+|minus|remove|-)\s+(\d+)\s+([A-Za-z]+)").unwrap());

/// Recognize a date/time expression line. At least one of the date and
/// time parts must be present; a time-only expression borrows its date
/// from `now` so clauses can roll over midnight.
pub fn recognize(line: &str, now: NaiveDateTime) -> Option<String> {
    let caps = RE_DATE_EXPRESSION.captures(line)?;
    let has_date = caps.get(1).is_some();
    let has_time = caps.get(4).is_some();
    if !has_date && !has_time {
        return None;
    }
    let date = if has_date {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?
    } else {
        now.date()
    };
    let (time, has_seconds) = if has_time {
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let second: u32 = match caps.get(6) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        (NaiveTime::from_hms_opt(hour, minute, second)?, caps.get(6).is_some())
    } else {
        (NaiveTime::from_hms_opt(0, 0, 0)?, false)
    };

    let mut value = NaiveDateTime::new(date, time);
    let clauses = caps.get(7).map_or("", |m| m.as_str());
    for clause in RE_CLAUSE.captures_iter(clauses) {
        let amount: u32 = clause[2].parse().ok()?;
        let unit = clause[3].to_lowercase();
        let negative = matches!(&clause[1], "minus" | "remove" | "-");
        value = apply_clause(value, amount, &unit, negative)?;
    }
    Some(render(value, has_date, has_time, has_seconds))
}

fn apply_clause(
    value: NaiveDateTime,
    amount: u32,
    unit: &str,
    negative: bool,
) -> Option<NaiveDateTime> {
    let months = |n: u32| {
        if negative {
            value.checked_sub_months(Months::new(n))
        } else {
            value.checked_add_months(Months::new(n))
        }
    };
    let duration = |d: Duration| {
        if negative {
            value.checked_sub_signed(d)
        } else {
            value.checked_add_signed(d)
        }
    };
    match unit {
        "year" | "years" | "yr" | "yrs" => months(amount.checked_mul(12)?),
        "month" | "months" => months(amount),
        "week" | "weeks" => duration(Duration::weeks(amount as i64)),
        "day" | "days" => duration(Duration::days(amount as i64)),
        "hour" | "hours" | "h" | "hr" | "hrs" => duration(Duration::hours(amount as i64)),
        "minute" | "minutes" | "min" | "mins" => duration(Duration::minutes(amount as i64)),
        "second" | "seconds" | "sec" | "secs" | "s" => duration(Duration::seconds(amount as i64)),
        _ => None,
    }
}

/// Output mirrors which parts the input had. Seconds appear when the input
/// carried them or a clause produced a non-zero seconds field.
fn render(value: NaiveDateTime, has_date: bool, has_time: bool, has_seconds: bool) -> String {
    let show_seconds = has_seconds || value.second() != 0;
    match (has_date, has_time) {
        (true, true) => format!(
            "{} {}",
            format_date(value.date()),
            format_time(value.time(), show_seconds)
        ),
        (true, false) => format_date(value.date()),
        (false, true) => format_time(value.time(), show_seconds),
        (false, false) => String::new(),
    }
}

/// `yyyy/M/d` without zero-padding, matching the input grammar.
pub(crate) fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// `H:mm` or `H:mm:ss`; only the hour goes unpadded.
pub(crate) fn format_time(time: NaiveTime, with_seconds: bool) -> String {
    if with_seconds {
        format!("{}:{:02}:{:02}", time.hour(), time.minute(), time.second())
    } else {
        format!("{}:{:02}", time.hour(), time.minute())
    }
}

pub(crate) fn format_datetime(value: NaiveDateTime) -> String {
    format!(
        "{} {}",
        format_date(value.date()),
        format_time(value.time(), true)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_month_addition_clamps_to_end_of_month() {
        assert_eq!(recognize("2024/1/31 + 1 month", noon()).unwrap(), "2024/2/29");
        assert_eq!(recognize("2023/1/31 + 1 month", noon()).unwrap(), "2023/2/28");
        assert_eq!(recognize("2024/3/31 minus 1 month", noon()).unwrap(), "2024/2/29");
        assert_eq!(recognize("2024/2/29 plus 1 year", noon()).unwrap(), "2025/2/28");
    }

    #[test]
    fn test_clauses_apply_left_to_right() {
        // Clamp first, then step into March
        assert_eq!(
            recognize("2024/1/31 + 1 month + 1 day", noon()).unwrap(),
            "2024/3/1"
        );
    }

    #[test]
    fn test_clause_keyword_forms() {
        assert_eq!(recognize("2024/5/1 in 2 weeks", noon()).unwrap(), "2024/5/15");
        assert_eq!(recognize("2024/5/1 add 10 days", noon()).unwrap(), "2024/5/11");
        assert_eq!(recognize("2024/5/1 remove 1 day", noon()).unwrap(), "2024/4/30");
    }

    #[test]
    fn test_time_only_expressions() {
        assert_eq!(recognize("12:30 in 45 min", noon()).unwrap(), "13:15");
        assert_eq!(recognize("23:30 in 2 h", noon()).unwrap(), "1:30");
        assert_eq!(recognize("12:30:15 plus 30 s", noon()).unwrap(), "12:30:45");
        // Seconds surface once a clause makes them non-zero
        assert_eq!(recognize("12:30 plus 90 s", noon()).unwrap(), "12:31:30");
    }

    #[test]
    fn test_date_and_time_together() {
        assert_eq!(
            recognize("2024/5/1 12:00 in 90 min", noon()).unwrap(),
            "2024/5/1 13:30"
        );
    }

    #[test]
    fn test_bare_parts_normalize() {
        assert_eq!(recognize("2024/05/01", noon()).unwrap(), "2024/5/1");
        assert_eq!(recognize("9:05", noon()).unwrap(), "9:05");
    }

    #[test]
    fn test_invalid_parts_fall_through() {
        assert_eq!(recognize("2024/13/45 + 1 day", noon()), None);
        assert_eq!(recognize("24:00", noon()), None);
        assert_eq!(recognize("2024/5", noon()), None);
        assert_eq!(recognize("hello + 1 day", noon()), None);
        assert_eq!(recognize("12:30 in 45 bananas", noon()), None);
    }
}
