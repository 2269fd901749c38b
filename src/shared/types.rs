use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::error::{EngineError, EngineResult};

/// Snapshots older than this many days disable currency recognition.
/// The external downloader refreshes at most once per calendar day, so a
/// week-old table means the host has been offline for a long stretch.
pub const RATE_STALENESS_DAYS: i64 = 7;

// ============================================================================
// Document lines
// ============================================================================

/// One document line: the text as typed and the computed result.
///
/// `result_text` is empty when the line is blank, a comment, or matched no
/// recognizer. A line's result depends only on its own text and the results
/// of earlier lines, which is what makes a single top-to-bottom pass
/// sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub raw_text: String,
    pub result_text: String,
}

impl Line {
    pub fn new(raw_text: impl Into<String>, result_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            result_text: result_text.into(),
        }
    }
}

// ============================================================================
// Exchange rates
// ============================================================================

/// Rate table loaded by the external downloader: one rate per ISO-4217 code,
/// expressed as units of that currency per EUR. EUR itself is the pivot and
/// is implicit at 1.0. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    pub date: NaiveDate,
    pub rates: HashMap<String, f64>,
}

/// Wire shape of the downloader's JSON; the date field is `yyyy-M-d` with
/// single-digit month and day allowed, which chrono's serde impl rejects.
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    date: String,
    rates: HashMap<String, f64>,
}

impl ExchangeRateSnapshot {
    pub fn new(date: NaiveDate, rates: HashMap<String, f64>) -> Self {
        Self { date, rates }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        let date = parse_loose_date(&raw.date).ok_or_else(|| {
            EngineError::RateTable(format!("Bad snapshot date: '{}'", raw.date))
        })?;
        Ok(Self {
            date,
            rates: raw.rates,
        })
    }

    /// Rate of one EUR in `code`. `None` when the code is not in the table.
    pub fn rate(&self, code: &str) -> Option<f64> {
        if code == "EUR" {
            return Some(1.0);
        }
        self.rates.get(code).copied()
    }

    pub fn is_stale(&self, today: NaiveDate) -> bool {
        today.signed_duration_since(self.date).num_days() > RATE_STALENESS_DAYS
    }
}

fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
