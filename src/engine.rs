//! Document-level entry point. A recompute is one synchronous top-to-bottom
//! pass: every line is evaluated against the results accumulated so far,
//! which is all the dependency model allows since lines may only reference
//! lines above them.

use chrono::{Local, NaiveDateTime};

use crate::core::dispatch::{self, LineContext};
use crate::shared::settings::EngineSettings;
use crate::shared::types::{ExchangeRateSnapshot, Line};

/// The calculator engine: settings plus an optional exchange-rate
/// snapshot. Both are read-only during a pass; rates are swapped
/// wholesale, never edited in place.
#[derive(Debug, Clone)]
pub struct CalcEngine {
    settings: EngineSettings,
    rates: Option<ExchangeRateSnapshot>,
}

impl CalcEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            rates: None,
        }
    }

    pub fn with_rates(settings: EngineSettings, rates: ExchangeRateSnapshot) -> Self {
        Self {
            settings,
            rates: Some(rates),
        }
    }

    /// Replace the rate snapshot for subsequent passes.
    pub fn set_rates(&mut self, rates: ExchangeRateSnapshot) {
        self.rates = Some(rates);
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The timestamp one whole pass sees. Pinned by the settings when
    /// reproducibility matters, otherwise read from the wall clock once so
    /// every line of a pass agrees on `now`.
    fn pass_clock(&self) -> NaiveDateTime {
        self.settings
            .reference_datetime
            .unwrap_or_else(|| Local::now().naive_local())
    }

    /// Evaluate a whole document, returning the raw/result pair per line.
    pub fn evaluate_document(&self, text: &str) -> Vec<Line> {
        let raw_lines: Vec<&str> = text.split('\n').collect();
        let results = self.evaluate_lines(&raw_lines);
        raw_lines
            .iter()
            .zip(results)
            .map(|(raw, result)| Line::new(*raw, result))
            .collect()
    }

    /// Evaluate lines in order; entry `i` of the output is the result of
    /// line `i`, empty when the line resolves to nothing.
    pub fn evaluate_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let now = self.pass_clock();
        let mut results: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            let result = {
                let ctx = LineContext {
                    settings: &self.settings,
                    rates: self.rates.as_ref(),
                    prior_results: &results,
                    now,
                };
                dispatch::evaluate_line(&ctx, line.as_ref())
            };
            results.push(result);
        }
        results
    }
}

impl Default for CalcEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
