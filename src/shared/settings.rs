use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Externally configured knobs the engine reads but never writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Decimal digits for non-currency numeric output. Currency always
    /// rounds to 2 digits at conversion time.
    pub precision: u32,
    /// Fixed timestamp used for `now`/`today` keywords and date arithmetic.
    /// `None` reads the wall clock once per recompute pass.
    pub reference_datetime: Option<NaiveDateTime>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            precision: 4,
            reference_datetime: None,
        }
    }
}

impl EngineSettings {
    pub fn with_precision(precision: u32) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    /// Pin the clock, making keyword substitution and date arithmetic
    /// reproducible.
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference_datetime = Some(reference);
        self
    }
}
