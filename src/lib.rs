//! Line-oriented, unit-aware calculator engine. Each line of a document is
//! classified and evaluated independently into a number, a converted
//! quantity, a date or an empty string, and later lines can reference the
//! results above them through `prev`, `sum` and `avg`.
//!
//! ```
//! use linecalc::{CalcEngine, EngineSettings};
//!
//! let engine = CalcEngine::new(EngineSettings::default());
//! let results = engine.evaluate_lines(&["2 + 3 * 4", "prev + 1", "100 C to F"]);
//! assert_eq!(results, vec!["14", "15", "212 °F"]);
//! ```

pub mod core;
pub mod engine;
pub mod shared;

pub use engine::CalcEngine;
pub use shared::{EngineError, EngineResult, EngineSettings, ExchangeRateSnapshot, Line};
