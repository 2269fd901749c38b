pub mod error;
pub mod settings;
pub mod types;


pub use error::{EngineError, EngineResult};
pub use settings::EngineSettings;
pub use types::{ExchangeRateSnapshot, Line};
