pub mod aggregate;
pub mod catalog;
pub mod convert;
pub mod datetime;
pub mod dispatch;
pub mod eval;
pub mod format;
pub mod numeral;
pub mod substitute;
