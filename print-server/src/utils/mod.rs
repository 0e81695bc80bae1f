//! Utilities: errors, logging, payload decoding

pub mod error;
pub mod logger;
pub mod payload;

pub use error::{AppError, AppResult, json_error_fallback};
pub use logger::init_logger;
