//! # print-server
//!
//! Local HTTP service that turns images into ESC/POS raster jobs and sends
//! them to a raw printer device.
//!
//! ## Modules
//!
//! - [`core`] - configuration, shared state, server lifecycle
//! - [`api`] - HTTP routes
//! - [`services`] - print job pipeline
//! - [`utils`] - errors, logging, payload decoding

pub mod api;
pub mod core;
pub mod services;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult, init_logger};
