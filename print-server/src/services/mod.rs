//! Services

pub mod print_job;
pub mod replay;

pub use print_job::{PrintJob, save_debug};
pub use replay::{ReplayError, replay_file};
