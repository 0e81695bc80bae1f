//! # thermal-printer
//!
//! ESC/POS raster printing for thermal receipt printers.
//!
//! ## Scope
//!
//! This crate handles HOW to print an image:
//! - Image → 1-bit `GS v 0` raster encoding
//! - ESC/POS job framing (init, alignment, feed, cut)
//! - Raw device transactions with guaranteed teardown
//! - Process-wide serialization of device access
//!
//! Request handling (base64 decoding, defaults, simulate mode) stays in the
//! application, see `print-server`.
//!
//! ## Example
//!
//! ```ignore
//! use thermal_printer::{
//!     JobOptions, PlatformSpooler, PrinterTransaction, RasterEncoder, build_job,
//! };
//!
//! let raster = RasterEncoder::new(576, 180).encode(&png_bytes)?;
//! let payload = build_job(&raster, &JobOptions::default());
//!
//! let printer = PrinterTransaction::new(PlatformSpooler::default());
//! printer.send("W80", payload, "Receipt").await?;
//! ```

mod error;
mod escpos;
mod printer;
mod raster;
mod transaction;

// Re-exports
pub use error::{PrintError, PrintResult, SystemCode};
pub use escpos::{Alignment, EscPosBuilder, JobOptions, build_job};
pub use printer::{PlatformSpooler, Printer, UnsupportedSpooler};
pub use raster::{
    DEFAULT_TARGET_WIDTH, DEFAULT_THRESHOLD, MAX_RASTER_DOTS, MAX_TARGET_WIDTH, RASTER_HEADER_LEN,
    RasterEncoder, RasterImage, ToneAdjust, encode,
};
pub use transaction::{
    DEFAULT_DOCUMENT_NAME, DocumentInfo, PrinterTransaction, RAW_DATATYPE, Spooler, execute,
    validate,
};

#[cfg(windows)]
pub use printer::WindowsSpooler;
