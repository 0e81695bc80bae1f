//! Error types for the printer library

use std::fmt;
use thiserror::Error;

/// Error code reported by the platform spooler (`GetLastError` on Windows)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemCode(pub u32);

impl fmt::Display for SystemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system error {}", self.0)
    }
}

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    // === Raster input ===
    /// Image buffer was empty
    #[error("Image buffer is empty")]
    EmptyInput,

    /// Image bytes are not a recognized/decodable format
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// Target raster width must be positive
    #[error("Invalid target width: {0}")]
    InvalidWidth(u32),

    /// Image has a zero dimension after decode or resize
    #[error("Degenerate image: {width}x{height}")]
    DegenerateImage { width: u32, height: u32 },

    /// Dimensions exceed the header fields or the raster dot budget
    #[error("Raster too large: {width}x{height}")]
    RasterTooLarge { width: u32, height: u32 },

    // === Transaction input ===
    /// Device name was empty
    #[error("Printer name is required")]
    InvalidDevice,

    /// Payload was empty
    #[error("Payload is empty")]
    EmptyPayload,

    /// Payload exceeds what a single raw write can carry
    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// Raw device access is not available on this platform
    #[error("Raw printing is not supported on this platform")]
    UnsupportedPlatform,

    // === Device ===
    #[error("Open printer '{device}' failed: {code}")]
    Open { device: String, code: SystemCode },

    #[error("Begin document failed: {code}")]
    BeginDocument { code: SystemCode },

    #[error("Begin page failed: {code}")]
    BeginPage { code: SystemCode },

    #[error("Write failed: {code}")]
    Write { code: SystemCode },

    /// The device accepted fewer bytes than were sent
    #[error("Incomplete write: written={written} expected={expected}")]
    IncompleteWrite { written: usize, expected: usize },

    /// Blocking print worker failed to complete
    #[error("Print task failed: {0}")]
    Task(String),
}

impl PrintError {
    /// Whether the error was caused by caller input rather than the device
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PrintError::EmptyInput
                | PrintError::Decode(_)
                | PrintError::InvalidWidth(_)
                | PrintError::DegenerateImage { .. }
                | PrintError::RasterTooLarge { .. }
                | PrintError::InvalidDevice
                | PrintError::EmptyPayload
                | PrintError::PayloadTooLarge(_)
        )
    }

    /// Underlying system code, if the failure came from the spooler
    pub fn system_code(&self) -> Option<SystemCode> {
        match self {
            PrintError::Open { code, .. }
            | PrintError::BeginDocument { code }
            | PrintError::BeginPage { code }
            | PrintError::Write { code } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
