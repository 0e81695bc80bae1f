//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data, plus
//! [`build_job`] which wraps a raster block into a complete print job.

use crate::raster::RasterImage;
use serde::{Deserialize, Serialize};

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Horizontal justification (`ESC a n`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Parameter byte for `ESC a`
    pub fn code(self) -> u8 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }
}

/// ESC/POS command builder
///
/// Starts with the initialize command (`ESC @`).
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(4096);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[ESC, 0x40]);
        Self { buf }
    }

    // === Alignment ===

    pub fn align(&mut self, align: Alignment) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x61, align.code()]);
        self
    }

    /// Align to center
    pub fn center(&mut self) -> &mut Self {
        self.align(Alignment::Center)
    }

    /// Align to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.align(Alignment::Left)
    }

    /// Align to right
    pub fn right(&mut self) -> &mut Self {
        self.align(Alignment::Right)
    }

    // === Graphics ===

    /// Raster bit image (`GS v 0`)
    pub fn raster(&mut self, image: &RasterImage) -> &mut Self {
        image.write_command(&mut self.buf);
        self
    }

    // === Paper Control ===

    /// Print and feed n lines (`ESC d n`)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x64, lines]);
        self
    }

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0 - Full cut
        self.buf.extend_from_slice(&[GS, 0x56, 0x00]);
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    // === Build ===

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout options for a single-image job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    pub align: Alignment,
    pub feed_lines: u8,
    pub cut: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            align: Alignment::Center,
            feed_lines: 3,
            cut: true,
        }
    }
}

/// Build the finished job payload
///
/// Order: init, align, raster, feed, optional cut, reset alignment.
pub fn build_job(image: &RasterImage, options: &JobOptions) -> Vec<u8> {
    let mut b = EscPosBuilder::new();
    b.align(options.align).raster(image).feed(options.feed_lines);
    if options.cut {
        b.cut();
    }
    b.left();
    b.build()
}
