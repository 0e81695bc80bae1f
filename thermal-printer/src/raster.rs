//! Raster image encoding
//!
//! Turns an encoded image (PNG, JPEG, ...) into a packed 1-bit bitmap
//! wrapped in the ESC/POS `GS v 0` raster command.
//!
//! Pipeline, in order:
//! 1. Decode to RGBA
//! 2. Resize to exactly `target_width` dots (Lanczos3, aspect ratio kept)
//! 3. Composite over white, then optional tone adjustment
//! 4. Luminance `0.299 R + 0.587 G + 0.114 B`, rounded
//! 5. Threshold (`luma < threshold` is ink) and pack MSB-first
//!
//! Images are always scaled to the target width, narrower sources included,
//! so the printed width is predictable for the caller.

use crate::error::{PrintError, PrintResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};
use tracing::{debug, instrument};

/// 80mm paper at 203 dpi
pub const DEFAULT_TARGET_WIDTH: u32 = 576;

/// Luminance cutoff below which a dot is printed
pub const DEFAULT_THRESHOLD: u8 = 180;

/// `GS v 0 m xL xH yL yH`
pub const RASTER_HEADER_LEN: usize = 8;

/// Widest raster accepted, in dots (wide-format heads top out well below)
pub const MAX_TARGET_WIDTH: u32 = 4096;

/// Dot budget for one raster: a full-height 80mm strip
pub const MAX_RASTER_DOTS: u64 = 576 * 65_535;

/// Contrast/gamma/brightness correction for print head density
///
/// Applied per RGB channel after resizing and before luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneAdjust {
    pub contrast: f32,
    pub gamma: f32,
    pub brightness: f32,
}

impl ToneAdjust {
    /// Slightly punchier output, tuned for 203 dpi thermal heads
    pub fn thermal() -> Self {
        Self {
            contrast: 1.20,
            gamma: 0.95,
            brightness: 1.00,
        }
    }

    fn lookup_table(&self) -> [u8; 256] {
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            let v = i as f32 / 255.0;
            let v = ((v - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0);
            let v = v.powf(self.gamma);
            let v = (v * self.brightness).clamp(0.0, 1.0);
            *slot = (v * 255.0).round() as u8;
        }
        lut
    }
}

impl Default for ToneAdjust {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            gamma: 1.0,
            brightness: 1.0,
        }
    }
}

/// Packed monochrome bitmap, one bit per dot, MSB = leftmost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterImage {
    /// Pack row-major luminance values; bits past `width` in the last byte stay 0
    fn pack(width: u32, height: u32, luma: &[u8], threshold: u8) -> Self {
        let row_len = width as usize;
        let width_bytes = width.div_ceil(8) as usize;
        let mut data = vec![0u8; width_bytes * height as usize];

        for (row, out) in luma
            .chunks_exact(row_len)
            .zip(data.chunks_exact_mut(width_bytes))
        {
            for (x, &l) in row.iter().enumerate() {
                if l < threshold {
                    out[x / 8] |= 0x80 >> (x % 8);
                }
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Width in dots
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in dots
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per raster row
    pub fn width_bytes(&self) -> u32 {
        self.width.div_ceil(8)
    }

    /// Packed bitmap without header
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of dots that will be printed
    pub fn ink_dots(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// `GS v 0` header; dimensions were range-checked at construction
    pub fn header(&self) -> [u8; RASTER_HEADER_LEN] {
        let x = self.width_bytes() as u16;
        let y = self.height as u16;
        let [x_l, x_h] = x.to_le_bytes();
        let [y_l, y_h] = y.to_le_bytes();
        [0x1D, 0x76, 0x30, 0x00, x_l, x_h, y_l, y_h]
    }

    /// Append header + bitmap to a buffer
    pub fn write_command(&self, buf: &mut Vec<u8>) {
        buf.reserve(RASTER_HEADER_LEN + self.data.len());
        buf.extend_from_slice(&self.header());
        buf.extend_from_slice(&self.data);
    }

    /// Header + bitmap as a standalone command block
    pub fn to_command(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_command(&mut buf);
        buf
    }
}

/// Image → raster converter
///
/// Stateless apart from its parameters; safe to share and call concurrently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterEncoder {
    target_width: u32,
    threshold: u8,
    tone: Option<ToneAdjust>,
}

impl RasterEncoder {
    pub fn new(target_width: u32, threshold: u8) -> Self {
        Self {
            target_width,
            threshold,
            tone: None,
        }
    }

    /// Apply a tone curve before thresholding
    pub fn with_tone(mut self, tone: ToneAdjust) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Decode image bytes and rasterize them
    #[instrument(skip(self, bytes), fields(len = bytes.len(), target_width = self.target_width, threshold = self.threshold))]
    pub fn encode(&self, bytes: &[u8]) -> PrintResult<RasterImage> {
        if bytes.is_empty() {
            return Err(PrintError::EmptyInput);
        }
        if self.target_width == 0 {
            return Err(PrintError::InvalidWidth(self.target_width));
        }

        let img = image::load_from_memory(bytes)?;
        debug!(dimensions = ?img.dimensions(), "image decoded");

        self.rasterize(&img)
    }

    /// Rasterize an already decoded image
    pub fn rasterize(&self, img: &DynamicImage) -> PrintResult<RasterImage> {
        if self.target_width == 0 {
            return Err(PrintError::InvalidWidth(self.target_width));
        }

        let (src_w, src_h) = img.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(PrintError::DegenerateImage {
                width: src_w,
                height: src_h,
            });
        }

        let (width, height) = scaled_size(src_w, src_h, self.target_width);
        check_dimensions(width, height)?;

        let rgba = img.to_rgba8();
        let rgba = if (width, height) == (src_w, src_h) {
            rgba
        } else {
            imageops::resize(&rgba, width, height, FilterType::Lanczos3)
        };

        let lut = self.tone.map(|t| t.lookup_table());
        let luma: Vec<u8> = rgba
            .pixels()
            .map(|p| {
                let [r, g, b] = over_white(p.0);
                match &lut {
                    Some(lut) => luminance(lut[r as usize], lut[g as usize], lut[b as usize]),
                    None => luminance(r, g, b),
                }
            })
            .collect();

        let raster = RasterImage::pack(width, height, &luma, self.threshold);
        debug!(
            width,
            height,
            ink_dots = raster.ink_dots(),
            "raster encoded"
        );
        Ok(raster)
    }
}

impl Default for RasterEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_WIDTH, DEFAULT_THRESHOLD)
    }
}

/// Encode image bytes into a complete `GS v 0` command block
///
/// Output length is always `8 + ceil(width / 8) * height`.
pub fn encode(image: &[u8], target_width: u32, threshold: u8) -> PrintResult<Vec<u8>> {
    RasterEncoder::new(target_width, threshold)
        .encode(image)
        .map(|raster| raster.to_command())
}

/// Scale to the target width, keeping the aspect ratio (rounded height)
fn scaled_size(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    let w = u64::from(width);
    let scaled = (u64::from(height) * u64::from(target_width) + w / 2) / w;
    (target_width, u32::try_from(scaled).unwrap_or(u32::MAX))
}

fn check_dimensions(width: u32, height: u32) -> PrintResult<()> {
    if width == 0 || height == 0 {
        return Err(PrintError::DegenerateImage { width, height });
    }
    if width > MAX_TARGET_WIDTH
        || height > u32::from(u16::MAX)
        || u64::from(width) * u64::from(height) > MAX_RASTER_DOTS
    {
        return Err(PrintError::RasterTooLarge { width, height });
    }
    Ok(())
}

/// Composite an RGBA pixel over a white background
fn over_white([r, g, b, a]: [u8; 4]) -> [u8; 3] {
    if a == u8::MAX {
        return [r, g, b];
    }
    let a = u32::from(a);
    let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
    [blend(r), blend(g), blend(b)]
}

fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(img: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb(rgb),
        )))
    }

    /// Horizontal gray ramp from 0 to 255
    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let v = (x * 255 / (width - 1)) as u8;
            Rgb([v, v, v])
        });
        png(DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_solid_black_16x8() {
        let out = encode(&solid(16, 8, [0, 0, 0]), 16, 180).unwrap();

        assert_eq!(&out[..8], &[0x1D, 0x76, 0x30, 0x00, 0x02, 0x00, 0x08, 0x00]);
        assert_eq!(&out[8..], &[0xFF; 16]);
    }

    #[test]
    fn test_row_padding_is_blank() {
        let raster = RasterEncoder::new(13, 180)
            .encode(&solid(13, 5, [0, 0, 0]))
            .unwrap();

        assert_eq!(raster.width_bytes(), 2);
        for row in raster.data().chunks(2) {
            assert_eq!(row, &[0xFF, 0xF8]);
        }
        assert_eq!(raster.ink_dots(), 13 * 5);
    }

    #[test]
    fn test_output_length() {
        for (w, h, target) in [(16, 8, 16), (100, 37, 576), (640, 480, 384), (9, 9, 9)] {
            let raster = RasterEncoder::new(target, 180)
                .encode(&gradient(w, h))
                .unwrap();
            let out = raster.to_command();
            let expected = 8 + target.div_ceil(8) as usize * raster.height() as usize;
            assert_eq!(out.len(), expected, "{w}x{h} -> {target}");
            assert_eq!(raster.width(), target);
        }
    }

    #[test]
    fn test_header_little_endian() {
        let raster = RasterEncoder::new(2048, 180)
            .encode(&solid(1024, 150, [255, 255, 255]))
            .unwrap();

        assert_eq!(raster.height(), 300);
        assert_eq!(
            raster.header(),
            [0x1D, 0x76, 0x30, 0x00, 0x00, 0x01, 0x2C, 0x01]
        );
    }

    #[test]
    fn test_threshold_zero_prints_nothing() {
        let raster = RasterEncoder::new(64, 0)
            .encode(&solid(64, 4, [0, 0, 0]))
            .unwrap();
        assert_eq!(raster.ink_dots(), 0);
    }

    #[test]
    fn test_threshold_max_prints_all_but_white() {
        let black = RasterEncoder::new(64, 255)
            .encode(&solid(64, 4, [0, 0, 0]))
            .unwrap();
        assert_eq!(black.ink_dots(), 64 * 4);

        let white = RasterEncoder::new(64, 255)
            .encode(&solid(64, 4, [255, 255, 255]))
            .unwrap();
        assert_eq!(white.ink_dots(), 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let gray = solid(8, 1, [128, 128, 128]);
        let at = RasterEncoder::new(8, 128).encode(&gray).unwrap();
        let above = RasterEncoder::new(8, 129).encode(&gray).unwrap();

        assert_eq!(at.data(), &[0x00]);
        assert_eq!(above.data(), &[0xFF]);
    }

    #[test]
    fn test_threshold_monotonic() {
        let img = gradient(200, 10);
        let mut last = 0;
        for threshold in (0..=255).step_by(15) {
            let dots = RasterEncoder::new(200, threshold)
                .encode(&img)
                .unwrap()
                .ink_dots();
            assert!(dots >= last, "threshold {threshold}: {dots} < {last}");
            last = dots;
        }
        assert!(last > 0);
    }

    #[test]
    fn test_luminance_weights() {
        // Pure green: 0.587 * 255 = 149.685 -> 150
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);

        let green = solid(8, 1, [0, 255, 0]);
        assert_eq!(RasterEncoder::new(8, 150).encode(&green).unwrap().ink_dots(), 0);
        assert_eq!(RasterEncoder::new(8, 151).encode(&green).unwrap().ink_dots(), 8);
    }

    #[test]
    fn test_deterministic() {
        let img = gradient(333, 77);
        let a = encode(&img, 576, 180).unwrap();
        let b = encode(&img, 576, 180).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let down = RasterEncoder::new(16, 180)
            .encode(&solid(32, 16, [0, 0, 0]))
            .unwrap();
        assert_eq!((down.width(), down.height()), (16, 8));
        assert_eq!(down.ink_dots(), 16 * 8);

        let up = RasterEncoder::new(16, 180)
            .encode(&solid(8, 4, [0, 0, 0]))
            .unwrap();
        assert_eq!((up.width(), up.height()), (16, 8));
    }

    #[test]
    fn test_transparent_is_blank() {
        let img = RgbaImage::from_pixel(8, 2, Rgba([0, 0, 0, 0]));
        let raster = RasterEncoder::new(8, 180)
            .rasterize(&DynamicImage::ImageRgba8(img))
            .unwrap();
        assert_eq!(raster.ink_dots(), 0);

        assert_eq!(over_white([0, 0, 0, 255]), [0, 0, 0]);
        assert_eq!(over_white([0, 0, 0, 0]), [255, 255, 255]);
    }

    #[test]
    fn test_tone_darkens_midtones() {
        let gray = solid(8, 1, [100, 100, 100]);
        let plain = RasterEncoder::new(8, 100).encode(&gray).unwrap();
        let toned = RasterEncoder::new(8, 100)
            .with_tone(ToneAdjust::thermal())
            .encode(&gray)
            .unwrap();

        assert_eq!(plain.ink_dots(), 0);
        assert_eq!(toned.ink_dots(), 8);
    }

    #[test]
    fn test_identity_tone() {
        let lut = ToneAdjust::default().lookup_table();
        for (i, v) in lut.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(encode(&[], 576, 180), Err(PrintError::EmptyInput)));
    }

    #[test]
    fn test_not_an_image() {
        let result = encode(b"definitely not a png", 576, 180);
        assert!(matches!(result, Err(PrintError::Decode(_))));
    }

    #[test]
    fn test_zero_width() {
        let result = encode(&solid(4, 4, [0, 0, 0]), 0, 180);
        assert!(matches!(result, Err(PrintError::InvalidWidth(0))));
    }

    #[test]
    fn test_degenerate_after_resize() {
        let result = encode(&solid(2000, 1, [0, 0, 0]), 16, 180);
        assert!(matches!(
            result,
            Err(PrintError::DegenerateImage {
                width: 16,
                height: 0
            })
        ));
    }

    #[test]
    fn test_too_wide() {
        let result = encode(&solid(4, 4, [0, 0, 0]), 600_000, 180);
        assert!(matches!(result, Err(PrintError::RasterTooLarge { .. })));
    }

    #[test]
    fn test_huge_upscale_rejected_before_resize() {
        // 8x1 scaled to 524280 wide would be 524280x65535 dots
        let result = encode(&solid(8, 1, [0, 0, 0]), 524_280, 180);
        assert!(matches!(
            result,
            Err(PrintError::RasterTooLarge {
                width: 524_280,
                height: 65_535
            })
        ));
    }

    #[test]
    fn test_dot_budget() {
        // Within the width limit but over the dot budget
        let result = encode(&solid(1, 10, [0, 0, 0]), MAX_TARGET_WIDTH, 180);
        assert!(matches!(result, Err(PrintError::RasterTooLarge { .. })));

        let raster = RasterEncoder::new(MAX_TARGET_WIDTH, 180)
            .encode(&solid(64, 2, [0, 0, 0]))
            .unwrap();
        assert_eq!((raster.width(), raster.height()), (MAX_TARGET_WIDTH, 128));
    }
}
