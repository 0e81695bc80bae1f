//! Image print job pipeline
//!
//! Raster encoding is CPU bound and runs on the blocking pool; any number of
//! jobs may encode in parallel. Only the device transaction is serialized.

use crate::utils::{AppError, AppResult};
use std::path::{Path, PathBuf};
use thermal_printer::{JobOptions, RasterEncoder, ToneAdjust, build_job};
use tracing::{info, instrument};

/// A decoded request, ready to encode
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub image: Vec<u8>,
    pub target_width: u32,
    pub threshold: u8,
    /// Apply the thermal tone curve before thresholding
    pub enhance: bool,
    pub options: JobOptions,
}

impl PrintJob {
    fn encoder(&self) -> RasterEncoder {
        let encoder = RasterEncoder::new(self.target_width, self.threshold);
        if self.enhance {
            encoder.with_tone(ToneAdjust::thermal())
        } else {
            encoder
        }
    }

    /// Encode the image and frame it into a complete ESC/POS payload
    #[instrument(skip(self), fields(image_len = self.image.len(), target_width = self.target_width, threshold = self.threshold))]
    pub async fn render(self) -> AppResult<Vec<u8>> {
        tokio::task::spawn_blocking(move || -> AppResult<Vec<u8>> {
            let raster = self.encoder().encode(&self.image)?;
            Ok(build_job(&raster, &self.options))
        })
        .await
        .map_err(|e| AppError::internal(format!("Encode task failed: {}", e)))?
    }
}

/// Persist a payload as `job_<unix-millis>.bin` for offline inspection
pub async fn save_debug(dir: &Path, payload: &[u8]) -> AppResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create debug dir: {}", e)))?;

    let path = dir.join(format!(
        "job_{}.bin",
        chrono::Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&path, payload)
        .await
        .map_err(|e| AppError::internal(format!("Failed to write debug file: {}", e)))?;

    info!(path = %path.display(), bytes = payload.len(), "debug payload saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use thermal_printer::PrintError;

    fn black_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn job(image: Vec<u8>) -> PrintJob {
        PrintJob {
            image,
            target_width: 16,
            threshold: 180,
            enhance: false,
            options: JobOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_render_payload() {
        let payload = job(black_png(16, 8)).render().await.unwrap();

        // init + align + header + body + feed + cut + reset
        assert_eq!(payload.len(), 2 + 3 + 8 + 16 + 3 + 3 + 3);
        assert_eq!(&payload[..5], &[0x1B, 0x40, 0x1B, 0x61, 0x01]);
        assert_eq!(&payload[payload.len() - 3..], &[0x1B, 0x61, 0x00]);
    }

    #[tokio::test]
    async fn test_render_bad_image() {
        let err = job(b"GIF89a?".to_vec()).render().await.unwrap_err();
        assert!(matches!(err, AppError::Print(PrintError::Decode(_))));
    }

    #[tokio::test]
    async fn test_save_debug() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let path = save_debug(&out, &[0x1B, 0x40]).await.unwrap();

        assert!(path.starts_with(&out));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("job_"));
        assert_eq!(std::fs::read(path).unwrap(), vec![0x1B, 0x40]);
    }
}
