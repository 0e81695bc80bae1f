//! Image printing
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /print/image | POST | Encode an image as ESC/POS raster and print it |
//!
//! # Request
//!
//! ```json
//! {
//!   "imageBase64": "data:image/png;base64,iVBORw0...",
//!   "paperWidth": 576,
//!   "threshold": 180,
//!   "cut": true,
//!   "printerName": "W80",
//!   "simulate": false
//! }
//! ```
//!
//! # Response
//!
//! ```json
//! { "ok": true, "printerName": "W80", "bytesLength": 41519 }
//! ```
//!
//! In simulate mode nothing is printed and `escposBase64` carries the
//! finished payload instead.

use axum::{Json, Router, extract::State, extract::rejection::JsonRejection, routing::post};
use serde::{Deserialize, Serialize};
use thermal_printer::{
    Alignment, DEFAULT_TARGET_WIDTH, DEFAULT_THRESHOLD, JobOptions, MAX_TARGET_WIDTH,
};
use tracing::{info, instrument};

use crate::core::ServerState;
use crate::services::{PrintJob, save_debug};
use crate::utils::payload::{decode_image_base64, encode_payload};
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/print/image", post(print_image))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintImageRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default = "default_paper_width")]
    pub paper_width: i64,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    #[serde(default = "default_cut")]
    pub cut: bool,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub printer_name: Option<String>,
    #[serde(default)]
    pub doc_name: Option<String>,
    #[serde(default)]
    pub save_debug: bool,
    #[serde(default)]
    pub simulate: bool,
    #[serde(default)]
    pub enhance: bool,
}

fn default_paper_width() -> i64 {
    i64::from(DEFAULT_TARGET_WIDTH)
}

fn default_threshold() -> i64 {
    i64::from(DEFAULT_THRESHOLD)
}

fn default_cut() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintImageResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_name: Option<String>,
    pub bytes_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escpos_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_file: Option<String>,
}

/// Trimmed value, or None when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// POST /print/image
#[instrument(skip_all)]
pub async fn print_image(
    State(state): State<ServerState>,
    body: Result<Json<PrintImageRequest>, JsonRejection>,
) -> AppResult<Json<PrintImageResponse>> {
    let Json(req) = body?;
    let config = state.config();

    let image_base64 = non_blank(req.image_base64)
        .ok_or_else(|| AppError::validation("imageBase64 is required"))?;
    let target_width = u32::try_from(req.paper_width)
        .ok()
        .filter(|w| (1..=MAX_TARGET_WIDTH).contains(w))
        .ok_or_else(|| {
            AppError::validation(format!(
                "paperWidth must be between 1 and {}",
                MAX_TARGET_WIDTH
            ))
        })?;
    let threshold = u8::try_from(req.threshold)
        .map_err(|_| AppError::validation("threshold must be between 0 and 255"))?;

    let image = decode_image_base64(&image_base64)?;

    let job = PrintJob {
        image,
        target_width,
        threshold,
        enhance: req.enhance,
        options: JobOptions {
            align: req.align,
            feed_lines: config.feed_lines,
            cut: req.cut,
        },
    };
    let payload = job.render().await?;
    let bytes_length = payload.len();

    let debug_file = if req.save_debug {
        let path = save_debug(&config.debug_dir(), &payload).await?;
        Some(path.display().to_string())
    } else {
        None
    };

    if config.simulate || req.simulate {
        info!(bytes = bytes_length, "simulated print job");
        return Ok(Json(PrintImageResponse {
            ok: true,
            printer_name: None,
            bytes_length,
            escpos_base64: Some(encode_payload(&payload)),
            debug_file,
        }));
    }

    let printer_name = non_blank(req.printer_name)
        .or_else(|| non_blank(config.default_printer.clone()))
        .ok_or_else(|| AppError::validation("printerName is required (or set PRINTER_NAME)"))?;
    let doc_name = non_blank(req.doc_name).unwrap_or_else(|| config.default_doc_name.clone());

    state
        .printer()
        .print(&printer_name, payload, &doc_name)
        .await?;

    info!(printer = %printer_name, bytes = bytes_length, "print job completed");

    Ok(Json(PrintImageResponse {
        ok: true,
        printer_name: Some(printer_name),
        bytes_length,
        escpos_base64: None,
        debug_file,
    }))
}
