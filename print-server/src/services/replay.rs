//! Replay a saved payload file to a device
//!
//! Pairs with the `saveDebug` dumps: a `job_<millis>.bin` written by the
//! server can be sent again unchanged with the `send-raw` binary.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thermal_printer::{PrintError, Printer};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Print failed: {0}")]
    Print(#[from] PrintError),
}

impl ReplayError {
    /// Process exit code (2 is left to argument errors)
    pub fn exit_code(&self) -> u8 {
        match self {
            ReplayError::Print(_) => 1,
            ReplayError::NotFound(_) => 3,
            ReplayError::Read { .. } => 9,
        }
    }
}

/// Send the file's bytes as one raw job, returning the byte count
pub async fn replay_file(
    printer: &dyn Printer,
    device: &str,
    path: &Path,
    document: &str,
) -> Result<usize, ReplayError> {
    let payload = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ReplayError::NotFound(path.to_path_buf()),
        _ => ReplayError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if payload.is_empty() {
        return Err(PrintError::EmptyPayload.into());
    }

    let len = payload.len();
    printer.print(device, payload, document).await?;

    info!(device, path = %path.display(), bytes = len, "payload replayed");
    Ok(len)
}
