//! Raw device print transaction
//!
//! One job is one strictly ordered spooler session:
//!
//! ```text
//! open -> begin document -> begin page -> write -> end page -> end document -> close
//! ```
//!
//! Every `end`/`close` step runs if (and only if) its matching `begin`/`open`
//! succeeded, in reverse order, on every exit path including unwinding.
//! Teardown failures are logged and never replace the error being returned.

use crate::error::{PrintError, PrintResult, SystemCode};
use std::sync::{Arc, OnceLock};
use tokio::sync::Semaphore;
use tracing::{Span, debug, info, instrument, warn};

/// Document name used when the caller does not supply one
pub const DEFAULT_DOCUMENT_NAME: &str = "Raw Document";

/// Spooler data type that passes bytes to the device untouched
pub const RAW_DATATYPE: &str = "RAW";

/// Document registered with the spooler for one job
///
/// Always spooled directly (no output file) with the raw data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    name: String,
}

impl DocumentInfo {
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_DOCUMENT_NAME
        } else {
            name
        };
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output file; never redirected
    pub fn output_file(&self) -> Option<&str> {
        None
    }

    pub fn datatype(&self) -> &'static str {
        RAW_DATATYPE
    }
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_NAME)
    }
}

/// Platform raw-printing interface
///
/// Each method maps onto a single spooler call. Failures carry the system
/// error code; `write` returns the number of bytes the spooler accepted.
pub trait Spooler: Send + Sync {
    type Handle;

    /// Whether raw device access exists on this platform
    fn is_supported(&self) -> bool {
        true
    }

    fn open(&self, device: &str) -> Result<Self::Handle, SystemCode>;

    fn begin_document(
        &self,
        handle: &mut Self::Handle,
        document: &DocumentInfo,
    ) -> Result<(), SystemCode>;

    fn begin_page(&self, handle: &mut Self::Handle) -> Result<(), SystemCode>;

    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, SystemCode>;

    fn end_page(&self, handle: &mut Self::Handle) -> Result<(), SystemCode>;

    fn end_document(&self, handle: &mut Self::Handle) -> Result<(), SystemCode>;

    fn close(&self, handle: &mut Self::Handle) -> Result<(), SystemCode>;
}

/// Open spooler handle; tears down whatever was begun when dropped
struct Session<'s, S: Spooler> {
    spooler: &'s S,
    handle: S::Handle,
    document_open: bool,
    page_open: bool,
}

impl<'s, S: Spooler> Session<'s, S> {
    fn open(spooler: &'s S, device: &str) -> PrintResult<Self> {
        let handle = spooler.open(device).map_err(|code| PrintError::Open {
            device: device.to_string(),
            code,
        })?;
        debug!("printer opened");

        Ok(Self {
            spooler,
            handle,
            document_open: false,
            page_open: false,
        })
    }

    fn begin_document(&mut self, document: &DocumentInfo) -> PrintResult<()> {
        self.spooler
            .begin_document(&mut self.handle, document)
            .map_err(|code| PrintError::BeginDocument { code })?;
        self.document_open = true;
        debug!("document started");
        Ok(())
    }

    fn begin_page(&mut self) -> PrintResult<()> {
        self.spooler
            .begin_page(&mut self.handle)
            .map_err(|code| PrintError::BeginPage { code })?;
        self.page_open = true;
        debug!("page started");
        Ok(())
    }

    fn write(&mut self, payload: &[u8]) -> PrintResult<()> {
        let written = self
            .spooler
            .write(&mut self.handle, payload)
            .map_err(|code| PrintError::Write { code })?;

        // A short write leaves the printer mid-command
        if written != payload.len() {
            return Err(PrintError::IncompleteWrite {
                written,
                expected: payload.len(),
            });
        }
        debug!(written, "payload written");
        Ok(())
    }
}

impl<S: Spooler> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if self.page_open
            && let Err(code) = self.spooler.end_page(&mut self.handle)
        {
            warn!(%code, "end page failed");
        }
        if self.document_open
            && let Err(code) = self.spooler.end_document(&mut self.handle)
        {
            warn!(%code, "end document failed");
        }
        if let Err(code) = self.spooler.close(&mut self.handle) {
            warn!(%code, "close printer failed");
        }
        debug!("printer closed");
    }
}

/// Check job input before touching the device
pub fn validate<S: Spooler>(spooler: &S, device: &str, payload: &[u8]) -> PrintResult<()> {
    if device.trim().is_empty() {
        return Err(PrintError::InvalidDevice);
    }
    if payload.is_empty() {
        return Err(PrintError::EmptyPayload);
    }
    if u32::try_from(payload.len()).is_err() {
        return Err(PrintError::PayloadTooLarge(payload.len()));
    }
    if !spooler.is_supported() {
        return Err(PrintError::UnsupportedPlatform);
    }
    Ok(())
}

/// Run one complete transaction synchronously
///
/// Does not take the admission gate; use [`PrinterTransaction`] unless the
/// caller serializes jobs itself.
#[instrument(skip(spooler, payload, document), fields(document = %document.name(), len = payload.len()))]
pub fn execute<S: Spooler>(
    spooler: &S,
    device: &str,
    payload: &[u8],
    document: &DocumentInfo,
) -> PrintResult<()> {
    validate(spooler, device, payload)?;

    let mut session = Session::open(spooler, device)?;
    session.begin_document(document)?;
    session.begin_page()?;
    session.write(payload)?;
    drop(session);

    info!("print job sent");
    Ok(())
}

/// Process-wide admission gate: one transaction in flight at a time
fn global_gate() -> Arc<Semaphore> {
    static GATE: OnceLock<Arc<Semaphore>> = OnceLock::new();
    GATE.get_or_init(|| Arc::new(Semaphore::new(1))).clone()
}

/// Serialized print transactions over a spooler
///
/// The gate permit is taken before `open` and released after `close`. The
/// device sequence runs on the blocking pool and is never interrupted: if the
/// caller stops waiting, the job still runs to completion and the gate stays
/// closed until it does.
pub struct PrinterTransaction<S> {
    spooler: Arc<S>,
    gate: Arc<Semaphore>,
}

impl<S: Spooler + 'static> PrinterTransaction<S> {
    /// Transaction sharing the process-wide gate
    pub fn new(spooler: S) -> Self {
        Self::with_gate(spooler, global_gate())
    }

    /// Transaction with an explicit gate
    pub fn with_gate(spooler: S, gate: Arc<Semaphore>) -> Self {
        Self {
            spooler: Arc::new(spooler),
            gate,
        }
    }

    pub fn spooler(&self) -> &S {
        &self.spooler
    }

    /// Send a finished payload to a device
    #[instrument(skip(self, payload, document), fields(len = payload.len()))]
    pub async fn send(&self, device: &str, payload: Vec<u8>, document: &str) -> PrintResult<()> {
        validate(self.spooler.as_ref(), device, &payload)?;

        let permit = Arc::clone(&self.gate)
            .acquire_owned()
            .await
            .map_err(|e| PrintError::Task(format!("Print gate closed: {}", e)))?;

        let spooler = Arc::clone(&self.spooler);
        let device = device.to_string();
        let document = DocumentInfo::new(document);
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            span.in_scope(|| execute(spooler.as_ref(), &device, &payload, &document))
        })
        .await
        .map_err(|e| PrintError::Task(format!("Task join failed: {}", e)))?
    }
}

impl<S> Clone for PrinterTransaction<S> {
    fn clone(&self) -> Self {
        Self {
            spooler: Arc::clone(&self.spooler),
            gate: Arc::clone(&self.gate),
        }
    }
}
