//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - Windows driver printers (winspool raw printing)
//!
//! Other platforms get [`UnsupportedSpooler`], which rejects every job with
//! [`PrintError::UnsupportedPlatform`](crate::PrintError::UnsupportedPlatform).

use crate::error::{PrintResult, SystemCode};
use crate::transaction::{DocumentInfo, PrinterTransaction, Spooler};
use async_trait::async_trait;

/// Trait for printer adapters
#[async_trait]
pub trait Printer: Send + Sync {
    /// Send a finished ESC/POS payload to the named device
    async fn print(&self, device: &str, payload: Vec<u8>, document: &str) -> PrintResult<()>;
}

#[async_trait]
impl<S: Spooler + 'static> Printer for PrinterTransaction<S> {
    async fn print(&self, device: &str, payload: Vec<u8>, document: &str) -> PrintResult<()> {
        self.send(device, payload, document).await
    }
}

/// Spooler for platforms without raw device access
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSpooler;

impl Spooler for UnsupportedSpooler {
    type Handle = ();

    fn is_supported(&self) -> bool {
        false
    }

    fn open(&self, _device: &str) -> Result<(), SystemCode> {
        Err(SystemCode(0))
    }

    fn begin_document(&self, _: &mut (), _: &DocumentInfo) -> Result<(), SystemCode> {
        Err(SystemCode(0))
    }

    fn begin_page(&self, _: &mut ()) -> Result<(), SystemCode> {
        Err(SystemCode(0))
    }

    fn write(&self, _: &mut (), _: &[u8]) -> Result<usize, SystemCode> {
        Err(SystemCode(0))
    }

    fn end_page(&self, _: &mut ()) -> Result<(), SystemCode> {
        Ok(())
    }

    fn end_document(&self, _: &mut ()) -> Result<(), SystemCode> {
        Ok(())
    }

    fn close(&self, _: &mut ()) -> Result<(), SystemCode> {
        Ok(())
    }
}

/// Native spooler for the current platform
#[cfg(windows)]
pub type PlatformSpooler = WindowsSpooler;

/// Native spooler for the current platform
#[cfg(not(windows))]
pub type PlatformSpooler = UnsupportedSpooler;

/// Windows driver printer
///
/// Uses the winspool API with the `RAW` data type so the driver passes the
/// ESC/POS bytes through untouched.
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsSpooler;

#[cfg(windows)]
fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(windows)]
fn last_error() -> SystemCode {
    use windows::Win32::Foundation::GetLastError;

    SystemCode(unsafe { GetLastError() }.0)
}

#[cfg(windows)]
impl Spooler for WindowsSpooler {
    type Handle = windows::Win32::Graphics::Printing::PRINTER_HANDLE;

    fn open(&self, device: &str) -> Result<Self::Handle, SystemCode> {
        use windows::Win32::Graphics::Printing::{OpenPrinterW, PRINTER_HANDLE};
        use windows::core::PCWSTR;

        let name_w = to_wide(device);
        let mut handle = PRINTER_HANDLE::default();

        unsafe { OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None) }
            .map_err(|_| last_error())?;

        Ok(handle)
    }

    fn begin_document(
        &self,
        handle: &mut Self::Handle,
        document: &DocumentInfo,
    ) -> Result<(), SystemCode> {
        use windows::Win32::Graphics::Printing::{DOC_INFO_1W, StartDocPrinterW};
        use windows::core::PWSTR;

        let doc_name_w = to_wide(document.name());
        let datatype_w = to_wide(document.datatype());
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        if unsafe { StartDocPrinterW(*handle, 1, &doc_info as *const DOC_INFO_1W) } == 0 {
            return Err(last_error());
        }
        Ok(())
    }

    fn begin_page(&self, handle: &mut Self::Handle) -> Result<(), SystemCode> {
        use windows::Win32::Graphics::Printing::StartPagePrinter;

        if !unsafe { StartPagePrinter(*handle) }.as_bool() {
            return Err(last_error());
        }
        Ok(())
    }

    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> Result<usize, SystemCode> {
        use core::ffi::c_void;
        use windows::Win32::Foundation::ERROR_INVALID_PARAMETER;
        use windows::Win32::Graphics::Printing::WritePrinter;

        let len = u32::try_from(data.len()).map_err(|_| SystemCode(ERROR_INVALID_PARAMETER.0))?;
        let mut written: u32 = 0;

        let ok = unsafe { WritePrinter(*handle, data.as_ptr() as *const c_void, len, &mut written) };
        if !ok.as_bool() {
            return Err(last_error());
        }
        Ok(written as usize)
    }

    fn end_page(&self, handle: &mut Self::Handle) -> Result<(), SystemCode> {
        use windows::Win32::Graphics::Printing::EndPagePrinter;

        if !unsafe { EndPagePrinter(*handle) }.as_bool() {
            return Err(last_error());
        }
        Ok(())
    }

    fn end_document(&self, handle: &mut Self::Handle) -> Result<(), SystemCode> {
        use windows::Win32::Graphics::Printing::EndDocPrinter;

        if !unsafe { EndDocPrinter(*handle) }.as_bool() {
            return Err(last_error());
        }
        Ok(())
    }

    fn close(&self, handle: &mut Self::Handle) -> Result<(), SystemCode> {
        use windows::Win32::Graphics::Printing::ClosePrinter;

        unsafe { ClosePrinter(*handle) }.map_err(|_| last_error())
    }
}
