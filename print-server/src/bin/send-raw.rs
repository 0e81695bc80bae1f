//! # send-raw
//!
//! Send a finished ESC/POS payload file to a printer, unchanged.
//!
//! ## Usage
//!
//! ```bash
//! # Replay a debug dump written with saveDebug
//! send-raw W80 out/job_1767225600000.bin
//!
//! # Custom spooler document name
//! send-raw --doc-name "Reprint" W80 receipt.bin
//! ```
//!
//! Exit codes: 0 ok, 1 print failed, 2 usage, 3 file not found, 9 read error.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use print_server::init_logger;
use print_server::services::replay_file;
use thermal_printer::{DEFAULT_DOCUMENT_NAME, PlatformSpooler, PrinterTransaction};

/// Send a raw payload file to a printer
#[derive(Parser, Debug)]
#[command(name = "send-raw")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Printer name as known to the system spooler
    printer_name: String,

    /// Payload file (e.g. a job_<millis>.bin dump)
    file: PathBuf,

    /// Spooler document name
    #[arg(long, default_value = DEFAULT_DOCUMENT_NAME)]
    doc_name: String,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logger(&cli.log_level, None) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let printer = PrinterTransaction::new(PlatformSpooler::default());
    match replay_file(&printer, &cli.printer_name, &cli.file, &cli.doc_name).await {
        Ok(bytes) => {
            println!("OK ({} bytes)", bytes);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
