use crate::core::Config;
use std::sync::Arc;
use thermal_printer::{PlatformSpooler, Printer, PrinterTransaction};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    config: Arc<Config>,
    printer: Arc<dyn Printer>,
}

impl ServerState {
    pub fn new(config: Config, printer: Arc<dyn Printer>) -> Self {
        Self {
            config: Arc::new(config),
            printer,
        }
    }

    /// State backed by the platform spooler and the process-wide print gate
    pub fn initialize(config: &Config) -> Self {
        let printer = PrinterTransaction::new(PlatformSpooler::default());
        Self::new(config.clone(), Arc::new(printer))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn printer(&self) -> &dyn Printer {
        self.printer.as_ref()
    }
}
