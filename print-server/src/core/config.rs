use std::path::PathBuf;
use std::time::Duration;
use thermal_printer::DEFAULT_DOCUMENT_NAME;

/// Print server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_HOST | 127.0.0.1 | Bind address |
/// | HTTP_PORT | 9109 | Bind port |
/// | PRINTER_NAME | - | Default printer when a request names none |
/// | PRINTER_DOC_NAME | Raw Document | Default spooler document name |
/// | PRINT_SIMULATE | false | Never print; return the payload as base64 |
/// | WORK_DIR | . | Base for `out/` debug dumps and `logs/` |
/// | LOG_LEVEL | info | Log filter when RUST_LOG is unset |
/// | LOG_TO_FILE | false | Also write daily logs under WORK_DIR/logs |
/// | REQUEST_TIMEOUT_MS | 30000 | Timeout for a whole request |
/// | MAX_BODY_BYTES | 20971520 | JSON body limit |
/// | FEED_LINES | 3 | Lines fed after the image |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub default_printer: Option<String>,
    pub default_doc_name: String,
    /// Force simulate mode for every request
    pub simulate: bool,
    pub work_dir: PathBuf,
    pub log_level: String,
    pub log_to_file: bool,
    pub request_timeout_ms: u64,
    pub max_body_bytes: usize,
    pub feed_lines: u8,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: parse_env("HTTP_PORT").unwrap_or(defaults.http_port),
            default_printer: std::env::var("PRINTER_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            default_doc_name: std::env::var("PRINTER_DOC_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_doc_name),
            simulate: parse_env("PRINT_SIMULATE").unwrap_or(defaults.simulate),
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_to_file: parse_env("LOG_TO_FILE").unwrap_or(defaults.log_to_file),
            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            max_body_bytes: parse_env("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            feed_lines: parse_env("FEED_LINES").unwrap_or(defaults.feed_lines),
        }
    }

    /// Directory for debug payload dumps
    pub fn debug_dir(&self) -> PathBuf {
        self.work_dir.join("out")
    }

    /// Directory for log files
    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: "127.0.0.1".into(),
            http_port: 9109,
            default_printer: None,
            default_doc_name: DEFAULT_DOCUMENT_NAME.into(),
            simulate: false,
            work_dir: PathBuf::from("."),
            log_level: "info".into(),
            log_to_file: false,
            request_timeout_ms: 30_000,
            max_body_bytes: 20 * 1024 * 1024,
            feed_lines: 3,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
