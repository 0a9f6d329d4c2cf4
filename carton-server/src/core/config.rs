//! Server configuration
//!
//! All settings load from environment variables with working defaults:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/carton | Database + consignment files |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | PRINT_MODE | web | web (browser queue) \| spooler (OS printer) |
//! | PRINTER_NAME | (empty) | Default spooler target |
//! | MASTER_DATA_URL | (unset) | CSV export URL for master data sync |
//! | PRINT_TIMEOUT_MS | 15000 | Spooler hand-off timeout |

use std::path::PathBuf;

/// Which print transport the server wires in at startup.
/// The workflow core never branches on this; it only sees the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
    /// Stage pages for a browser-side print trigger
    #[default]
    Web,
    /// Hand pages straight to the OS spooler
    Spooler,
}

impl PrintMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "spooler" | "local" => PrintMode::Spooler,
            _ => PrintMode::Web,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory: database and consignment files live here
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Print transport selection
    pub print_mode: PrintMode,
    /// Default printer target for the spooler transport
    pub printer_name: String,
    /// Master data CSV export URL
    pub master_data_url: Option<String>,
    /// Spooler hand-off timeout (milliseconds)
    pub print_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/carton".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            print_mode: std::env::var("PRINT_MODE")
                .map(|m| PrintMode::parse(&m))
                .unwrap_or_default(),
            printer_name: std::env::var("PRINTER_NAME").unwrap_or_default(),
            master_data_url: std::env::var("MASTER_DATA_URL").ok(),
            print_timeout_ms: std::env::var("PRINT_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15_000),
        }
    }

    /// Override the paths and port, keeping the rest from the environment.
    /// Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Path of the embedded database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("carton.redb")
    }

    /// Directory holding per-consignment document artifacts
    pub fn files_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("consignment_files")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
