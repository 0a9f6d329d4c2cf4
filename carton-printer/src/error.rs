//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The OS spooler rejected or failed the job
    #[error("Spooler error: {0}")]
    Spooler(String),

    /// Timeout waiting for the spooler
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid transport configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Windows-specific printing error
    #[cfg(windows)]
    #[error("Windows printer error: {0}")]
    WindowsPrinter(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
