//! Scan & Print Module
//!
//! The scan-driven print workflow: token matching, per-consignment scan
//! sessions, and exactly-once dispatch through the print transport.

pub mod matcher;
pub mod service;
pub mod session;

pub use matcher::{ScanOutcome, resolve};
pub use service::{
    BoxStatusRow, PrintServiceError, PrintServiceResult, ScanPrintService, ScanResult,
};
pub use session::ScanSession;
