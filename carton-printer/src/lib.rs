//! # carton-printer
//!
//! Print transport library - low-level page submission only.
//!
//! ## Scope
//!
//! This crate handles HOW a finished page reaches a printer:
//! - OS spooler submission (`lp` on Unix, "printto" on Windows)
//! - Staged web queue for browser-triggered printing
//!
//! Business logic (WHAT to print) stays in application code:
//! - Box expansion, label compositing, scan matching → carton-server
//!
//! ## Example
//!
//! ```ignore
//! use carton_printer::{PrintTransport, SpoolerPrinter};
//!
//! let printer = SpoolerPrinter::new();
//! printer.submit(&page_bytes, "Zebra-Dock-2").await?;
//! ```

mod error;
mod transport;

// Re-exports
pub use error::{PrintError, PrintResult};
pub use transport::{PrintTransport, QueuedPage, SpoolerPrinter, WebPrintQueue};
