//! Carton Server - warehouse consignment manager
//!
//! # Architecture
//!
//! Ingests per-channel shipment CSVs, reconciles them against a product
//! master, and drives a barcode-scan-to-print workflow so a warehouse
//! operator prints the correct box label exactly once per box, in any scan
//! order, without duplicates.
//!
//! # Module structure
//!
//! ```text
//! carton-server/src/
//! ├── core/          # Configuration, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── reconcile/     # CSV ingest + master data join
//! ├── boxes/         # Box expansion (the single numbering source)
//! ├── labels/        # Packing slips, carrier compositing, documents
//! ├── printing/      # Scan matching and print dispatch
//! ├── generators/    # Manifest PDF, confirmation CSV, label data
//! ├── services/      # Master data sync
//! ├── storage.rs     # Embedded redb persistence
//! └── utils/         # Logging
//! ```

pub mod api;
pub mod boxes;
pub mod core;
pub mod generators;
pub mod labels;
pub mod printing;
pub mod reconcile;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, PrintMode, Server, ServerState};
pub use printing::{ScanPrintService, ScanResult};
pub use storage::ConsignmentStorage;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging from the environment
pub fn setup_environment() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______           __
  / ____/___ ______/ /_____  ____
 / /   / __ `/ ___/ __/ __ \/ __ \
/ /___/ /_/ / /  / /_/ /_/ / / / /
\____/\__,_/_/   \__/\____/_/ /_/
    "#
    );
}
