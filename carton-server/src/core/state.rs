//! Server state - holds singleton references to every service
//!
//! `ServerState` is cheap to clone (all members are Arc-backed) and is the
//! single axum state for the whole router.

use std::sync::Arc;
use std::time::Duration;

use carton_printer::{PrintTransport, SpoolerPrinter, WebPrintQueue};

use crate::core::config::{Config, PrintMode};
use crate::labels::LabelDocumentStore;
use crate::printing::ScanPrintService;
use crate::services::MasterSyncService;
use crate::storage::ConsignmentStorage;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Embedded database
    pub storage: ConsignmentStorage,
    /// Per-consignment document artifacts on disk
    pub documents: Arc<LabelDocumentStore>,
    /// The scan-to-print workflow
    pub scan_print: ScanPrintService,
    /// Master data sync
    pub master_sync: MasterSyncService,
    /// Present only in web print mode: the queue the browser polls
    pub web_queue: Option<WebPrintQueue>,
}

impl ServerState {
    /// Build every service from the configuration
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let storage = ConsignmentStorage::open(config.db_path())?;
        let documents = Arc::new(LabelDocumentStore::new(config.files_dir())?);

        let (transport, web_queue): (Arc<dyn PrintTransport>, Option<WebPrintQueue>) =
            match config.print_mode {
                PrintMode::Spooler => {
                    let printer = SpoolerPrinter::new()
                        .with_timeout(Duration::from_millis(config.print_timeout_ms));
                    (Arc::new(printer), None)
                }
                PrintMode::Web => {
                    let queue = WebPrintQueue::new();
                    (Arc::new(queue.clone()), Some(queue))
                }
            };

        let scan_print = ScanPrintService::new(storage.clone(), documents.clone(), transport);
        let master_sync = MasterSyncService::new(config.master_data_url.clone(), storage.clone());

        tracing::info!(
            work_dir = %config.work_dir,
            print_mode = ?config.print_mode,
            "server state initialized"
        );

        Ok(Self {
            config: config.clone(),
            storage,
            documents,
            scan_print,
            master_sync,
            web_queue,
        })
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
